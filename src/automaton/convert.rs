use tracing::{debug, trace};

use crate::{
    alphabet::CharAlphabet,
    grammar::{show_body, Body, Grammar, GrammarError, Symbol},
    math::{OrderedMap, OrderedSet, Set},
    Show, State,
};

use super::FiniteAutomaton;

/// State of an automaton obtained from a right-linear grammar: either one of the nonterminals or the
/// distinguished final state that productions of the form `A -> a` lead into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegularState {
    /// Stands for the nonterminal with the given name.
    Nonterminal(String),
    /// The state reached after a production without a trailing nonterminal was applied.
    Final,
}

impl Show for RegularState {
    fn show(&self) -> String {
        match self {
            RegularState::Nonterminal(name) => name.clone(),
            RegularState::Final => "Final".to_string(),
        }
    }
}

impl<Q: State> FiniteAutomaton<Q> {
    /// Builds a right-linear grammar that generates the language accepted by `self`.
    ///
    /// The nonterminals are the states (named by their [`Show`] representation), the terminals are
    /// the alphabet and the start symbol is the initial state. Every transition `(s, a) -> t` yields
    /// the production `s -> a t` and, if `t` is final, additionally `s -> a`. Each final state gets a
    /// production with empty body.
    ///
    /// Fails if two states have the same name or if the name of a state coincides with a symbol of
    /// the alphabet.
    pub fn to_regular_grammar(&self) -> Result<Grammar, GrammarError> {
        let mut names: Set<String> = Set::default();
        for q in self.states() {
            let name = q.show();
            if !names.insert(name.clone()) {
                return Err(GrammarError::DuplicateStateName(name));
            }
        }

        let mut rules: Vec<(String, Body)> = Vec::new();
        for (source, symbol, target) in self.transitions() {
            rules.push((
                source.show(),
                vec![Symbol::Terminal(symbol), Symbol::Nonterminal(target.show())],
            ));
            if self.is_final(target) {
                rules.push((source.show(), vec![Symbol::Terminal(symbol)]));
            }
        }
        rules.extend(self.final_states().iter().map(|q| (q.show(), Body::new())));
        trace!("collected {} productions from {} states", rules.len(), self.size());

        Grammar::new(
            names,
            self.alphabet().universe(),
            rules,
            self.initial().show(),
        )
    }
}

impl Grammar {
    /// Builds a finite automaton that accepts the language generated by `self`, which has to be
    /// right-linear.
    ///
    /// The states are the nonterminals together with [`RegularState::Final`] and the alphabet consists of
    /// the terminals. A production `A -> a B` becomes the transition `(A, a) -> B`, a production
    /// `A -> a` becomes `(A, a) -> Final`, and a nonterminal with an empty body is final, as is
    /// `Final` itself. Any other production is rejected with [`GrammarError::NotRightLinear`].
    ///
    /// ```
    /// use chomsky::prelude::*;
    ///
    /// let grammar = Grammar::builder()
    ///     .with_nonterminals(["S"])
    ///     .with_terminals(['a', 'b'])
    ///     .with_productions("S", ["aS", "b"])
    ///     .with_start_symbol("S")
    ///     .build()
    ///     .unwrap();
    /// let fa = grammar.to_finite_automaton().unwrap();
    /// assert!(fa.accepts("aab"));
    /// assert!(!fa.accepts("aa"));
    /// ```
    pub fn to_finite_automaton(&self) -> Result<FiniteAutomaton<RegularState>, GrammarError> {
        let mut transitions: OrderedMap<(RegularState, char), OrderedSet<RegularState>> =
            OrderedMap::new();
        let mut finals = OrderedSet::from([RegularState::Final]);

        for (head, body) in self.rules() {
            let source = RegularState::Nonterminal(head.to_string());
            let (symbol, target) = match body.as_slice() {
                [] => {
                    finals.insert(source);
                    continue;
                }
                [Symbol::Terminal(a)] => (*a, RegularState::Final),
                [Symbol::Terminal(a), Symbol::Nonterminal(next)] => {
                    (*a, RegularState::Nonterminal(next.clone()))
                }
                _ => {
                    return Err(GrammarError::NotRightLinear {
                        head: head.to_string(),
                        body: show_body(body),
                    })
                }
            };
            transitions.entry((source, symbol)).or_default().insert(target);
        }

        let states: OrderedSet<RegularState> = self
            .nonterminals()
            .iter()
            .cloned()
            .map(RegularState::Nonterminal)
            .chain(std::iter::once(RegularState::Final))
            .collect();
        debug!(
            "converted grammar with {} productions into automaton with {} states",
            self.production_count(),
            states.len()
        );

        Ok(FiniteAutomaton::from_parts(
            states,
            CharAlphabet::new(self.terminals().iter().copied()),
            transitions,
            RegularState::Nonterminal(self.start().to_string()),
            finals,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{prelude::*, tests::variant_nfa};

    #[test_log::test]
    fn automaton_to_grammar_and_back() {
        let nfa = variant_nfa();
        let grammar = nfa.to_regular_grammar().unwrap();
        assert_eq!(grammar.start(), "q0");
        assert_eq!(grammar.classify(), ChomskyType::Regular);
        assert_eq!(grammar.production_count(), 8);
        assert!(grammar.has_production(
            "q0",
            &[Symbol::Terminal('a'), Symbol::nonterminal("q1")]
        ));
        assert!(grammar.has_production("q2", &[Symbol::Terminal('b')]));
        assert!(grammar.has_production("q3", &[]));

        let fa = grammar.to_finite_automaton().unwrap();
        assert_eq!(fa.size(), 5);
        assert_eq!(fa.accepted_words(6), nfa.accepted_words(6));
        assert!(fa.accepts("aabab"));
        assert!(!fa.accepts("aab"));
    }

    #[test]
    fn regular_grammar_to_automaton() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "A", "B"])
            .with_terminals(['a', 'b', 'c'])
            .with_productions("S", ["aS", "bS", "cA"])
            .with_productions("A", ["aB"])
            .with_productions("B", ["aB", "bB", "c"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        let fa = grammar.to_finite_automaton().unwrap();
        assert_eq!(fa.size(), 4);
        assert_eq!(fa.initial(), &RegularState::Nonterminal("S".into()));
        assert_eq!(
            fa.final_states().iter().collect::<Vec<_>>(),
            vec![&RegularState::Final]
        );
        assert!(fa.is_deterministic());
        assert!(fa.accepts("cac"));
        assert!(fa.accepts("abcabbc"));
        assert!(!fa.accepts("cab"));
    }

    #[test]
    fn empty_bodies_become_final_states() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S"])
            .with_terminals(['a'])
            .with_productions("S", ["aS", "ε"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        let fa = grammar.to_finite_automaton().unwrap();
        assert!(fa.accepts(""));
        assert!(fa.accepts("aaa"));
        assert!(fa.is_final(&RegularState::Nonterminal("S".into())));
    }

    #[test]
    fn other_productions_are_rejected() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S"])
            .with_terminals(['a', 'b'])
            .with_productions("S", ["aSb", "b"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        assert_eq!(
            grammar.to_finite_automaton().unwrap_err(),
            GrammarError::NotRightLinear {
                head: "S".into(),
                body: "aSb".into()
            }
        );
    }

    #[test_log::test]
    fn states_with_equal_names_are_rejected() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "Final"])
            .with_terminals(['a', 'b', 'c'])
            .with_productions("S", ["aFinal", "c"])
            .with_productions("Final", ["bFinal"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        let fa = grammar.to_finite_automaton().unwrap();
        assert_eq!(fa.size(), 3);
        assert!(!fa.accepts("a"));
        assert!(fa.accepts("c"));

        // the nonterminal `Final` and the dedicated final state would merge into one nonterminal
        assert_eq!(
            fa.to_regular_grammar().unwrap_err(),
            GrammarError::DuplicateStateName("Final".into())
        );
    }

    #[test]
    fn state_names_must_not_clash_with_symbols() {
        let fa = FiniteAutomaton::builder()
            .with_states(["a"])
            .with_alphabet_symbols(['a'])
            .with_transitions([("a", 'a', "a")])
            .into_automaton("a")
            .unwrap();
        assert_eq!(
            fa.to_regular_grammar().unwrap_err(),
            GrammarError::NameCollision("a".into())
        );
    }
}
