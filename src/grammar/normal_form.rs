use itertools::Itertools;
use tracing::{debug, trace, warn};

use super::{show_body, Body, Grammar, Symbol};
use crate::math::{Fixpoint, Map, OrderedMap, OrderedSet};

/// A body consisting of a single nonterminal.
fn is_unit(body: &[Symbol]) -> bool {
    matches!(body, [Symbol::Nonterminal(_)])
}

/// Produces names `X0, X1, ...` that are not yet taken.
struct FreshNames {
    counter: usize,
}

impl FreshNames {
    fn new() -> Self {
        Self { counter: 0 }
    }

    /// Returns the next name that is not in `taken` and adds it there.
    fn next(&mut self, taken: &mut OrderedSet<String>) -> String {
        loop {
            let candidate = format!("X{}", self.counter);
            self.counter += 1;
            if taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

impl Grammar {
    pub(crate) fn nullable_fixpoint(
        &self,
    ) -> Fixpoint<String, impl FnMut(&OrderedSet<String>) -> Vec<String> + '_> {
        Fixpoint::new([], move |nullable: &OrderedSet<String>| {
            self.rule_map()
                .iter()
                .filter(|(head, _)| !nullable.contains(*head))
                .filter(|(_, bodies)| {
                    bodies.iter().any(|body| {
                        body.iter().all(|symbol| {
                            matches!(symbol, Symbol::Nonterminal(name) if nullable.contains(name))
                        })
                    })
                })
                .map(|(head, _)| head.clone())
                .collect::<Vec<_>>()
        })
    }

    pub(crate) fn unit_fixpoint<'a>(
        &'a self,
        nonterminal: &str,
    ) -> Fixpoint<String, impl FnMut(&OrderedSet<String>) -> Vec<String> + 'a> {
        Fixpoint::new([nonterminal.to_string()], move |closure: &OrderedSet<String>| {
            closure
                .iter()
                .flat_map(|name| self.productions(name))
                .filter_map(|body| match body.as_slice() {
                    [Symbol::Nonterminal(target)] if !closure.contains(target) => {
                        Some(target.clone())
                    }
                    _ => None,
                })
                .collect::<Vec<_>>()
        })
    }

    pub(crate) fn reachable_fixpoint(
        &self,
    ) -> Fixpoint<String, impl FnMut(&OrderedSet<String>) -> Vec<String> + '_> {
        Fixpoint::new([self.start().to_string()], move |reachable: &OrderedSet<String>| {
            reachable
                .iter()
                .flat_map(|name| self.productions(name))
                .flatten()
                .filter_map(|symbol| match symbol {
                    Symbol::Nonterminal(name) if !reachable.contains(name) => Some(name.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>()
        })
    }

    pub(crate) fn productive_fixpoint(
        &self,
    ) -> Fixpoint<String, impl FnMut(&OrderedSet<String>) -> Vec<String> + '_> {
        Fixpoint::new([], move |productive: &OrderedSet<String>| {
            self.rule_map()
                .iter()
                .filter(|(head, _)| !productive.contains(*head))
                .filter(|(_, bodies)| {
                    bodies.iter().any(|body| {
                        body.iter().all(|symbol| match symbol {
                            Symbol::Terminal(_) => true,
                            Symbol::Nonterminal(name) => productive.contains(name),
                        })
                    })
                })
                .map(|(head, _)| head.clone())
                .collect::<Vec<_>>()
        })
    }

    /// Computes the set of nullable nonterminals, i.e. those that can derive the empty word.
    pub fn nullable_symbols(&self) -> OrderedSet<String> {
        self.nullable_fixpoint().solve()
    }

    /// Computes the unit closure of `nonterminal`, which consists of `nonterminal` itself and every
    /// nonterminal that can be reached from it using only unit productions.
    pub fn unit_closure(&self, nonterminal: &str) -> OrderedSet<String> {
        self.unit_fixpoint(nonterminal).solve()
    }

    /// Computes the set of nonterminals that occur in some sentential form derived from the start
    /// symbol. The start symbol itself is always reachable.
    pub fn reachable_symbols(&self) -> OrderedSet<String> {
        self.reachable_fixpoint().solve()
    }

    /// Computes the set of nonterminals that derive at least one word consisting only of terminals.
    pub fn productive_symbols(&self) -> OrderedSet<String> {
        self.productive_fixpoint().solve()
    }

    /// Eliminates all productions with an empty body.
    ///
    /// For every production with a non-empty body, all variants obtained by deleting some of the
    /// occurrences of nullable nonterminals are added as well, as long as they are not empty.
    /// Occurrences are treated independently, so `S -> ASA` with `A` nullable yields `SA` and `AS`.
    ///
    /// Note that this removes the empty body even from the start symbol, so if the grammar
    /// generates the empty word, the resulting grammar no longer does.
    pub fn remove_epsilon(&self) -> Grammar {
        let nullable = self.nullable_symbols();
        debug!("nullable nonterminals: {nullable:?}");

        let rules: OrderedMap<String, OrderedSet<Body>> = self
            .rule_map()
            .iter()
            .map(|(head, bodies)| {
                let mut out = OrderedSet::new();
                for body in bodies.iter().filter(|body| !body.is_empty()) {
                    let positions = body
                        .iter()
                        .positions(|symbol| {
                            matches!(symbol, Symbol::Nonterminal(name) if nullable.contains(name))
                        })
                        .collect_vec();
                    for deleted in positions.into_iter().powerset().skip(1) {
                        let reduced: Body = body
                            .iter()
                            .enumerate()
                            .filter(|(i, _)| !deleted.contains(i))
                            .map(|(_, symbol)| symbol.clone())
                            .collect();
                        if !reduced.is_empty() {
                            trace!(
                                "{head} -> {} yields {head} -> {}",
                                show_body(body),
                                show_body(&reduced)
                            );
                            out.insert(reduced);
                        }
                    }
                    out.insert(body.clone());
                }
                (head.clone(), out)
            })
            .collect();

        if nullable.contains(self.start()) {
            warn!(
                "start symbol {} is nullable, the empty word is no longer generated",
                self.start()
            );
        }

        Grammar::from_parts(
            self.nonterminals().clone(),
            self.terminals().clone(),
            rules,
            self.start().to_string(),
        )
    }

    /// Eliminates all unit productions, i.e. productions whose body is a single nonterminal. Every
    /// nonterminal `A` obtains the non-unit productions of all nonterminals in its unit closure.
    pub fn remove_unit(&self) -> Grammar {
        let rules: OrderedMap<String, OrderedSet<Body>> = self
            .nonterminals()
            .iter()
            .map(|head| {
                let closure = self.unit_closure(head);
                trace!("unit closure of {head} is {closure:?}");
                let bodies = closure
                    .iter()
                    .flat_map(|name| self.productions(name))
                    .filter(|body| !is_unit(body))
                    .cloned()
                    .collect();
                (head.clone(), bodies)
            })
            .collect();

        Grammar::from_parts(
            self.nonterminals().clone(),
            self.terminals().clone(),
            rules,
            self.start().to_string(),
        )
    }

    /// Removes all nonterminals that are not reachable from the start symbol together with their
    /// productions and every production that mentions them.
    pub fn remove_inaccessible(&self) -> Grammar {
        let reachable = self.reachable_symbols();
        debug!(
            "removing inaccessible nonterminals {:?}",
            self.nonterminals().difference(&reachable).collect_vec()
        );
        self.restrict_to(&reachable)
    }

    /// Removes all nonterminals that do not derive any terminal word together with their
    /// productions and every production that mentions them.
    ///
    /// The start symbol is kept even if it is not productive, in that case it ends up without any
    /// production and the grammar generates the empty language.
    pub fn remove_nonproductive(&self) -> Grammar {
        let productive = self.productive_symbols();
        debug!(
            "removing non-productive nonterminals {:?}",
            self.nonterminals().difference(&productive).collect_vec()
        );
        if !productive.contains(self.start()) {
            warn!(
                "start symbol {} is not productive, the language is empty",
                self.start()
            );
        }
        self.restrict_to(&productive)
    }

    /// Keeps only the nonterminals in `keep` (and the start symbol) and the productions that do not
    /// mention any other nonterminal.
    fn restrict_to(&self, keep: &OrderedSet<String>) -> Grammar {
        let keeps = |name: &str| keep.contains(name);
        let nonterminals: OrderedSet<String> = self
            .nonterminals()
            .iter()
            .filter(|name| keeps(name.as_str()) || name.as_str() == self.start())
            .cloned()
            .collect();

        let rules = self
            .rule_map()
            .iter()
            .filter(|(head, _)| keeps(head.as_str()))
            .map(|(head, bodies)| {
                let bodies = bodies
                    .iter()
                    .filter(|body| {
                        body.iter()
                            .all(|symbol| symbol.as_nonterminal().map_or(true, keeps))
                    })
                    .cloned()
                    .collect();
                (head.clone(), bodies)
            })
            .collect();

        Grammar::from_parts(
            nonterminals,
            self.terminals().clone(),
            rules,
            self.start().to_string(),
        )
    }

    /// Brings every body into a length of at most two.
    ///
    /// For each terminal `t` a fresh nonterminal `X` with the sole production `X -> t` is
    /// introduced, and `t` is replaced by `X` in every body of length at least two. Bodies that are
    /// still longer than two are shortened from the right: the last two symbols are repeatedly
    /// replaced by a fresh nonterminal that produces exactly this pair. Fresh nonterminals are named
    /// `X0, X1, ...`, skipping names that are already in use. Bodies of length at most one are kept
    /// unchanged.
    pub fn binarize(&self) -> Grammar {
        let mut names = FreshNames::new();
        let mut nonterminals = self.nonterminals().clone();
        let mut rules: OrderedMap<String, OrderedSet<Body>> = OrderedMap::new();

        let replacements: Map<char, String> = self
            .terminals()
            .iter()
            .map(|&t| {
                let name = names.next(&mut nonterminals);
                rules.insert(name.clone(), OrderedSet::from([vec![Symbol::Terminal(t)]]));
                (t, name)
            })
            .collect();

        for (head, bodies) in self.rule_map() {
            for body in bodies {
                if body.len() < 2 {
                    rules.entry(head.clone()).or_default().insert(body.clone());
                    continue;
                }
                let mut rewritten: Body = body
                    .iter()
                    .map(|symbol| match symbol {
                        Symbol::Terminal(t) => Symbol::Nonterminal(replacements[t].clone()),
                        nonterminal => nonterminal.clone(),
                    })
                    .collect();
                while rewritten.len() > 2 {
                    let pair = rewritten.split_off(rewritten.len() - 2);
                    let name = names.next(&mut nonterminals);
                    trace!("introducing {name} -> {}", show_body(&pair));
                    rules.insert(name.clone(), OrderedSet::from([pair]));
                    rewritten.push(Symbol::Nonterminal(name));
                }
                rules.entry(head.clone()).or_default().insert(rewritten);
            }
        }

        Grammar::from_parts(
            nonterminals,
            self.terminals().clone(),
            rules,
            self.start().to_string(),
        )
    }

    /// Converts `self` into Chomsky normal form by eliminating epsilon productions and unit
    /// productions, removing inaccessible and non-productive nonterminals and finally binarizing all
    /// bodies.
    ///
    /// ```
    /// use chomsky::prelude::*;
    ///
    /// let grammar = Grammar::builder()
    ///     .with_nonterminals(["S", "A"])
    ///     .with_terminals(['a', 'b'])
    ///     .with_productions("S", ["aAb", "A"])
    ///     .with_productions("A", ["aA", "b"])
    ///     .with_start_symbol("S")
    ///     .build()
    ///     .unwrap();
    /// assert!(grammar.to_cnf().is_in_cnf());
    /// ```
    pub fn to_cnf(&self) -> Grammar {
        let without_epsilon = self.remove_epsilon();
        debug!(
            "eliminated epsilon productions, {} productions remain",
            without_epsilon.production_count()
        );
        let without_unit = without_epsilon.remove_unit();
        debug!(
            "eliminated unit productions, {} productions remain",
            without_unit.production_count()
        );
        let accessible = without_unit.remove_inaccessible();
        let productive = accessible.remove_nonproductive();
        let cnf = productive.binarize();
        debug!(
            "grammar in Chomsky normal form has {} nonterminals and {} productions",
            cnf.nonterminals().len(),
            cnf.production_count()
        );
        cnf
    }

    /// Returns true if every production is of the form `A -> BC` for nonterminals `B, C` or of the
    /// form `A -> a` for a terminal `a`.
    pub fn is_in_cnf(&self) -> bool {
        self.rules().all(|(_, body)| match body.as_slice() {
            [Symbol::Terminal(_)] => true,
            [Symbol::Nonterminal(_), Symbol::Nonterminal(_)] => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{grammar::tests::normalization_grammar, math::OrderedSet, prelude::*};

    fn nt(name: &str) -> Symbol {
        Symbol::nonterminal(name)
    }

    fn names<const N: usize>(names: [&str; N]) -> OrderedSet<String> {
        names.into_iter().map(String::from).collect()
    }

    #[test_log::test]
    fn fixpoints_of_normalization_grammar() {
        let grammar = normalization_grammar();
        assert_eq!(grammar.nullable_symbols(), names(["B"]));
        assert_eq!(grammar.reachable_symbols(), names(["A", "B", "S"]));
        assert_eq!(grammar.productive_symbols(), names(["A", "B", "C", "S"]));
        assert_eq!(grammar.unit_closure("S"), names(["S"]));
    }

    #[test_log::test]
    fn fixpoints_grow_monotonically_and_stabilize() {
        let grammar = normalization_grammar();
        let bound = grammar.nonterminals().len() + 1;

        let sequences = [
            grammar.nullable_fixpoint().collect::<Vec<_>>(),
            grammar.unit_fixpoint("A").collect(),
            grammar.reachable_fixpoint().collect(),
            grammar.productive_fixpoint().collect(),
        ];
        for sequence in sequences {
            assert!(sequence.len() <= bound);
            for (smaller, larger) in sequence.iter().zip(sequence.iter().skip(1)) {
                assert!(smaller.is_subset(larger));
                assert!(smaller.len() < larger.len());
            }
        }
    }

    #[test]
    fn productive_fixpoint_needs_several_rounds() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "A", "B", "C"])
            .with_terminals(['a'])
            .with_productions("S", ["A"])
            .with_productions("A", ["B"])
            .with_productions("B", ["C"])
            .with_productions("C", ["a"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        let rounds = grammar.productive_fixpoint().collect::<Vec<_>>();
        assert_eq!(rounds.len(), 5);
        assert_eq!(rounds[1], names(["C"]));
        assert_eq!(grammar.unit_closure("S"), names(["A", "B", "C", "S"]));
    }

    #[test_log::test]
    fn epsilon_removal_deletes_occurrences_independently() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "A"])
            .with_terminals(['a', 'b'])
            .with_productions("S", ["ASA", "b"])
            .with_productions("A", ["a", "ε"])
            .with_start_symbol("S")
            .build()
            .unwrap();

        let result = grammar.remove_epsilon();
        let s_bodies: OrderedSet<_> = result.productions("S").cloned().collect();
        assert_eq!(
            s_bodies,
            OrderedSet::from([
                vec![nt("A"), nt("S"), nt("A")],
                vec![nt("S"), nt("A")],
                vec![nt("A"), nt("S")],
                vec![nt("S")],
                vec!['b'.into()],
            ])
        );
        assert_eq!(result.productions("A").count(), 1);
        assert!(result.rules().all(|(_, body)| !body.is_empty()));
        // the input is left untouched
        assert!(grammar.has_production("A", &[]));
    }

    #[test]
    fn epsilon_removal_drops_empty_word_of_start_symbol() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S"])
            .with_terminals(['a', 'b'])
            .with_productions("S", ["aSb", "ε"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        let result = grammar.remove_epsilon();
        assert!(!result.has_production("S", &[]));
        assert!(result.has_production("S", &['a'.into(), 'b'.into()]));
        assert!(result.has_production("S", &['a'.into(), nt("S"), 'b'.into()]));
        assert_eq!(result.production_count(), 2);
    }

    #[test_log::test]
    fn unit_removal_inherits_productions_of_closure() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "A", "B"])
            .with_terminals(['a', 'b'])
            .with_productions("S", ["A", "aB"])
            .with_productions("A", ["B", "a"])
            .with_productions("B", ["b", "S"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        assert_eq!(grammar.unit_closure("S"), names(["A", "B", "S"]));

        let result = grammar.remove_unit();
        for head in ["S", "A", "B"] {
            let bodies: OrderedSet<_> = result.productions(head).cloned().collect();
            assert_eq!(
                bodies,
                OrderedSet::from([vec!['a'.into()], vec!['b'.into()], vec!['a'.into(), nt("B")]]),
                "unexpected productions of {head}"
            );
        }
    }

    #[test_log::test]
    fn inaccessible_removal_is_idempotent() {
        let grammar = normalization_grammar();
        let once = grammar.remove_inaccessible();
        assert_eq!(once.nonterminals(), &names(["A", "B", "S"]));
        assert_eq!(once.productions("C").count(), 0);
        assert_eq!(once.remove_inaccessible(), once);

        let cleaned = grammar.remove_epsilon().remove_unit().remove_inaccessible();
        assert_eq!(cleaned.remove_inaccessible(), cleaned);
    }

    #[test]
    fn nonproductive_removal_drops_mentions() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "A", "B"])
            .with_terminals(['a'])
            .with_productions("S", ["a", "AB", "aS"])
            .with_productions("A", ["a"])
            .with_productions("B", ["aB"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        let result = grammar.remove_nonproductive();
        assert_eq!(result.nonterminals(), &names(["A", "S"]));
        assert!(!result.has_production("S", &[nt("A"), nt("B")]));
        assert_eq!(result.production_count(), 3);
    }

    #[test]
    fn nonproductive_start_symbol_is_kept() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "A"])
            .with_terminals(['a'])
            .with_productions("S", ["aS", "A"])
            .with_productions("A", ["a"])
            .with_start_symbol("S")
            .build()
            .unwrap()
            .remove_unit();
        assert!(grammar.productive_symbols().contains("S"));

        let empty = Grammar::builder()
            .with_nonterminals(["S"])
            .with_terminals(['a'])
            .with_productions("S", ["aS"])
            .with_start_symbol("S")
            .build()
            .unwrap()
            .remove_nonproductive();
        assert_eq!(empty.nonterminals(), &names(["S"]));
        assert!(empty.has_no_productions());
    }

    #[test_log::test]
    fn binarization_replaces_terminals_and_splits_from_the_right() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "X0"])
            .with_terminals(['a', 'b'])
            .with_productions("S", ["aX0bS", "b"])
            .with_productions("X0", ["a"])
            .with_start_symbol("S")
            .build()
            .unwrap();
        let result = grammar.binarize();

        // X0 is taken, so `a` is replaced by X1 and `b` by X2
        assert!(result.has_production("X1", &['a'.into()]));
        assert!(result.has_production("X2", &['b'.into()]));
        // aX0bS becomes X1 X0 X2 S, which is split into X1 X4 with X4 -> X0 X3 and X3 -> X2 S
        assert!(result.has_production("S", &[nt("X1"), nt("X4")]));
        assert!(result.has_production("X4", &[nt("X0"), nt("X3")]));
        assert!(result.has_production("X3", &[nt("X2"), nt("S")]));
        assert!(result.has_production("S", &['b'.into()]));
        assert!(result.has_production("X0", &['a'.into()]));
        assert!(result.is_in_cnf());
    }

    #[test_log::test]
    fn normalization_grammar_ends_in_cnf() {
        let grammar = normalization_grammar();
        let cnf = grammar.to_cnf();
        tracing::debug!("grammar in CNF\n{cnf}");

        assert!(cnf.is_in_cnf());
        assert_eq!(&cnf.reachable_symbols(), cnf.nonterminals());
        assert_eq!(&cnf.productive_symbols(), cnf.nonterminals());
        assert!(!cnf.is_nonterminal("C"));
        assert!(!cnf.is_nonterminal("D"));
        assert!(cnf.nullable_symbols().is_empty());
        assert_eq!(cnf.start(), "S");
        // the input grammar is not modified by the pipeline
        assert_eq!(grammar, normalization_grammar());
    }
}
