use thiserror::Error;
use tracing::trace;

use crate::{
    alphabet::CharAlphabet,
    math::{OrderedMap, OrderedSet},
    Show, State,
};

mod builder;
pub use builder::AutomatonBuilder;

mod subset;
pub use subset::StateSet;

mod convert;
pub use convert::RegularState;

mod dot;
pub use dot::{DotStateAttribute, DotTransitionAttribute, Dottable};

mod table;

/// Abstracts the errors that can occur when constructing a [`FiniteAutomaton`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AutomatonError {
    /// The initial state is not among the declared states.
    #[error("initial state `{0}` is not a declared state")]
    UndeclaredInitial(String),
    /// A final state is not among the declared states.
    #[error("final state `{0}` is not a declared state")]
    UndeclaredFinal(String),
    /// A transition starts or ends in a state that is not declared.
    #[error("transition ({from}, {symbol}) -> {to} uses undeclared state `{state}`")]
    UndeclaredState {
        /// Source of the offending transition.
        from: String,
        /// Symbol of the offending transition.
        symbol: char,
        /// Target of the offending transition.
        to: String,
        /// The state that was never declared.
        state: String,
    },
    /// A transition is labelled with a symbol outside of the alphabet.
    #[error("transition ({from}, {symbol}) -> {to} uses symbol `{symbol}` which is not in the alphabet")]
    UndeclaredSymbol {
        /// Source of the offending transition.
        from: String,
        /// Symbol of the offending transition.
        symbol: char,
        /// Target of the offending transition.
        to: String,
    },
}

/// A finite automaton $(Q, \Sigma, \delta, q_0, F)$ whose transition relation may map a pair of state
/// and symbol to several targets.
///
/// The type of states is generic: automata that are given literally usually use `String` labels,
/// while the deterministic automata computed by [`FiniteAutomaton::to_dfa`] have [`StateSet`]s as
/// states. All collections are ordered, so two automata compare equal precisely if they are
/// structurally identical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiniteAutomaton<Q: State = String> {
    states: OrderedSet<Q>,
    alphabet: CharAlphabet,
    transitions: OrderedMap<(Q, char), OrderedSet<Q>>,
    initial: Q,
    finals: OrderedSet<Q>,
}

impl FiniteAutomaton<String> {
    /// Returns an [`AutomatonBuilder`] for an automaton with `String` labelled states. This should be
    /// the main method for the construction of automata on the fly.
    ///
    /// # Example
    ///
    /// We want to create an automaton with states `q0, q1` over the alphabet `{a, b}` that accepts
    /// all words ending in `ab`. This can be done as follows
    /// ```
    /// use chomsky::prelude::*;
    ///
    /// let nfa = FiniteAutomaton::builder()
    ///     .with_states(["q0", "q1", "q2"])
    ///     .with_alphabet_symbols(['a', 'b'])
    ///     .with_transitions([
    ///         ("q0", 'a', "q0"),
    ///         ("q0", 'b', "q0"),
    ///         ("q0", 'a', "q1"),
    ///         ("q1", 'b', "q2"),
    ///     ])
    ///     .with_final_states(["q2"])
    ///     .into_automaton("q0") // q0 is the initial state
    ///     .unwrap();
    /// assert!(nfa.accepts("abab"));
    /// assert!(!nfa.is_deterministic());
    /// ```
    pub fn builder() -> AutomatonBuilder<String> {
        AutomatonBuilder::default()
    }
}

impl<Q: State> FiniteAutomaton<Q> {
    /// Creates a new automaton from the given states, alphabet, transitions (as triples of source,
    /// symbol and target), initial state and final states. Fails if a transition, the initial state or a
    /// final state refers to an undeclared state, or if a transition uses a symbol that is not in the
    /// alphabet.
    pub fn new<S, T, F>(
        states: S,
        alphabet: CharAlphabet,
        transitions: T,
        initial: Q,
        finals: F,
    ) -> Result<Self, AutomatonError>
    where
        S: IntoIterator<Item = Q>,
        T: IntoIterator<Item = (Q, char, Q)>,
        F: IntoIterator<Item = Q>,
    {
        let states: OrderedSet<Q> = states.into_iter().collect();
        if !states.contains(&initial) {
            return Err(AutomatonError::UndeclaredInitial(initial.show()));
        }
        let finals: OrderedSet<Q> = finals.into_iter().collect();
        if let Some(q) = finals.iter().find(|q| !states.contains(q)) {
            return Err(AutomatonError::UndeclaredFinal(q.show()));
        }

        let mut delta: OrderedMap<(Q, char), OrderedSet<Q>> = OrderedMap::new();
        for (from, symbol, to) in transitions {
            if let Some(q) = [&from, &to].into_iter().find(|q| !states.contains(*q)) {
                return Err(AutomatonError::UndeclaredState {
                    state: q.show(),
                    from: from.show(),
                    to: to.show(),
                    symbol,
                });
            }
            if !alphabet.contains(symbol) {
                return Err(AutomatonError::UndeclaredSymbol {
                    from: from.show(),
                    to: to.show(),
                    symbol,
                });
            }
            delta.entry((from, symbol)).or_default().insert(to);
        }

        Ok(Self::from_parts(states, alphabet, delta, initial, finals))
    }

    /// Assembles an automaton from parts that are known to satisfy the invariants.
    pub(crate) fn from_parts(
        states: OrderedSet<Q>,
        alphabet: CharAlphabet,
        mut transitions: OrderedMap<(Q, char), OrderedSet<Q>>,
        initial: Q,
        finals: OrderedSet<Q>,
    ) -> Self {
        transitions.retain(|_, targets| !targets.is_empty());
        debug_assert!(states.contains(&initial));
        debug_assert!(finals.is_subset(&states));
        debug_assert!(transitions.iter().all(|((q, a), targets)| {
            states.contains(q) && alphabet.contains(*a) && targets.is_subset(&states)
        }));
        Self {
            states,
            alphabet,
            transitions,
            initial,
            finals,
        }
    }

    /// Returns the set of states.
    pub fn states(&self) -> &OrderedSet<Q> {
        &self.states
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns a reference to the alphabet.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// Returns the initial state.
    pub fn initial(&self) -> &Q {
        &self.initial
    }

    /// Returns the set of final states.
    pub fn final_states(&self) -> &OrderedSet<Q> {
        &self.finals
    }

    /// Returns true if `state` is a final state.
    pub fn is_final(&self, state: &Q) -> bool {
        self.finals.contains(state)
    }

    /// Returns an iterator over all transitions as triples of source, symbol and target. A pair of
    /// source and symbol with several targets yields one triple for each of them.
    pub fn transitions(&self) -> impl Iterator<Item = (&Q, char, &Q)> + '_ {
        self.transitions
            .iter()
            .flat_map(|((from, symbol), targets)| targets.iter().map(move |to| (from, *symbol, to)))
    }

    /// Returns the set of states that are reached from `state` on `symbol`, which is `None` if there is
    /// no such transition.
    pub fn successors(&self, state: &Q, symbol: char) -> Option<&OrderedSet<Q>> {
        self.transitions.get(&(state.clone(), symbol))
    }

    /// Returns true if no pair of state and symbol has more than one target.
    pub fn is_deterministic(&self) -> bool {
        self.transitions.iter().all(|(_, targets)| targets.len() <= 1)
    }

    /// Computes the set of states that can be reached by reading `word` from the initial state. A
    /// symbol outside of the alphabet leads to the empty set.
    pub fn run<W: IntoIterator<Item = char>>(&self, word: W) -> OrderedSet<Q> {
        word.into_iter()
            .fold(OrderedSet::from([self.initial.clone()]), |current, symbol| {
                let next: OrderedSet<Q> = current
                    .iter()
                    .filter_map(|q| self.successors(q, symbol))
                    .flatten()
                    .cloned()
                    .collect();
                trace!(
                    "reading {symbol} leads from {} to {}",
                    Q::show_collection(&current),
                    Q::show_collection(&next)
                );
                next
            })
    }

    /// Returns true if the automaton accepts `word`, i.e. if some run on it ends in a final state.
    pub fn accepts(&self, word: &str) -> bool {
        self.run(word.chars()).iter().any(|q| self.is_final(q))
    }

    /// Returns a new automaton in which every state is relabelled through `f`, which should be
    /// injective on the states of `self`.
    pub fn map_states<P: State, M: Fn(&Q) -> P>(&self, f: M) -> FiniteAutomaton<P> {
        FiniteAutomaton::from_parts(
            self.states.iter().map(&f).collect(),
            self.alphabet.clone(),
            self.transitions
                .iter()
                .map(|((from, symbol), targets)| ((f(from), *symbol), targets.iter().map(&f).collect()))
                .collect(),
            f(&self.initial),
            self.finals.iter().map(&f).collect(),
        )
    }

    /// Returns all words of length at most `max_length` over the alphabet that are accepted, ordered
    /// by length and then lexicographically.
    pub fn accepted_words(&self, max_length: usize) -> Vec<String> {
        let mut accepted = Vec::new();
        let mut layer = vec![String::new()];
        for length in 0..=max_length {
            accepted.extend(layer.iter().filter(|word| self.accepts(word)).cloned());
            if length < max_length {
                layer = layer
                    .iter()
                    .flat_map(|word| self.alphabet.universe().map(move |c| format!("{word}{c}")))
                    .collect();
            }
        }
        accepted
    }
}
