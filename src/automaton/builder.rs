use tracing::trace;

use crate::{alphabet::CharAlphabet, math::Set, State};

use super::{AutomatonError, FiniteAutomaton};

/// Helper struct for the construction of [`FiniteAutomaton`]s. It collects states, alphabet symbols,
/// transitions and final states and only validates them once [`AutomatonBuilder::into_automaton`]
/// is called.
///
/// Unlike the transitions, which may only use declared states, the alphabet is exactly the set of
/// symbols that were passed to [`AutomatonBuilder::with_alphabet_symbols`]. A transition on any other
/// symbol is rejected.
///
/// # Example
///
/// We want an automaton with states `0` and `1` over `{a, b}` that flips between them on `b`:
/// ```
/// use chomsky::prelude::*;
///
/// let dfa = AutomatonBuilder::<u32>::default()
///     .with_states([0u32, 1])
///     .with_alphabet_symbols(['a', 'b'])
///     .with_transitions([(0u32, 'a', 0u32), (0, 'b', 1), (1, 'a', 1), (1, 'b', 0)])
///     .with_final_states([1u32])
///     .into_automaton(0u32)
///     .unwrap();
/// assert!(dfa.is_deterministic());
/// assert!(!dfa.accepts("abab"));
/// assert!(dfa.accepts("aab"));
/// ```
#[derive(Debug, Clone)]
pub struct AutomatonBuilder<Q = String> {
    states: Vec<Q>,
    symbols: Set<char>,
    transitions: Vec<(Q, char, Q)>,
    finals: Vec<Q>,
}

impl<Q> Default for AutomatonBuilder<Q> {
    fn default() -> Self {
        Self {
            states: vec![],
            symbols: Set::default(),
            transitions: vec![],
            finals: vec![],
        }
    }
}

impl<Q: State> AutomatonBuilder<Q> {
    /// Declares the given states.
    pub fn with_states<I, X>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Q>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds the given symbols to the alphabet.
    pub fn with_alphabet_symbols<I>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        self.symbols.extend(symbols);
        self
    }

    /// Adds a list of transitions, each given as a triple of source, symbol and target.
    pub fn with_transitions<I, X, Y>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (X, char, Y)>,
        X: Into<Q>,
        Y: Into<Q>,
    {
        self.transitions.extend(
            transitions
                .into_iter()
                .map(|(from, symbol, to)| (from.into(), symbol, to.into())),
        );
        self
    }

    /// Marks the given states as final.
    pub fn with_final_states<I, X>(mut self, finals: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Q>,
    {
        self.finals.extend(finals.into_iter().map(Into::into));
        self
    }

    /// Consumes `self` and builds the automaton with the given `initial` state, see
    /// [`FiniteAutomaton::new`] for the conditions under which this fails.
    pub fn into_automaton<X: Into<Q>>(self, initial: X) -> Result<FiniteAutomaton<Q>, AutomatonError> {
        trace!(
            "building automaton with {} states and {} transitions",
            self.states.len(),
            self.transitions.len()
        );
        FiniteAutomaton::new(
            self.states,
            CharAlphabet::new(self.symbols),
            self.transitions,
            initial.into(),
            self.finals,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn alphabet_is_exactly_the_declared_symbols() {
        let fa = FiniteAutomaton::builder()
            .with_states(["p", "q"])
            .with_alphabet_symbols(['b', 'a', 'c'])
            .with_transitions([("p", 'a', "q")])
            .into_automaton("p")
            .unwrap();
        assert_eq!(fa.alphabet(), &CharAlphabet::new(['a', 'b', 'c']));
        assert!(fa.final_states().is_empty());

        let err = FiniteAutomaton::builder()
            .with_states(["p"])
            .with_transitions([("p", 'a', "p")])
            .into_automaton("p")
            .unwrap_err();
        assert!(matches!(err, AutomatonError::UndeclaredSymbol { symbol: 'a', .. }));
    }
}
