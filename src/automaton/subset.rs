use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    math::{OrderedMap, OrderedSet, Set},
    Show, State,
};

use super::FiniteAutomaton;

/// A state of a determinized automaton: the set of states of the nondeterministic input automaton
/// that it stands for. Two state-sets are the same state precisely if they have the same members.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateSet<Q: State>(OrderedSet<Q>);

impl<Q: State> StateSet<Q> {
    /// Creates the state-set that only contains `state`.
    pub fn singleton(state: Q) -> Self {
        Self(OrderedSet::from([state]))
    }

    /// Iterates over the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Q> + '_ {
        self.0.iter()
    }

    /// Returns true if `state` is a member.
    pub fn contains(&self, state: &Q) -> bool {
        self.0.contains(state)
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<Q: State> FromIterator<Q> for StateSet<Q> {
    fn from_iter<T: IntoIterator<Item = Q>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<Q: State> Show for StateSet<Q> {
    fn show(&self) -> String {
        format!("{{{}}}", self.0.iter().map(|q| q.show()).join(", "))
    }
}

impl<Q: State> std::fmt::Debug for StateSet<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.show())
    }
}

impl<Q: State> FiniteAutomaton<Q> {
    /// Computes a deterministic automaton accepting the same language as `self`.
    ///
    /// If `self` is already deterministic, the result has exactly the structure of `self`, where every
    /// state `q` is replaced by the state-set `{q}`. Otherwise the subset construction is performed,
    /// starting in `{q0}` and only materializing the state-sets that are reachable from it. A
    /// state-set is final if it contains a final state of `self`, and a transition on a symbol is only
    /// added if the set of successors is not empty. Consequently, the result has at most `2^n` states
    /// where `n` is the number of states of `self`.
    pub fn to_dfa(&self) -> FiniteAutomaton<StateSet<Q>> {
        if self.is_deterministic() {
            debug!("automaton is already deterministic, wrapping states");
            return self.map_states(|q| StateSet::singleton(q.clone()));
        }

        let initial = StateSet::singleton(self.initial().clone());
        let mut discovered: Set<StateSet<Q>> = Set::default();
        let mut queue = VecDeque::from([initial.clone()]);
        discovered.insert(initial.clone());

        let mut states = OrderedSet::new();
        let mut finals = OrderedSet::new();
        let mut transitions: OrderedMap<(StateSet<Q>, char), OrderedSet<StateSet<Q>>> =
            OrderedMap::new();

        while let Some(current) = queue.pop_front() {
            trace!("processing state-set {}", current.show());
            if current.iter().any(|q| self.is_final(q)) {
                finals.insert(current.clone());
            }

            for symbol in self.alphabet().universe() {
                let target: StateSet<Q> = current
                    .iter()
                    .filter_map(|q| self.successors(q, symbol))
                    .flatten()
                    .cloned()
                    .collect();
                if target.is_empty() {
                    continue;
                }
                if discovered.insert(target.clone()) {
                    trace!(
                        "discovered state-set {} from {} on {symbol}",
                        target.show(),
                        current.show()
                    );
                    queue.push_back(target.clone());
                }
                transitions.insert((current.clone(), symbol), OrderedSet::from([target]));
            }

            states.insert(current);
        }

        debug!(
            "subset construction produced {} states from {}",
            states.len(),
            self.size()
        );
        FiniteAutomaton::from_parts(
            states,
            self.alphabet().clone(),
            transitions,
            initial,
            finals,
        )
    }
}
