use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;
/// Sets whose iteration order is the order of the elements. Used wherever the contents are
/// stored or displayed, so that equality and output do not depend on hashing.
pub type OrderedSet<S> = BTreeSet<S>;
/// Maps whose iteration order is the order of the keys.
pub type OrderedMap<K, V> = BTreeMap<K, V>;

/// Iterator over the successive approximations of a least fixpoint.
///
/// Starting from an initial set, every call to `step` is given the current approximation and
/// returns candidates that should be added. The first item yielded is the initial set, every
/// further item is strictly larger than its predecessor and the iterator ends as soon as a step
/// adds nothing new. As each yielded set strictly grows, a fixpoint over a universe of size `n`
/// yields at most `n - |initial| + 1` items.
///
/// ```
/// use chomsky::math::Fixpoint;
///
/// // all numbers below 10 reachable from 1 by doubling
/// let levels: Vec<_> = Fixpoint::new([1], |current: &chomsky::math::OrderedSet<i32>| {
///     current.iter().map(|x| x * 2).filter(|x| *x < 10).collect::<Vec<_>>()
/// })
/// .collect();
/// assert_eq!(levels.len(), 4);
/// assert_eq!(levels.last().unwrap().len(), 4);
/// ```
pub struct Fixpoint<T, F> {
    current: OrderedSet<T>,
    step: F,
    started: bool,
    done: bool,
}

impl<T, F, I> Fixpoint<T, F>
where
    T: Ord + Clone,
    F: FnMut(&OrderedSet<T>) -> I,
    I: IntoIterator<Item = T>,
{
    /// Creates a new fixpoint computation from the given initial elements and step function.
    pub fn new<X: IntoIterator<Item = T>>(initial: X, step: F) -> Self {
        Self {
            current: initial.into_iter().collect(),
            step,
            started: false,
            done: false,
        }
    }

    /// Runs the computation to completion and returns the least fixpoint.
    pub fn solve(mut self) -> OrderedSet<T> {
        let mut iterations = 0;
        loop {
            let before = self.current.len();
            let additions = (self.step)(&self.current);
            self.current.extend(additions);
            iterations += 1;
            if self.current.len() == before {
                trace!(
                    "fixpoint stabilized after {iterations} iterations with {} elements",
                    before
                );
                return self.current;
            }
        }
    }
}

impl<T, F, I> Iterator for Fixpoint<T, F>
where
    T: Ord + Clone,
    F: FnMut(&OrderedSet<T>) -> I,
    I: IntoIterator<Item = T>,
{
    type Item = OrderedSet<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(self.current.clone());
        }
        if self.done {
            return None;
        }
        let before = self.current.len();
        let additions = (self.step)(&self.current);
        self.current.extend(additions);
        if self.current.len() == before {
            self.done = true;
            None
        } else {
            Some(self.current.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn fixpoint_yields_growing_approximations() {
        let edges = [(0, 1), (1, 2), (2, 0), (3, 4)];
        let approximations: Vec<_> = Fixpoint::new([0], |current: &OrderedSet<i32>| {
            edges
                .iter()
                .filter(|(from, _)| current.contains(from))
                .map(|(_, to)| *to)
                .collect::<Vec<_>>()
        })
        .collect();

        assert_eq!(approximations.len(), 3);
        for (smaller, larger) in approximations.iter().zip(approximations.iter().skip(1)) {
            assert!(smaller.is_subset(larger));
            assert!(smaller.len() < larger.len());
        }
        assert_eq!(
            approximations.last().unwrap(),
            &OrderedSet::from([0, 1, 2])
        );
    }

    #[test]
    fn solve_agrees_with_last_approximation() {
        let step = |current: &OrderedSet<u32>| {
            current
                .iter()
                .filter_map(|x| (x + 3 < 20).then_some(x + 3))
                .collect::<Vec<_>>()
        };
        let solved = Fixpoint::new([2], step).solve();
        let last = Fixpoint::new([2], step).last().unwrap();
        assert_eq!(solved, last);
        assert_eq!(solved.len(), 6);
    }

    #[test]
    fn empty_initial_with_nothing_to_add() {
        let solved = Fixpoint::new(Vec::<char>::new(), |_: &OrderedSet<char>| None).solve();
        assert!(solved.is_empty());
    }
}
