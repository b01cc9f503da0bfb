//! Library for working with formal grammars and finite automata in Rust.
//!
//! A [`Grammar`] consists of a set of nonterminals $V_N$, a set of terminals $V_T$, a set of
//! productions $P$ and a start symbol $S$. Terminals are single characters, nonterminals are
//! arbitrary names. Grammars can be classified on the Chomsky hierarchy (see
//! [`grammar::ChomskyType`]) and any grammar can be brought into Chomsky normal form. The
//! normalization is a pipeline of individual transformations, each of which consumes a reference
//! to a grammar and produces a new one, so intermediate results stay inspectable:
//! - [`Grammar::remove_epsilon`] eliminates productions with an empty body,
//! - [`Grammar::remove_unit`] eliminates productions whose body is a single nonterminal,
//! - [`Grammar::remove_inaccessible`] drops nonterminals that cannot be reached from the start symbol,
//! - [`Grammar::remove_nonproductive`] drops nonterminals that do not derive any terminal word,
//! - [`Grammar::binarize`] introduces fresh nonterminals until every body has length one or two.
//!
//! [`Grammar::to_cnf`] runs all of these in order.
//!
//! A [`FiniteAutomaton`] is given by its states, an [`alphabet::CharAlphabet`], a transition relation
//! which may map a pair of state and symbol to multiple targets, an initial state and a set of
//! final states. Nondeterministic automata can be determinized through the subset construction in
//! [`FiniteAutomaton::to_dfa`], whose states are [`automaton::StateSet`]s. Right-linear grammars and
//! finite automata can be converted into each other, and automata can be exported in the DOT format
//! through [`automaton::Dottable`].
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use chomsky::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::CharAlphabet,
        automaton::{
            AutomatonBuilder, AutomatonError, Dottable, FiniteAutomaton, RegularState, StateSet,
        },
        grammar::{Body, ChomskyType, Grammar, GrammarBuilder, GrammarError, Symbol},
        math, Show, State,
    };
    #[cfg(feature = "random")]
    pub use super::random::{generate_random_nfa, generate_random_nfa_with};
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;

/// Defines context-free grammars, their classification and normalization.
pub mod grammar;
pub use grammar::Grammar;

/// Defines finite automata, their determinization and conversion into grammars.
pub mod automaton;
pub use automaton::FiniteAutomaton;

/// Implements the generation of random automata. This is feature gated behind the `random` feature.
#[cfg(feature = "random")]
pub mod random;

use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;

/// A state is simply a type that can be used to identify states of a [`FiniteAutomaton`].
pub trait State: Clone + Eq + Ord + Hash + Debug + Show {}

impl<T: Clone + Eq + Ord + Hash + Debug + Show> State for T {}

/// Helper trait which can be used to display states, symbols and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state that should be
    /// for example q0, for a set of states {q0, q1}.
    fn show(&self) -> String;
    /// Show a collection of the thing, for a collection of states this should be {q0, q1, q2, ...}.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for u32 {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for str {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for std::collections::BTreeSet<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}
