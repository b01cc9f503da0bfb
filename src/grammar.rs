use std::fmt::Display;

use itertools::Itertools;
use thiserror::Error;

use crate::{
    math::{OrderedMap, OrderedSet},
    Show,
};

mod builder;
pub use builder::GrammarBuilder;

mod chomsky;
pub use chomsky::ChomskyType;

mod normal_form;

/// A symbol that can appear in the body of a production. Terminals are single characters,
/// nonterminals are identified by their name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A terminal symbol, which is never rewritten.
    Terminal(char),
    /// A nonterminal symbol with the given name.
    Nonterminal(String),
}

impl Symbol {
    /// Creates a nonterminal symbol with the given name.
    pub fn nonterminal<S: Into<String>>(name: S) -> Self {
        Symbol::Nonterminal(name.into())
    }

    /// Returns true if `self` is a terminal symbol.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// Returns true if `self` is a nonterminal symbol.
    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }

    /// Returns the name of the nonterminal, or `None` if `self` is a terminal.
    pub fn as_nonterminal(&self) -> Option<&str> {
        match self {
            Symbol::Nonterminal(name) => Some(name),
            Symbol::Terminal(_) => None,
        }
    }

    /// Returns the character of the terminal, or `None` if `self` is a nonterminal.
    pub fn as_terminal(&self) -> Option<char> {
        match self {
            Symbol::Terminal(t) => Some(*t),
            Symbol::Nonterminal(_) => None,
        }
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Self {
        Symbol::Terminal(value)
    }
}

impl Show for Symbol {
    fn show(&self) -> String {
        match self {
            Symbol::Terminal(t) => t.to_string(),
            Symbol::Nonterminal(name) => name.clone(),
        }
    }
}

/// The body (right-hand side) of a production. An empty body represents epsilon.
pub type Body = Vec<Symbol>;

/// Shows a body as its symbols written next to each other, or `ε` if it is empty.
pub(crate) fn show_body(body: &[Symbol]) -> String {
    if body.is_empty() {
        "ε".to_string()
    } else {
        body.iter().map(|symbol| symbol.show()).join("")
    }
}

/// Abstracts the errors that can occur when constructing or converting a [`Grammar`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum GrammarError {
    /// No start symbol was given to a [`GrammarBuilder`].
    #[error("missing start symbol")]
    MissingStart,
    /// The start symbol is not among the nonterminals.
    #[error("start symbol `{0}` is not a declared nonterminal")]
    UndeclaredStart(String),
    /// A production is given for a head that is not among the nonterminals.
    #[error("production head `{0}` is not a declared nonterminal")]
    UndeclaredHead(String),
    /// A body mentions a symbol that is neither a declared nonterminal nor a declared terminal.
    #[error("production `{head} -> {body}` uses undeclared symbol `{symbol}`")]
    UndeclaredSymbol {
        /// Head of the offending production.
        head: String,
        /// Body of the offending production.
        body: String,
        /// The symbol that was never declared.
        symbol: String,
    },
    /// A name is used for a nonterminal as well as for a terminal.
    #[error("`{0}` is declared both as nonterminal and as terminal")]
    NameCollision(String),
    /// Two distinct states of an automaton share the same name, so they cannot both become
    /// nonterminals.
    #[error("more than one state is named `{0}`")]
    DuplicateStateName(String),
    /// A conversion that requires a right-linear grammar encountered some other production.
    #[error("production `{head} -> {body}` is not right-linear")]
    NotRightLinear {
        /// Head of the offending production.
        head: String,
        /// Body of the offending production.
        body: String,
    },
}

/// Represents a context-free grammar $G = (V_N, V_T, P, S)$.
///
/// Productions are stored per nonterminal as a set of bodies, so duplicate bodies collapse. Every
/// nonterminal has an entry, which may be empty if it has no productions. A `Grammar` can only be
/// obtained through [`Grammar::new`] or a [`GrammarBuilder`], which verify that the start symbol
/// is a nonterminal, that every head is a nonterminal and that each symbol in a body is declared.
///
/// # Example
/// ```
/// use chomsky::prelude::*;
///
/// let grammar = Grammar::builder()
///     .with_nonterminals(["S", "A", "B"])
///     .with_terminals(['a', 'b', 'c'])
///     .with_productions("S", ["aS", "bS", "cA"])
///     .with_productions("A", ["aB"])
///     .with_productions("B", ["aB", "bB", "c"])
///     .with_start_symbol("S")
///     .build()
///     .unwrap();
/// assert_eq!(grammar.classify(), ChomskyType::Regular);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: OrderedSet<String>,
    terminals: OrderedSet<char>,
    rules: OrderedMap<String, OrderedSet<Body>>,
    start: String,
}

impl Grammar {
    /// Returns a new [`GrammarBuilder`].
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// Creates a new grammar from the given nonterminals, terminals, productions (given as pairs of
    /// head and body) and start symbol. Fails if the specification mentions a symbol that is not
    /// declared, or if a nonterminal is named like a terminal.
    pub fn new<N, T, R, H, X>(
        nonterminals: N,
        terminals: T,
        rules: R,
        start: X,
    ) -> Result<Self, GrammarError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator<Item = char>,
        R: IntoIterator<Item = (H, Body)>,
        H: Into<String>,
        X: Into<String>,
    {
        let nonterminals: OrderedSet<String> = nonterminals.into_iter().map(Into::into).collect();
        let terminals: OrderedSet<char> = terminals.into_iter().collect();
        let start = start.into();

        if let Some(name) = nonterminals.iter().find(|name| {
            let mut chars = name.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if terminals.contains(&c))
        }) {
            return Err(GrammarError::NameCollision(name.clone()));
        }
        if !nonterminals.contains(&start) {
            return Err(GrammarError::UndeclaredStart(start));
        }

        let mut productions: OrderedMap<String, OrderedSet<Body>> = nonterminals
            .iter()
            .map(|name| (name.clone(), OrderedSet::new()))
            .collect();
        for (head, body) in rules {
            let head: String = head.into();
            let Some(bodies) = productions.get_mut(&head) else {
                return Err(GrammarError::UndeclaredHead(head));
            };
            if let Some(symbol) = body.iter().find(|symbol| match symbol {
                Symbol::Terminal(t) => !terminals.contains(t),
                Symbol::Nonterminal(name) => !nonterminals.contains(name),
            }) {
                return Err(GrammarError::UndeclaredSymbol {
                    body: show_body(&body),
                    symbol: symbol.show(),
                    head,
                });
            }
            bodies.insert(body);
        }

        Ok(Self {
            nonterminals,
            terminals,
            rules: productions,
            start,
        })
    }

    /// Assembles a grammar from parts that are known to satisfy the invariants.
    pub(crate) fn from_parts(
        nonterminals: OrderedSet<String>,
        terminals: OrderedSet<char>,
        mut rules: OrderedMap<String, OrderedSet<Body>>,
        start: String,
    ) -> Self {
        debug_assert!(nonterminals.contains(&start));
        debug_assert!(rules.keys().all(|head| nonterminals.contains(head)));
        for name in &nonterminals {
            rules.entry(name.clone()).or_default();
        }
        Self {
            nonterminals,
            terminals,
            rules,
            start,
        }
    }

    /// Returns the set of nonterminals $V_N$.
    pub fn nonterminals(&self) -> &OrderedSet<String> {
        &self.nonterminals
    }

    /// Returns the set of terminals $V_T$.
    pub fn terminals(&self) -> &OrderedSet<char> {
        &self.terminals
    }

    /// Returns the start symbol $S$.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Returns true if `name` is a nonterminal of `self`.
    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminals.contains(name)
    }

    /// Returns an iterator over the bodies of all productions for the given `head`. If `head` is not
    /// a nonterminal, the iterator is empty.
    pub fn productions<'a>(&'a self, head: &str) -> impl Iterator<Item = &'a Body> + 'a {
        self.rules.get(head).into_iter().flatten()
    }

    /// Returns an iterator over all productions as pairs of head and body.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Body)> + '_ {
        self.rules
            .iter()
            .flat_map(|(head, bodies)| bodies.iter().map(move |body| (head.as_str(), body)))
    }

    /// Returns true if the production `head -> body` exists.
    pub fn has_production(&self, head: &str, body: &[Symbol]) -> bool {
        self.rules
            .get(head)
            .map(|bodies| bodies.iter().any(|b| b.as_slice() == body))
            .unwrap_or(false)
    }

    /// Returns the total number of productions.
    pub fn production_count(&self) -> usize {
        self.rules.values().map(|bodies| bodies.len()).sum()
    }

    /// Returns true if there is no production at all.
    pub fn has_no_productions(&self) -> bool {
        self.production_count() == 0
    }

    pub(crate) fn rule_map(&self) -> &OrderedMap<String, OrderedSet<Body>> {
        &self.rules
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "G = (VN, VT, P, {})", self.start)?;
        writeln!(f, "VN = {}", String::show_collection(&self.nonterminals))?;
        writeln!(f, "VT = {}", char::show_collection(&self.terminals))?;
        writeln!(f, "P = {{")?;
        for (head, body) in self.rules() {
            writeln!(f, "    {head} -> {}", show_body(body))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::prelude::*;

    /// The grammar that is normalized step by step into Chomsky normal form.
    pub fn normalization_grammar() -> Grammar {
        Grammar::builder()
            .with_nonterminals(["S", "A", "B", "C", "D"])
            .with_terminals(['a', 'b'])
            .with_productions("S", ["abAB"])
            .with_productions("A", ["aSab", "BS", "aA", "b"])
            .with_productions("B", ["BA", "ababB", "b", "ε"])
            .with_productions("C", ["AS"])
            .with_start_symbol("S")
            .build()
            .unwrap()
    }

    #[test_log::test]
    fn construction_collects_productions() {
        let grammar = normalization_grammar();
        assert_eq!(grammar.production_count(), 10);
        assert_eq!(grammar.productions("D").count(), 0);
        assert_eq!(grammar.productions("B").count(), 4);
        assert!(grammar.has_production("B", &[]));
        assert!(grammar.has_production(
            "A",
            &[Symbol::Nonterminal("B".into()), Symbol::Nonterminal("S".into())]
        ));
        assert_eq!(grammar.start(), "S");
    }

    #[test]
    fn duplicate_bodies_collapse() {
        let grammar = Grammar::new(
            ["S"],
            ['a'],
            [("S", vec!['a'.into()]), ("S", vec!['a'.into()])],
            "S",
        )
        .unwrap();
        assert_eq!(grammar.production_count(), 1);
    }

    #[test]
    fn undeclared_symbols_are_rejected() {
        let err = Grammar::new(
            ["S"],
            ['a'],
            [("S", vec!['a'.into(), Symbol::nonterminal("T")])],
            "S",
        )
        .unwrap_err();
        assert_eq!(
            err,
            GrammarError::UndeclaredSymbol {
                head: "S".into(),
                body: "aT".into(),
                symbol: "T".into()
            }
        );

        let err = Grammar::new(["S"], ['a'], [("S", vec!['b'.into()])], "S").unwrap_err();
        assert!(matches!(err, GrammarError::UndeclaredSymbol { symbol, .. } if symbol == "b"));

        let err = Grammar::new(["S"], ['a'], [("T", vec![])], "S").unwrap_err();
        assert_eq!(err, GrammarError::UndeclaredHead("T".into()));

        let err = Grammar::new(["S"], ['a'], Vec::<(String, Body)>::new(), "T").unwrap_err();
        assert_eq!(err, GrammarError::UndeclaredStart("T".into()));
    }

    #[test]
    fn nonterminal_named_like_terminal_is_rejected() {
        let err = Grammar::new(["S", "a"], ['a'], Vec::<(String, Body)>::new(), "S").unwrap_err();
        assert_eq!(err, GrammarError::NameCollision("a".into()));
    }

    #[test]
    fn display_lists_all_productions() {
        let grammar = Grammar::builder()
            .with_nonterminals(["S", "A"])
            .with_terminals(['a'])
            .with_productions("S", ["aA"])
            .with_productions("A", ["a", ""])
            .with_start_symbol("S")
            .build()
            .unwrap();
        assert_eq!(
            grammar.to_string(),
            "G = (VN, VT, P, S)\nVN = {A, S}\nVT = {a}\nP = {\n    A -> ε\n    A -> a\n    S -> aA\n}"
        );
    }
}
