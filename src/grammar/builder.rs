use itertools::Itertools;
use tracing::trace;

use super::{Body, Grammar, GrammarError, Symbol};

/// Alternative of a production as it was handed to the builder.
#[derive(Debug, Clone)]
enum Alternative {
    Symbols(Body),
    Text(String),
}

/// Helper struct for the step by step construction of a [`Grammar`]. Nothing is validated until
/// [`GrammarBuilder::build`] is called, so nonterminals may be declared after they are first used in a
/// production.
///
/// Bodies can either be given explicitly as a [`Body`] or as text through
/// [`GrammarBuilder::with_productions`]. Text is split into symbols from left to right: at each
/// position the longest declared nonterminal name that matches is taken, otherwise the character is
/// read as a terminal. Whitespace is ignored and both the empty string and `ε` denote the empty body.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    nonterminals: Vec<String>,
    terminals: Vec<char>,
    rules: Vec<(String, Alternative)>,
    start: Option<String>,
}

impl GrammarBuilder {
    /// Declares the given names as nonterminals.
    pub fn with_nonterminals<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.nonterminals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares the given characters as terminals.
    pub fn with_terminals<I: IntoIterator<Item = char>>(mut self, terminals: I) -> Self {
        self.terminals.extend(terminals);
        self
    }

    /// Sets the start symbol.
    pub fn with_start_symbol<S: Into<String>>(mut self, start: S) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Adds the production `head -> body`.
    pub fn with_rule<S: Into<String>>(mut self, head: S, body: Body) -> Self {
        self.rules.push((head.into(), Alternative::Symbols(body)));
        self
    }

    /// Adds one production `head -> alternative` for each of the given textual alternatives.
    pub fn with_productions<S, I>(mut self, head: S, alternatives: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let head = head.into();
        self.rules.extend(alternatives.into_iter().map(|alternative| {
            (
                head.clone(),
                Alternative::Text(alternative.as_ref().to_string()),
            )
        }));
        self
    }

    /// Splits `text` into symbols, preferring the longest nonterminal name at each position.
    fn split_body(names: &[&str], text: &str) -> Body {
        let mut body = Body::new();
        let mut rest = text.trim();
        if rest == "ε" {
            return body;
        }
        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() {
                rest = &rest[c.len_utf8()..];
                continue;
            }
            match names.iter().find(|name| rest.starts_with(**name)) {
                Some(name) => {
                    body.push(Symbol::Nonterminal(name.to_string()));
                    rest = &rest[name.len()..];
                }
                None => {
                    body.push(Symbol::Terminal(c));
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        body
    }

    /// Consumes `self` and builds the described [`Grammar`], failing if no start symbol was given or
    /// if the described grammar is malformed (see [`Grammar::new`]).
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let start = self.start.ok_or(GrammarError::MissingStart)?;
        let names = self
            .nonterminals
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .sorted_by(|left, right| right.len().cmp(&left.len()).then(left.cmp(right)))
            .collect_vec();

        let rules = self
            .rules
            .into_iter()
            .map(|(head, alternative)| {
                let body = match alternative {
                    Alternative::Symbols(body) => body,
                    Alternative::Text(text) => Self::split_body(&names, &text),
                };
                (head, body)
            })
            .collect_vec();
        trace!(
            "building grammar with {} nonterminals and {} productions",
            self.nonterminals.len(),
            rules.len()
        );

        Grammar::new(
            self.nonterminals.iter().cloned(),
            self.terminals,
            rules,
            start,
        )
    }
}
