use std::fmt::Display;

use tracing::trace;

use super::{show_body, Grammar, Symbol};

/// The four levels of the Chomsky hierarchy. The variants are ordered by how restrictive they are,
/// so [`ChomskyType::Regular`] is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChomskyType {
    /// Type 0, no restriction on the productions.
    Unrestricted,
    /// Type 1, no production decreases the length of the sentential form.
    ContextSensitive,
    /// Type 2, every head is a single nonterminal.
    ContextFree,
    /// Type 3, every production is left- or right-linear.
    Regular,
}

impl ChomskyType {
    /// Returns the number of the type in the hierarchy, i.e. `3` for [`ChomskyType::Regular`].
    pub fn level(&self) -> u8 {
        match self {
            ChomskyType::Unrestricted => 0,
            ChomskyType::ContextSensitive => 1,
            ChomskyType::ContextFree => 2,
            ChomskyType::Regular => 3,
        }
    }
}

impl Display for ChomskyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChomskyType::Unrestricted => "Unrestricted Grammar",
            ChomskyType::ContextSensitive => "Context-Sensitive Grammar",
            ChomskyType::ContextFree => "Context-Free Grammar",
            ChomskyType::Regular => "Regular Grammar",
        };
        write!(f, "Type {}: {name}", self.level())
    }
}

fn is_right_linear(body: &[Symbol]) -> bool {
    match body {
        [] | [_] => true,
        [Symbol::Terminal(_), Symbol::Nonterminal(_)] => true,
        _ => false,
    }
}

fn is_left_linear(body: &[Symbol]) -> bool {
    match body {
        [] | [_] => true,
        [Symbol::Nonterminal(_), Symbol::Terminal(_)] => true,
        _ => false,
    }
}

impl Grammar {
    /// Determines the most restrictive type of the Chomsky hierarchy that `self` belongs to.
    ///
    /// Every production is checked on its own: the grammar stays a candidate for type 3 as long as each
    /// production is right-linear or left-linear, where the direction may differ between productions.
    /// A grammar without any production is regular.
    pub fn classify(&self) -> ChomskyType {
        let mut regular = true;
        let mut context_free = true;
        let mut context_sensitive = true;

        for (head, body) in self.rules() {
            if regular && !(is_right_linear(body) || is_left_linear(body)) {
                trace!("{head} -> {} is neither left- nor right-linear", show_body(body));
                regular = false;
            }
            // the head is always a single symbol, so it only matters whether it is declared
            if context_free && !self.is_nonterminal(head) {
                context_free = false;
            }
            if context_sensitive && body.is_empty() && head != self.start() {
                trace!("{head} -> ε shortens the sentential form");
                context_sensitive = false;
            }
        }

        if regular {
            ChomskyType::Regular
        } else if context_free {
            ChomskyType::ContextFree
        } else if context_sensitive {
            ChomskyType::ContextSensitive
        } else {
            ChomskyType::Unrestricted
        }
    }
}
