use std::fmt::Display;

use itertools::Itertools;

use crate::{Show, State};

use super::FiniteAutomaton;

/// Name of the invisible node from which the entry edge into the initial state originates.
const START_NODE: &str = "__start";

/// Turns `name` into a quoted DOT identifier, so that names like `{q0, q1}` can be used as is.
fn quote_dot_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Implemented by objects that can be exported in the DOT format understood by graphviz. Only the
/// textual description is produced, rendering it is left to external tools.
pub trait Dottable {
    /// The type of the nodes in the graph.
    type Node;

    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        let header = std::iter::once(format!(
            "digraph {} {{",
            self.dot_name().unwrap_or("A".to_string())
        ))
        .chain(self.dot_header_statements());

        let states = self.dot_nodes().map(|q| {
            format!(
                "{} [{}]",
                quote_dot_ident(&self.dot_state_ident(&q)),
                self.dot_state_attributes(&q)
                    .into_iter()
                    .map(|attr| attr.to_string())
                    .join(", ")
            )
        });

        let transitions = self.dot_transitions().map(|(source, target, attributes)| {
            format!(
                "{} -> {} [{}]",
                quote_dot_ident(&self.dot_state_ident(&source)),
                quote_dot_ident(&self.dot_state_ident(&target)),
                attributes.into_iter().map(|attr| attr.to_string()).join(", ")
            )
        });

        header
            .chain(states)
            .chain(transitions)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }

    /// Statements that are emitted right after the opening line of the graph.
    fn dot_header_statements(&self) -> impl IntoIterator<Item = String> {
        []
    }

    /// The name of the graph.
    fn dot_name(&self) -> Option<String>;

    /// Iterates over all nodes of the graph.
    fn dot_nodes(&self) -> impl Iterator<Item = Self::Node> + '_;

    /// Iterates over all edges as triples of source, target and attributes.
    fn dot_transitions(
        &self,
    ) -> impl Iterator<Item = (Self::Node, Self::Node, Vec<DotTransitionAttribute>)> + '_;

    /// The (unquoted) identifier of a node.
    fn dot_state_ident(&self, node: &Self::Node) -> String;

    /// The attributes of a node.
    fn dot_state_attributes(&self, _node: &Self::Node) -> impl IntoIterator<Item = DotStateAttribute> {
        []
    }
}

impl<Q: State> Dottable for FiniteAutomaton<Q> {
    type Node = Q;

    fn dot_name(&self) -> Option<String> {
        Some(if self.is_deterministic() { "DFA" } else { "NFA" }.into())
    }

    fn dot_header_statements(&self) -> impl IntoIterator<Item = String> {
        [
            "rankdir=LR".to_string(),
            format!(
                "{START_NODE} [{}, {}]",
                DotStateAttribute::Shape("none".into()),
                DotStateAttribute::Label(String::new())
            ),
            format!(
                "{START_NODE} -> {}",
                quote_dot_ident(&self.dot_state_ident(self.initial()))
            ),
        ]
    }

    fn dot_nodes(&self) -> impl Iterator<Item = Q> + '_ {
        self.states().iter().cloned()
    }

    fn dot_transitions(&self) -> impl Iterator<Item = (Q, Q, Vec<DotTransitionAttribute>)> + '_ {
        self.transitions().map(|(source, symbol, target)| {
            (
                source.clone(),
                target.clone(),
                vec![DotTransitionAttribute::Label(symbol.show())],
            )
        })
    }

    fn dot_state_ident(&self, node: &Q) -> String {
        // names given by `Show` need not be unique, positions are
        match self.states().iter().position(|q| q == node) {
            Some(idx) => format!("s{idx}"),
            None => node.show(),
        }
    }

    fn dot_state_attributes(&self, node: &Q) -> impl IntoIterator<Item = DotStateAttribute> {
        let shape = if self.is_final(node) {
            "doublecircle"
        } else {
            "circle"
        };
        vec![
            DotStateAttribute::Shape(shape.into()),
            DotStateAttribute::Label(node.show()),
        ]
    }
}

/// Enum that abstracts attributes of nodes in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label={}", quote_dot_ident(s)),
            DotStateAttribute::Shape(s) => write!(f, "shape={}", quote_dot_ident(s)),
        }
    }
}

/// Enum that abstracts attributes of edges in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotTransitionAttribute {
    /// The label of an edge
    Label(String),
}

impl Display for DotTransitionAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotTransitionAttribute::Label(lbl) => write!(f, "label={}", quote_dot_ident(lbl)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{prelude::*, tests::variant_nfa};

    #[test]
    fn dot_of_small_dfa() {
        let dfa = FiniteAutomaton::builder()
            .with_states(["p", "q"])
            .with_alphabet_symbols(['a'])
            .with_transitions([("p", 'a', "q")])
            .with_final_states(["q"])
            .into_automaton("p")
            .unwrap();
        assert_eq!(
            dfa.dot_representation(),
            r#"digraph DFA {
rankdir=LR
__start [shape="none", label=""]
__start -> "s0"
"s0" [shape="circle", label="p"]
"s1" [shape="doublecircle", label="q"]
"s0" -> "s1" [label="a"]
}"#
        );
    }

    #[test_log::test]
    fn dot_of_determinized_automaton() {
        let nfa = variant_nfa();
        assert_eq!(nfa.dot_name().as_deref(), Some("NFA"));

        let dot = nfa.to_dfa().dot_representation();
        assert!(dot.starts_with("digraph DFA {"));
        // state-sets in order: {q0}, {q0, q1}, {q2}, {q3}
        assert!(dot.contains(r#"__start -> "s0""#));
        assert!(dot.contains(r#""s3" [shape="doublecircle", label="{q3}"]"#));
        assert!(dot.contains(r#""s1" -> "s2" [label="b"]"#));
        assert_eq!(dot.matches("doublecircle").count(), 1);
        assert_eq!(dot.matches(" -> ").count(), 7);
    }

    #[test]
    fn states_with_equal_names_stay_apart() {
        let fa = FiniteAutomaton::new(
            [RegularState::Nonterminal("Final".into()), RegularState::Final],
            CharAlphabet::new(['a']),
            [(RegularState::Nonterminal("Final".into()), 'a', RegularState::Final)],
            RegularState::Nonterminal("Final".into()),
            [RegularState::Final],
        )
        .unwrap();
        let dot = fa.dot_representation();
        assert!(dot.contains(r#""s0" [shape="circle", label="Final"]"#));
        assert!(dot.contains(r#""s1" [shape="doublecircle", label="Final"]"#));
        assert!(dot.contains(r#""s0" -> "s1" [label="a"]"#));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(super::quote_dot_ident(r#"a"b"#), r#""a\"b""#);
    }
}
