use owo_colors::OwoColorize;

use crate::{Show, State};

use super::FiniteAutomaton;

impl<Q: State> FiniteAutomaton<Q> {
    /// Renders the transition relation as a table with one row per state and one column per symbol.
    /// The initial state is prefixed with `→`, final states are prefixed with `*` and printed in
    /// bold. A cell holds the single target of a transition, the set of targets if there are several,
    /// or `-` if there is none.
    pub fn transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(self.alphabet().universe().map(|a| a.show())),
        );

        for q in self.states() {
            let mut label = q.show();
            if self.is_final(q) {
                label = format!("*{label}").bold().to_string();
            }
            if q == self.initial() {
                label = format!("→{label}");
            }

            let mut row = vec![label];
            for symbol in self.alphabet().universe() {
                row.push(match self.successors(q, symbol) {
                    None => "-".to_string(),
                    Some(targets) if targets.len() == 1 => targets.iter().map(Show::show).collect(),
                    Some(targets) => Q::show_collection(targets),
                });
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}
