use tracing::debug;

use crate::{
    alphabet::CharAlphabet,
    math::{OrderedMap, OrderedSet},
    FiniteAutomaton,
};

/// Generates a random, usually nondeterministic, automaton with `size` states named `q0` to
/// `q{size - 1}` over an alphabet with `symbols` many symbols (see [`CharAlphabet::of_size`]).
/// The initial state is always `q0`. The algorithm is as follows:
/// 1. For each state `p`, each symbol `a` and each state `q`, the transition `(p, a) -> q` is added
///    with probability `probability`.
/// 2. Each state is made final with probability one half.
///
/// All randomness is drawn from `rng`, so a seeded [`fastrand::Rng`] always yields the same automaton.
pub fn generate_random_nfa_with(
    rng: &mut fastrand::Rng,
    size: usize,
    symbols: usize,
    probability: f64,
) -> FiniteAutomaton {
    assert!(size > 0, "an automaton needs at least one state");
    let alphabet = CharAlphabet::of_size(symbols);
    let states: Vec<String> = (0..size).map(|i| format!("q{i}")).collect();

    let mut transitions: OrderedMap<(String, char), OrderedSet<String>> = OrderedMap::new();
    for source in &states {
        for symbol in alphabet.universe() {
            for target in &states {
                if rng.f64() < probability {
                    transitions
                        .entry((source.clone(), symbol))
                        .or_default()
                        .insert(target.clone());
                }
            }
        }
    }
    let finals: OrderedSet<String> = states.iter().filter(|_| rng.bool()).cloned().collect();

    debug!(
        "generated random automaton with {size} states, {} transition pairs and {} final states",
        transitions.len(),
        finals.len()
    );
    FiniteAutomaton::from_parts(
        states.iter().cloned().collect(),
        alphabet,
        transitions,
        states[0].clone(),
        finals,
    )
}

/// Works as [`generate_random_nfa_with`], but draws from a freshly seeded generator.
pub fn generate_random_nfa(size: usize, symbols: usize, probability: f64) -> FiniteAutomaton {
    generate_random_nfa_with(&mut fastrand::Rng::new(), size, symbols, probability)
}
