//! Subset construction algorithm for converting an ε-NFA to a DFA.

use crate::formlang::automaton::Automaton;
use crate::formlang::state::{StateId, StateSet};
use crate::formlang::symbol::{Symbol, SymbolOrder};
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Convert an automaton (epsilon transitions allowed) into an equivalent DFA.
///
/// The result is a new automaton; `nfa` is left untouched. States with an empty move
/// on some symbol get no transition for it, so the DFA may be partial.
pub fn determinize<T: Symbol, C: SymbolOrder<T>>(nfa: &Automaton<T>, cmp: &C) -> Automaton<T> {
    determinize_with_origins(nfa, cmp).0
}

/// Like [`determinize`], also returning for every DFA state the sorted NFA states it
/// stands for.
pub fn determinize_with_origins<T: Symbol, C: SymbolOrder<T>>(
    nfa: &Automaton<T>,
    cmp: &C,
) -> (Automaton<T>, HashMap<StateId, Vec<StateId>>) {
    let mut dfa = Automaton::new();
    dfa.extend_alphabet(nfa.alphabet().iter().cloned());

    let Some(start) = nfa.initial() else {
        return (dfa, HashMap::new());
    };

    // Each DFA state corresponds to a set of NFA states, keyed by its sorted members
    let mut state_mapping: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let symbols = cmp.sorted(nfa.alphabet().iter().cloned());

    // Initial DFA state is the epsilon closure of the NFA start state
    let capacity = nfa.graph().capacity();
    let initial_set = nfa.epsilon_closure(&StateSet::singleton(start, capacity));
    let initial_dfa_state = dfa.add_state();
    dfa.set_initial(initial_dfa_state);
    if initial_set.intersects(nfa.finals()) {
        dfa.add_final(initial_dfa_state);
    }
    state_mapping.insert(initial_set.to_vec(), initial_dfa_state);

    let mut worklist: VecDeque<(StateSet, StateId)> = VecDeque::new();
    worklist.push_back((initial_set, initial_dfa_state));

    while let Some((current_nfa_set, current_dfa_state)) = worklist.pop_front() {
        for symbol in &symbols {
            let next_nfa_set = nfa.epsilon_closure(&nfa.step(&current_nfa_set, symbol, cmp));
            if next_nfa_set.is_empty() {
                continue;
            }

            let next_vec = next_nfa_set.to_vec();
            let next_dfa_state = if let Some(&existing) = state_mapping.get(&next_vec) {
                existing
            } else {
                let new_state = dfa.add_state();
                state_mapping.insert(next_vec, new_state);
                if next_nfa_set.intersects(nfa.finals()) {
                    dfa.add_final(new_state);
                }
                worklist.push_back((next_nfa_set, new_state));
                new_state
            };

            dfa.add_symbol_transition(current_dfa_state, symbol.clone(), next_dfa_state);
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states",
        nfa.num_active_states(),
        dfa.num_active_states()
    );

    let origins = state_mapping
        .into_iter()
        .map(|(nfa_states, dfa_state)| (dfa_state, nfa_states))
        .collect();
    (dfa, origins)
}
