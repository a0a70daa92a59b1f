//! In-place DFA minimization.
//!
//! Two independent algorithms share the same contract and the same final collapse
//! step: [`minimize_hopcroft`] (partition refinement, O(n·k·log n)) and
//! [`minimize_table_fill`] (pairwise marking, O(n²·k)). Both treat a missing
//! transition as a move into an implicit fail state, so partial DFAs stay partial.
//! States unreachable from the initial state are dropped first.

mod hopcroft;
mod partition;
mod table_fill;

pub use hopcroft::minimize_hopcroft;
pub use table_fill::minimize_table_fill;

use crate::formlang::automaton::Automaton;
use crate::formlang::error::Result;
use crate::formlang::state::{StateId, StateMap};
use crate::formlang::symbol::{Label, Symbol, SymbolOrder};
use log::debug;

/// Which minimizer [`minimize`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinimizeAlgorithm {
    #[default]
    Hopcroft,
    TableFill,
}

/// Minimize `dfa` in place with the chosen algorithm.
pub fn minimize<T: Symbol, C: SymbolOrder<T>>(
    dfa: &mut Automaton<T>,
    algorithm: MinimizeAlgorithm,
    cmp: &C,
) -> Result<()> {
    match algorithm {
        MinimizeAlgorithm::Hopcroft => minimize_hopcroft(dfa, cmp),
        MinimizeAlgorithm::TableFill => minimize_table_fill(dfa, cmp),
    }
}

/// Dense snapshot of a DFA: states renumbered `0..n`, symbols `0..k`.
struct DenseDfa {
    /// Dense index -> state id, ascending
    states: Vec<StateId>,
    /// State id -> dense index
    index: StateMap<usize>,
    num_symbols: usize,
    /// Row-major `n × k` transition table; `None` is the implicit fail state
    delta: Vec<Option<usize>>,
    finals: Vec<bool>,
}

impl DenseDfa {
    /// Drop unreachable states and snapshot what remains. `None` for an empty automaton.
    fn build<T: Symbol, C: SymbolOrder<T>>(dfa: &mut Automaton<T>, cmp: &C) -> Option<Self> {
        dfa.initial()?;
        debug_assert!(dfa.is_deterministic(cmp), "minimization requires a DFA");
        dfa.remove_unreachable_states();

        let symbols = cmp.sorted(dfa.alphabet().iter().cloned());
        let num_symbols = symbols.len();
        let states: Vec<StateId> = dfa.states().collect();
        let mut index = StateMap::with_capacity(dfa.graph().capacity());
        for (i, &state) in states.iter().enumerate() {
            index.insert(state, i);
        }

        let mut delta = vec![None; states.len() * num_symbols];
        for (i, &state) in states.iter().enumerate() {
            for (_, edge) in dfa.graph().out_edges(state) {
                let Label::Symbol(symbol) = &edge.label else {
                    continue;
                };
                let Ok(a) = symbols.binary_search_by(|s| cmp.compare(s, symbol)) else {
                    continue;
                };
                delta[i * num_symbols + a] = index.get(edge.target).copied();
            }
        }
        let finals = states.iter().map(|&s| dfa.is_final(s)).collect();

        Some(Self {
            states,
            index,
            num_symbols,
            delta,
            finals,
        })
    }

    fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    fn target(&self, state: usize, symbol: usize) -> Option<usize> {
        self.delta[state * self.num_symbols + symbol]
    }
}

/// Merge every state into its representative: redirect transitions, move the initial
/// state, delete the non-representatives. `representative[i]` is a dense index.
fn collapse<T: Symbol>(
    dfa: &mut Automaton<T>,
    dense: &DenseDfa,
    representative: &[usize],
) -> Result<()> {
    let rep_of = |state: StateId| {
        dense
            .index
            .get(state)
            .map(|&i| dense.states[representative[i]])
    };

    let redirects: Vec<_> = dfa
        .graph()
        .edges()
        .filter_map(|(id, edge)| {
            let rep = rep_of(edge.target)?;
            (rep != edge.target).then_some((id, rep))
        })
        .collect();
    for (id, rep) in redirects {
        dfa.graph_mut().retarget(id, rep);
    }

    if let Some(rep) = dfa.initial().and_then(rep_of) {
        dfa.set_initial(rep);
    }

    let mut removed = 0;
    for (i, &rep) in representative.iter().enumerate() {
        if rep != i {
            dfa.remove_state_deferred(dense.states[i])?;
            removed += 1;
        }
    }
    dfa.purge();
    debug!(
        "collapsed {removed} equivalent states, {} remain",
        dfa.num_active_states()
    );
    Ok(())
}
