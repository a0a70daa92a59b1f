//! Line-based text format for saving and restoring automata.
//!
//! ```text
//! 0
//! 0 1 a
//! 1 2 EPSILON
//! 2
//! ```
//!
//! The first line holds the initial state. Each three-token line is a transition
//! `source target label`, where the label `EPSILON` stands for an epsilon move. Each
//! remaining single-token line marks a final state. Blank lines are ignored. Symbols
//! are written with `Display` and read back with `FromStr`, so they must not contain
//! whitespace and must not render as `EPSILON`.

use crate::formlang::automaton::Automaton;
use crate::formlang::error::{AutomatonError, Result};
use crate::formlang::state::StateId;
use crate::formlang::symbol::{Label, Symbol};
use log::debug;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

const EPSILON_TOKEN: &str = "EPSILON";

/// Write `automaton` in the text format. An automaton without an initial state
/// produces no output.
pub fn write_text<T, W>(automaton: &Automaton<T>, mut out: W) -> Result<()>
where
    T: Symbol + Display,
    W: Write,
{
    let Some(initial) = automaton.initial() else {
        return Ok(());
    };
    writeln!(out, "{initial}")?;
    for (source, label, target) in automaton.transitions() {
        match label {
            Label::Epsilon => writeln!(out, "{source} {target} {EPSILON_TOKEN}")?,
            Label::Symbol(symbol) => writeln!(out, "{source} {target} {symbol}")?,
        }
    }
    for state in automaton.finals().iter() {
        writeln!(out, "{state}")?;
    }
    out.flush()?;
    Ok(())
}

/// Read an automaton in the text format. State ids in the input are only names:
/// each distinct id is mapped to a freshly allocated state.
pub fn read_text<T, R>(input: R) -> Result<Automaton<T>>
where
    T: Symbol + FromStr,
    T::Err: Display,
    R: BufRead,
{
    let mut automaton = Automaton::new();
    let mut ids: HashMap<StateId, StateId> = HashMap::new();
    let mut seen_initial = false;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        match tokens.as_slice() {
            [id] if !seen_initial => {
                let state = state_for(&mut automaton, &mut ids, id, line_no)?;
                automaton.set_initial(state);
                seen_initial = true;
            }
            [id] => {
                let state = state_for(&mut automaton, &mut ids, id, line_no)?;
                automaton.add_final(state);
            }
            [source, target, label] if seen_initial => {
                let source = state_for(&mut automaton, &mut ids, source, line_no)?;
                let target = state_for(&mut automaton, &mut ids, target, line_no)?;
                let label = if *label == EPSILON_TOKEN {
                    Label::Epsilon
                } else {
                    let symbol = label.parse::<T>().map_err(|e| AutomatonError::Parse {
                        line: line_no,
                        reason: format!("invalid symbol {label:?}: {e}"),
                    })?;
                    Label::Symbol(symbol)
                };
                automaton.add_transition(source, label, target);
            }
            [_, _, _] => {
                return Err(AutomatonError::Parse {
                    line: line_no,
                    reason: "expected the initial state before any transition".to_string(),
                });
            }
            _ => {
                return Err(AutomatonError::Parse {
                    line: line_no,
                    reason: format!("expected 1 or 3 fields, found {}", tokens.len()),
                });
            }
        }
    }

    debug!(
        "read automaton: {} states, {} transitions, {} final",
        automaton.num_active_states(),
        automaton.graph().num_edges(),
        automaton.num_final_states()
    );
    Ok(automaton)
}

fn state_for<T: Symbol>(
    automaton: &mut Automaton<T>,
    ids: &mut HashMap<StateId, StateId>,
    token: &str,
    line: usize,
) -> Result<StateId> {
    let id: StateId = token.parse().map_err(|_| AutomatonError::Parse {
        line,
        reason: format!("invalid state id {token:?}"),
    })?;
    Ok(*ids.entry(id).or_insert_with(|| automaton.add_state()))
}
