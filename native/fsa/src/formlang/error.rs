//! Error type shared by the automaton layer.

use crate::formlang::state::StateId;
use thiserror::Error;

pub type Result<T, E = AutomatonError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("alternative requires at least one branch")]
    EmptyAlternatives,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("expected exactly one final state, found {0}")]
    InvalidFinalCount(usize),

    #[error("automaton has no initial state")]
    Uninitialized,

    #[error("state {0} is the initial state and cannot be removed")]
    RemoveInitialState(StateId),

    #[error("state {0} is the last final state and cannot be removed")]
    RemoveLastFinalState(StateId),

    #[error("state {0} is not a live state")]
    DeadState(StateId),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
