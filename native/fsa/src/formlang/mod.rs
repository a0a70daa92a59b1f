//! Finite automata over arbitrary symbol types.
//!
//! This module provides:
//! - Thompson-style NFA construction from fragments, plus trie insertion of words
//! - Subset construction (NFA to DFA conversion)
//! - DFA minimization, by Hopcroft's algorithm or by table filling
//! - Totalization, complement, inclusion and equivalence
//! - A line-based text format and DOT export

mod automaton;
mod builder;
mod dot;
mod error;
mod graph;
mod minimize;
mod ops;
mod state;
mod subset_construction;
mod symbol;
mod text;

pub use automaton::Automaton;
pub use builder::Fragment;
pub use dot::GraphEdge;
pub use error::{AutomatonError, Result};
pub use graph::{Edge, EdgeId, Graph};
pub use minimize::{MinimizeAlgorithm, minimize, minimize_hopcroft, minimize_table_fill};
pub use ops::{includes, is_equivalent};
pub use state::{StateId, StateMap, StateSet};
pub use subset_construction::{determinize, determinize_with_origins};
pub use symbol::{Label, NaturalOrder, Symbol, SymbolOrder};
pub use text::{read_text, write_text};
