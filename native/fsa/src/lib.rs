pub mod formlang;

pub use formlang::{
    Automaton, AutomatonError, Fragment, Label, MinimizeAlgorithm, NaturalOrder, StateId,
    SymbolOrder, determinize, includes, is_equivalent, minimize,
};
