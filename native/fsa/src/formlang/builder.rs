//! Thompson-style construction of NFAs from fragments.
//!
//! A [`Fragment`] is the `(initial, final)` pair of one sub-expression inside a larger
//! automaton under construction. Operators take fragments by value and hand back a new
//! one, so a fragment that has been combined into something bigger cannot be used
//! again. Fragments built by these operators never have transitions entering their
//! initial state or leaving their final state; [`Automaton::fragment`] is the one
//! exception, and [`Automaton::concatenate`] checks for it.

use crate::formlang::automaton::Automaton;
use crate::formlang::error::{AutomatonError, Result};
use crate::formlang::state::{StateId, StateSet};
use crate::formlang::symbol::{Label, Symbol, SymbolOrder};
use log::warn;
use std::collections::{HashMap, HashSet};

/// Handle on one sub-automaton: its own initial and final state.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a fragment that is dropped leaves its states orphaned in the automaton"]
pub struct Fragment {
    initial: StateId,
    final_state: StateId,
}

impl Fragment {
    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn final_state(&self) -> StateId {
        self.final_state
    }
}

impl<T: Symbol> Automaton<T> {
    fn new_fragment(&mut self) -> Fragment {
        let initial = self.add_state();
        let final_state = self.add_state();
        Fragment {
            initial,
            final_state,
        }
    }

    /// Fragment accepting exactly `symbol`.
    pub fn symbol(&mut self, symbol: T) -> Fragment {
        let frag = self.new_fragment();
        self.add_symbol_transition(frag.initial, symbol, frag.final_state);
        frag
    }

    /// Fragment accepting any single symbol of `symbols`.
    pub fn symbol_set(&mut self, symbols: impl IntoIterator<Item = T>) -> Fragment {
        let frag = self.new_fragment();
        for symbol in symbols {
            self.add_symbol_transition(frag.initial, symbol, frag.final_state);
        }
        frag
    }

    /// Fragment accepting only the empty word.
    pub fn epsilon(&mut self) -> Fragment {
        let frag = self.new_fragment();
        self.add_epsilon_transition(frag.initial, frag.final_state);
        frag
    }

    /// Fragment accepting `lhs` followed by `rhs`.
    ///
    /// The initial state of `rhs` is merged into the final state of `lhs` when that is
    /// sound; otherwise the two are linked by an epsilon transition.
    pub fn concatenate(&mut self, lhs: Fragment, rhs: Fragment) -> Fragment {
        let glue = rhs.initial != lhs.final_state
            && self.graph().in_degree(rhs.initial) == 0
            && self.graph().out_degree(lhs.final_state) == 0
            && self.initial() != Some(rhs.initial)
            && !self.is_final(rhs.initial);

        if glue {
            let moved: Vec<_> = self.graph().out_edges(rhs.initial).map(|(id, _)| id).collect();
            for id in moved {
                self.graph_mut().reanchor(id, lhs.final_state);
            }
            self.graph_mut().delete_state(rhs.initial);
        } else {
            self.add_epsilon_transition(lhs.final_state, rhs.initial);
        }

        Fragment {
            initial: lhs.initial,
            final_state: rhs.final_state,
        }
    }

    /// Concatenate a non-empty sequence of fragments, left to right.
    pub fn concatenate_all(&mut self, fragments: Vec<Fragment>) -> Result<Fragment> {
        let mut fragments = fragments.into_iter();
        let first = fragments
            .next()
            .ok_or(AutomatonError::InvalidArgument("concatenation of zero fragments"))?;
        Ok(fragments.fold(first, |acc, next| self.concatenate(acc, next)))
    }

    /// Fragment accepting `lhs` or `rhs`.
    pub fn alternative(&mut self, lhs: Fragment, rhs: Fragment) -> Fragment {
        let frag = self.new_fragment();
        for branch in [lhs, rhs] {
            self.add_epsilon_transition(frag.initial, branch.initial);
            self.add_epsilon_transition(branch.final_state, frag.final_state);
        }
        frag
    }

    /// Fragment accepting any of `branches`. A single branch is returned unchanged.
    pub fn alternatives(&mut self, branches: Vec<Fragment>) -> Result<Fragment> {
        if branches.len() <= 1 {
            return branches
                .into_iter()
                .next()
                .ok_or(AutomatonError::EmptyAlternatives);
        }
        let frag = self.new_fragment();
        for branch in branches {
            self.add_epsilon_transition(frag.initial, branch.initial);
            self.add_epsilon_transition(branch.final_state, frag.final_state);
        }
        Ok(frag)
    }

    /// Zero or more repetitions of `sub`.
    pub fn kleene(&mut self, sub: Fragment) -> Fragment {
        let frag = self.new_fragment();
        self.add_epsilon_transition(frag.initial, sub.initial);
        self.add_epsilon_transition(sub.final_state, frag.final_state);
        self.add_epsilon_transition(frag.initial, frag.final_state);
        self.add_epsilon_transition(sub.final_state, sub.initial);
        frag
    }

    /// One or more repetitions of `sub`.
    pub fn plus(&mut self, sub: Fragment) -> Fragment {
        let frag = self.new_fragment();
        self.add_epsilon_transition(frag.initial, sub.initial);
        self.add_epsilon_transition(sub.final_state, frag.final_state);
        self.add_epsilon_transition(sub.final_state, sub.initial);
        frag
    }

    /// Zero or one occurrence of `sub`.
    pub fn optional(&mut self, sub: Fragment) -> Fragment {
        let frag = self.new_fragment();
        self.add_epsilon_transition(frag.initial, sub.initial);
        self.add_epsilon_transition(sub.final_state, frag.final_state);
        self.add_epsilon_transition(frag.initial, frag.final_state);
        frag
    }

    /// Between `min` and `max` repetitions of `sub`.
    ///
    /// `min` mandatory copies are followed by `max - min` optional ones. A `min` larger
    /// than `max` is clamped down to `max`.
    pub fn repeat(&mut self, sub: Fragment, min: usize, max: usize) -> Fragment {
        let min = if min > max {
            warn!("repeat bounds {min} > {max}, clamping the lower bound to {max}");
            max
        } else {
            min
        };
        if max == 0 {
            self.discard(sub);
            return self.epsilon();
        }

        let mut pieces = Vec::with_capacity(max);
        for _ in 1..max {
            pieces.push(self.copy_fragment(&sub));
        }
        pieces.push(sub);

        let mut result: Option<Fragment> = None;
        for (k, piece) in pieces.into_iter().enumerate() {
            let piece = if k >= min { self.optional(piece) } else { piece };
            result = Some(match result {
                Some(acc) => self.concatenate(acc, piece),
                None => piece,
            });
        }
        match result {
            Some(frag) => frag,
            None => self.epsilon(),
        }
    }

    /// Duplicate every state and transition reachable from the fragment's initial state.
    /// Final marks are carried over to the copies.
    pub fn copy_fragment(&mut self, frag: &Fragment) -> Fragment {
        let mut seen: HashSet<StateId> = HashSet::new();
        let mut order = Vec::new();
        let mut edges: Vec<(StateId, Label<T>, StateId)> = Vec::new();
        let mut stack = vec![frag.initial];

        while let Some(state) = stack.pop() {
            if !seen.insert(state) {
                continue;
            }
            order.push(state);
            for (_, edge) in self.graph().out_edges(state) {
                edges.push((edge.source, edge.label.clone(), edge.target));
                if !seen.contains(&edge.target) {
                    stack.push(edge.target);
                }
            }
        }

        let initial = self.add_state();
        let final_state = if frag.final_state == frag.initial {
            initial
        } else {
            self.add_state()
        };
        let mut map: HashMap<StateId, StateId> = HashMap::with_capacity(order.len() + 1);
        map.insert(frag.initial, initial);
        map.insert(frag.final_state, final_state);
        for old in order {
            if !map.contains_key(&old) {
                let new = self.add_state();
                map.insert(old, new);
            }
        }

        let copies: Vec<(StateId, StateId)> = map.iter().map(|(&old, &new)| (old, new)).collect();
        for (old, new) in copies {
            if self.is_final(old) {
                self.add_final(new);
            }
        }
        for (source, label, target) in edges {
            if let (Some(&s), Some(&t)) = (map.get(&source), map.get(&target)) {
                self.add_transition(s, label, t);
            }
        }

        Fragment {
            initial,
            final_state,
        }
    }

    /// Delete the states of a fragment that is no longer needed.
    pub fn discard(&mut self, frag: Fragment) {
        let mut doomed = self.reachable_from(frag.initial);
        doomed.insert(frag.final_state);
        for state in doomed.iter() {
            if self.initial() == Some(state) {
                continue;
            }
            self.unset_final(state);
            self.graph_mut().delete_state_lazy(state);
        }
        self.purge();
    }

    fn reachable_from(&self, root: StateId) -> StateSet {
        let mut seen = StateSet::with_capacity(self.graph().capacity());
        let mut stack = vec![root];
        while let Some(state) = stack.pop() {
            if !seen.insert(state) {
                continue;
            }
            stack.extend(self.graph().out_edges(state).map(|(_, edge)| edge.target));
        }
        seen
    }

    /// Embed a copy of `other` and return a fragment for it; `other` is not modified.
    ///
    /// The copy gets a fresh initial state and a single synthetic final state reached
    /// by epsilon transitions from each of `other`'s final states.
    pub fn add_automaton(&mut self, other: &Automaton<T>) -> Result<Fragment> {
        let root = other.initial().ok_or(AutomatonError::Uninitialized)?;
        let map = other.copy_graph_into(self, root, false);
        self.extend_alphabet(other.alphabet().iter().cloned());

        let frag = self.new_fragment();
        if let Some(&copied_root) = map.get(root) {
            self.add_epsilon_transition(frag.initial, copied_root);
        }
        for old in other.finals().iter() {
            if let Some(&copied) = map.get(old) {
                self.add_epsilon_transition(copied, frag.final_state);
            }
        }
        Ok(frag)
    }

    /// The whole automaton as one fragment. Requires exactly one final state.
    pub fn fragment(&self) -> Result<Fragment> {
        let initial = self.initial().ok_or(AutomatonError::Uninitialized)?;
        if self.num_final_states() != 1 {
            return Err(AutomatonError::InvalidFinalCount(self.num_final_states()));
        }
        let final_state = self
            .finals()
            .iter()
            .next()
            .ok_or(AutomatonError::InvalidFinalCount(0))?;
        Ok(Fragment {
            initial,
            final_state,
        })
    }

    /// Make `frag` the whole automaton: its initial state becomes the initial state and
    /// its final state the only final state.
    pub fn set_fragment(&mut self, frag: Fragment) {
        self.set_initial(frag.initial);
        self.clear_finals();
        self.add_final(frag.final_state);
    }

    /// Insert a word, sharing the longest existing prefix (trie insertion).
    pub fn add_word<C: SymbolOrder<T>>(&mut self, word: impl IntoIterator<Item = T>, cmp: &C) {
        let mut state = match self.initial() {
            Some(state) => state,
            None => {
                let state = self.add_state();
                self.set_initial(state);
                state
            }
        };
        for symbol in word {
            state = match self.next_state(state, &symbol, cmp) {
                Some(next) => next,
                None => {
                    let next = self.add_state();
                    self.add_symbol_transition(state, symbol, next);
                    next
                }
            };
        }
        self.add_final(state);
    }
}
