//! The automaton model: a labeled graph with one initial state and a set of final states.

use crate::formlang::error::{AutomatonError, Result};
use crate::formlang::graph::{EdgeId, Graph};
use crate::formlang::state::{StateId, StateMap, StateSet};
use crate::formlang::symbol::{Label, Symbol, SymbolOrder};
use indexmap::IndexSet;
use log::debug;

/// A finite automaton over symbols of type `T`, possibly with epsilon transitions.
///
/// The same type backs NFAs under construction, determinized automata and minimized
/// ones; determinism is a property of the transitions, see
/// [`Automaton::is_deterministic`].
#[derive(Debug, Clone)]
pub struct Automaton<T> {
    /// States and labeled transitions
    graph: Graph<Label<T>>,
    /// Initial state (None if the automaton is empty)
    initial: Option<StateId>,
    /// Final (accepting) states
    finals: StateSet,
    /// Symbols seen on non-epsilon transitions, in first-use order
    alphabet: IndexSet<T>,
}

impl<T: Symbol> Automaton<T> {
    /// Create a new empty automaton.
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            initial: None,
            finals: StateSet::with_capacity(16),
            alphabet: IndexSet::new(),
        }
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        self.graph.add_state()
    }

    pub fn is_live(&self, state: StateId) -> bool {
        self.graph.is_live(state)
    }

    /// Set the initial state.
    pub fn set_initial(&mut self, state: StateId) {
        debug_assert!(self.is_live(state), "initial state {state} is not live");
        self.initial = Some(state);
    }

    pub fn initial(&self) -> Option<StateId> {
        self.initial
    }

    /// Mark a state as final.
    pub fn add_final(&mut self, state: StateId) {
        debug_assert!(self.is_live(state), "final state {state} is not live");
        self.finals.insert(state);
    }

    /// Clear the final mark of a state. Returns whether it was final.
    pub fn unset_final(&mut self, state: StateId) -> bool {
        self.finals.remove(state)
    }

    pub(crate) fn clear_finals(&mut self) {
        self.finals.clear();
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(state)
    }

    pub fn finals(&self) -> &StateSet {
        &self.finals
    }

    pub fn num_final_states(&self) -> usize {
        self.finals.len()
    }

    /// Number of live states.
    pub fn num_active_states(&self) -> usize {
        self.graph.num_live_states()
    }

    /// Symbols used on non-epsilon transitions (plus any added explicitly).
    pub fn alphabet(&self) -> &IndexSet<T> {
        &self.alphabet
    }

    /// Widen the alphabet without adding transitions, e.g. before totalization.
    pub fn extend_alphabet(&mut self, symbols: impl IntoIterator<Item = T>) {
        self.alphabet.extend(symbols);
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph<Label<T>> {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut Graph<Label<T>> {
        &mut self.graph
    }

    /// Add a transition and record its symbol in the alphabet.
    pub fn add_transition(&mut self, source: StateId, label: Label<T>, target: StateId) -> EdgeId {
        if let Label::Symbol(symbol) = &label {
            if !self.alphabet.contains(symbol) {
                self.alphabet.insert(symbol.clone());
            }
        }
        self.graph.add_edge(source, target, label)
    }

    pub fn add_symbol_transition(&mut self, source: StateId, symbol: T, target: StateId) -> EdgeId {
        self.add_transition(source, Label::Symbol(symbol), target)
    }

    pub fn add_epsilon_transition(&mut self, source: StateId, target: StateId) -> EdgeId {
        self.add_transition(source, Label::Epsilon, target)
    }

    /// Live states in ascending order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.graph.states()
    }

    /// All transitions between live states as `(source, label, target)`.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, &Label<T>, StateId)> + '_ {
        self.graph
            .edges()
            .map(|(_, edge)| (edge.source, &edge.label, edge.target))
    }

    /// Target of the first transition from `state` on `symbol`.
    pub fn next_state<C: SymbolOrder<T>>(&self, state: StateId, symbol: &T, cmp: &C) -> Option<StateId> {
        self.graph
            .find_edge(state, |label| cmp.matches(label, symbol))
            .and_then(|id| self.graph.edge(id))
            .map(|edge| edge.target)
    }

    /// Whether the automaton has no epsilon transitions and at most one transition
    /// per (state, symbol).
    pub fn is_deterministic<C: SymbolOrder<T>>(&self, cmp: &C) -> bool {
        self.states().all(|state| {
            let mut symbols = Vec::with_capacity(self.graph.out_degree(state));
            for (_, edge) in self.graph.out_edges(state) {
                match &edge.label {
                    Label::Epsilon => return false,
                    Label::Symbol(symbol) => symbols.push(symbol),
                }
            }
            symbols.sort_by(|a, b| cmp.compare(a, b));
            symbols.windows(2).all(|w| !cmp.same(w[0], w[1]))
        })
    }

    /// Remove a state and its transitions.
    ///
    /// Fails if the state is the initial state or the only final state.
    pub fn remove_state(&mut self, state: StateId) -> Result<()> {
        self.check_removable(state)?;
        self.finals.remove(state);
        self.graph.delete_state(state);
        Ok(())
    }

    /// Like [`Automaton::remove_state`], but leaves the transitions dangling until
    /// [`Automaton::purge`] runs.
    pub fn remove_state_deferred(&mut self, state: StateId) -> Result<()> {
        self.check_removable(state)?;
        self.finals.remove(state);
        self.graph.delete_state_lazy(state);
        Ok(())
    }

    /// Drop transitions left dangling by deferred removals.
    pub fn purge(&mut self) {
        self.graph.cleanup();
    }

    fn check_removable(&self, state: StateId) -> Result<()> {
        if !self.is_live(state) {
            return Err(AutomatonError::DeadState(state));
        }
        if self.initial == Some(state) {
            return Err(AutomatonError::RemoveInitialState(state));
        }
        if self.finals.contains(state) && self.finals.len() == 1 {
            return Err(AutomatonError::RemoveLastFinalState(state));
        }
        Ok(())
    }

    /// Compute the epsilon closure of a set of states using an explicit stack.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.graph.capacity());
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }
            for (_, edge) in self.graph.out_edges(s) {
                if edge.label.is_epsilon() && !closure.contains(edge.target) {
                    stack.push(edge.target);
                }
            }
        }

        closure
    }

    /// States reached from `states` by one transition on `symbol`, without closure.
    pub fn step<C: SymbolOrder<T>>(&self, states: &StateSet, symbol: &T, cmp: &C) -> StateSet {
        let mut reached = StateSet::with_capacity(self.graph.capacity());
        for state in states.iter() {
            for (_, edge) in self.graph.out_edges(state) {
                if cmp.matches(&edge.label, symbol) {
                    reached.insert(edge.target);
                }
            }
        }
        reached
    }

    /// Check whether the automaton accepts `word`.
    pub fn accepts<'w, C, I>(&self, word: I, cmp: &C) -> bool
    where
        C: SymbolOrder<T>,
        I: IntoIterator<Item = &'w T>,
        T: 'w,
    {
        let Some(initial) = self.initial else {
            return false;
        };
        let mut current =
            self.epsilon_closure(&StateSet::singleton(initial, self.graph.capacity()));
        for symbol in word {
            current = self.epsilon_closure(&self.step(&current, symbol, cmp));
            if current.is_empty() {
                return false;
            }
        }
        current.intersects(&self.finals)
    }

    /// Check if the automaton accepts no word at all.
    pub fn is_empty(&self) -> bool {
        let reachable = self.reachable_states();
        !reachable.intersects(&self.finals)
    }

    /// States reachable from the initial state along any transition.
    pub fn reachable_states(&self) -> StateSet {
        let mut seen = StateSet::with_capacity(self.graph.capacity());
        let Some(initial) = self.initial else {
            return seen;
        };
        let mut stack = vec![initial];
        while let Some(state) = stack.pop() {
            if !seen.insert(state) {
                continue;
            }
            for (_, edge) in self.graph.out_edges(state) {
                if !seen.contains(edge.target) {
                    stack.push(edge.target);
                }
            }
        }
        seen
    }

    /// States from which some final state is reachable, found over the reversed view.
    pub fn coreachable_states(&self) -> StateSet {
        let mut seen = StateSet::with_capacity(self.graph.capacity());
        let mut stack: Vec<StateId> = self.finals.iter().filter(|&s| self.is_live(s)).collect();
        while let Some(state) = stack.pop() {
            if !seen.insert(state) {
                continue;
            }
            for (_, edge) in self.graph.in_edges(state) {
                if !seen.contains(edge.source) {
                    stack.push(edge.source);
                }
            }
        }
        seen
    }

    /// Delete every state not reachable from the initial state.
    pub fn remove_unreachable_states(&mut self) -> usize {
        if self.initial.is_none() {
            return 0;
        }
        let reachable = self.reachable_states();
        let doomed: Vec<StateId> = self.states().filter(|&s| !reachable.contains(s)).collect();
        for &state in &doomed {
            self.finals.remove(state);
            self.graph.delete_state_lazy(state);
        }
        if !doomed.is_empty() {
            self.graph.cleanup();
        }
        doomed.len()
    }

    /// Delete every state that is not both reachable from the initial state and able
    /// to reach a final state.
    ///
    /// The initial state always survives. If the language is empty the automaton is
    /// left with only its initial state and no final states.
    pub fn remove_dead_states(&mut self) -> usize {
        let Some(initial) = self.initial else {
            return 0;
        };
        let forward = self.reachable_states();
        let backward = self.coreachable_states();

        let doomed: Vec<StateId> = if backward.contains(initial) {
            self.states()
                .filter(|&s| !(forward.contains(s) && backward.contains(s)))
                .collect()
        } else {
            self.finals.clear();
            self.states().filter(|&s| s != initial).collect()
        };
        for &state in &doomed {
            self.finals.remove(state);
            self.graph.delete_state_lazy(state);
        }
        self.graph.cleanup();
        debug!(
            "removed {} dead states, {} remain",
            doomed.len(),
            self.num_active_states()
        );
        doomed.len()
    }

    /// Deep copy of everything reachable from the initial state into a fresh,
    /// compactly numbered automaton. Final marks and the alphabet are preserved.
    pub fn copy(&self) -> Self {
        let mut copy = Self::new();
        copy.alphabet = self.alphabet.clone();
        if let Some(initial) = self.initial {
            let map = self.copy_graph_into(&mut copy, initial, true);
            if let Some(&new_initial) = map.get(initial) {
                copy.set_initial(new_initial);
            }
        }
        copy
    }

    /// Copy the part of this automaton reachable from `root` into `dest`, returning the
    /// old-to-new state map. Final marks are carried over when `keep_finals` is set.
    pub(crate) fn copy_graph_into(
        &self,
        dest: &mut Automaton<T>,
        root: StateId,
        keep_finals: bool,
    ) -> StateMap<StateId> {
        let mut map: StateMap<StateId> = StateMap::with_capacity(self.graph.capacity());
        if !self.is_live(root) {
            return map;
        }
        map.insert(root, dest.add_state());
        let mut stack = vec![root];
        let mut edges = Vec::new();

        while let Some(state) = stack.pop() {
            for (_, edge) in self.graph.out_edges(state) {
                if !map.contains(edge.target) {
                    map.insert(edge.target, dest.add_state());
                    stack.push(edge.target);
                }
                edges.push((edge.source, edge.label.clone(), edge.target));
            }
        }

        for (source, label, target) in edges {
            if let (Some(&s), Some(&t)) = (map.get(source), map.get(target)) {
                dest.add_transition(s, label, t);
            }
        }
        if keep_finals {
            for (old, &new) in map.iter() {
                if self.is_final(old) {
                    dest.add_final(new);
                }
            }
        }
        map
    }
}

impl<T: Symbol> Default for Automaton<T> {
    fn default() -> Self {
        Self::new()
    }
}
