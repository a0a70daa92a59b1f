//! Directed multigraph with reusable state slots and per-state incoming lists.
//!
//! This is the storage substrate of [`Automaton`](crate::formlang::Automaton): states
//! are plain integers, edges live in a slab and carry an arbitrary label. Both the
//! outgoing and the incoming edge lists of every state are kept current by each edge
//! mutation, so in-degree queries cost the degree, not the graph size. Deleting a
//! state can be eager (all touching edges removed at once) or lazy (edges are left
//! dangling until [`Graph::cleanup`]); lazily deleted slots are only handed out again
//! after a cleanup, so a reused slot never inherits stale edges.

use crate::formlang::state::StateId;

/// Index of an edge in the graph's slab.
pub type EdgeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<L> {
    pub source: StateId,
    pub target: StateId,
    pub label: L,
}

#[derive(Debug, Clone)]
pub struct Graph<L> {
    alive: Vec<bool>,
    num_live: usize,
    /// Slots ready for reuse.
    free_states: Vec<StateId>,
    /// Lazily deleted slots, recycled by the next cleanup.
    pending_states: Vec<StateId>,
    outgoing: Vec<Vec<EdgeId>>,
    /// Reversed view: edges entering each state.
    incoming: Vec<Vec<EdgeId>>,
    edges: Vec<Option<Edge<L>>>,
    free_edges: Vec<EdgeId>,
    num_edges: usize,
}

impl<L> Graph<L> {
    pub fn new() -> Self {
        Self {
            alive: Vec::new(),
            num_live: 0,
            free_states: Vec::new(),
            pending_states: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            edges: Vec::new(),
            free_edges: Vec::new(),
            num_edges: 0,
        }
    }

    /// Allocate a state, reusing a deleted slot when one is available.
    pub fn add_state(&mut self) -> StateId {
        self.num_live += 1;
        if let Some(state) = self.free_states.pop() {
            let idx = state as usize;
            self.alive[idx] = true;
            self.outgoing[idx].clear();
            self.incoming[idx].clear();
            return state;
        }
        self.alive.push(true);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        (self.alive.len() - 1) as StateId
    }

    #[inline]
    pub fn is_live(&self, state: StateId) -> bool {
        self.alive.get(state as usize).copied().unwrap_or(false)
    }

    pub fn num_live_states(&self) -> usize {
        self.num_live
    }

    /// One past the largest state id ever allocated.
    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    /// Live states in ascending order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| idx as StateId)
    }

    /// Mark a state deleted without touching its edges.
    pub fn delete_state_lazy(&mut self, state: StateId) {
        if !self.is_live(state) {
            return;
        }
        self.alive[state as usize] = false;
        self.num_live -= 1;
        self.pending_states.push(state);
    }

    /// Delete a state together with every edge touching it.
    pub fn delete_state(&mut self, state: StateId) {
        if !self.is_live(state) {
            return;
        }
        let idx = state as usize;
        let mut touching = std::mem::take(&mut self.outgoing[idx]);
        touching.append(&mut self.incoming[idx]);
        for id in touching {
            self.remove_edge(id);
        }
        self.alive[state as usize] = false;
        self.num_live -= 1;
        self.free_states.push(state);
    }

    /// Remove edges left dangling by lazy deletions and recycle their slots.
    pub fn cleanup(&mut self) {
        let dangling: Vec<EdgeId> = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(id, edge)| {
                let edge = edge.as_ref()?;
                (!self.is_live(edge.source) || !self.is_live(edge.target)).then_some(id)
            })
            .collect();
        for id in dangling {
            self.remove_edge(id);
        }
        for state in self.pending_states.drain(..) {
            self.outgoing[state as usize].clear();
            self.incoming[state as usize].clear();
            self.free_states.push(state);
        }
    }

    pub fn add_edge(&mut self, source: StateId, target: StateId, label: L) -> EdgeId {
        debug_assert!(self.is_live(source), "edge source {source} is not live");
        debug_assert!(self.is_live(target), "edge target {target} is not live");
        let edge = Some(Edge {
            source,
            target,
            label,
        });
        let id = match self.free_edges.pop() {
            Some(id) => {
                self.edges[id] = edge;
                id
            }
            None => {
                self.edges.push(edge);
                self.edges.len() - 1
            }
        };
        self.outgoing[source as usize].push(id);
        self.incoming[target as usize].push(id);
        self.num_edges += 1;
        id
    }

    /// Remove an edge, returning it if it existed.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge<L>> {
        let edge = self.edges.get_mut(id)?.take()?;
        self.outgoing[edge.source as usize].retain(|&e| e != id);
        self.incoming[edge.target as usize].retain(|&e| e != id);
        self.free_edges.push(id);
        self.num_edges -= 1;
        Some(edge)
    }

    /// Point an edge at a new destination.
    pub fn retarget(&mut self, id: EdgeId, target: StateId) {
        debug_assert!(self.is_live(target), "edge target {target} is not live");
        let Some(Some(edge)) = self.edges.get_mut(id) else {
            return;
        };
        let old = std::mem::replace(&mut edge.target, target);
        self.incoming[old as usize].retain(|&e| e != id);
        self.incoming[target as usize].push(id);
    }

    /// Move an edge so that it leaves `source` instead of its current origin.
    pub fn reanchor(&mut self, id: EdgeId, source: StateId) {
        debug_assert!(self.is_live(source), "edge source {source} is not live");
        let Some(Some(edge)) = self.edges.get_mut(id) else {
            return;
        };
        let old = std::mem::replace(&mut edge.source, source);
        self.outgoing[old as usize].retain(|&e| e != id);
        self.outgoing[source as usize].push(id);
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge<L>> {
        self.edges.get(id).and_then(Option::as_ref)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge<L>> {
        self.edges.get_mut(id).and_then(Option::as_mut)
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Outgoing edges of a live state; empty for unknown or deleted states.
    pub fn out_edges(&self, state: StateId) -> impl Iterator<Item = (EdgeId, &Edge<L>)> + '_ {
        let ids: &[EdgeId] = if self.is_live(state) {
            &self.outgoing[state as usize]
        } else {
            &[]
        };
        ids.iter()
            .filter_map(move |&id| self.edge(id).map(|edge| (id, edge)))
    }

    pub fn out_degree(&self, state: StateId) -> usize {
        if self.is_live(state) {
            self.outgoing[state as usize].len()
        } else {
            0
        }
    }

    /// Incoming edges of a live state from live sources, read through the reversed view.
    pub fn in_edges(&self, state: StateId) -> impl Iterator<Item = (EdgeId, &Edge<L>)> + '_ {
        let ids: &[EdgeId] = if self.is_live(state) {
            &self.incoming[state as usize]
        } else {
            &[]
        };
        ids.iter().filter_map(move |&id| {
            let edge = self.edge(id)?;
            self.is_live(edge.source).then_some((id, edge))
        })
    }

    pub fn in_degree(&self, state: StateId) -> usize {
        self.in_edges(state).count()
    }

    /// First outgoing edge of `state` whose label satisfies `pred`.
    pub fn find_edge(&self, state: StateId, mut pred: impl FnMut(&L) -> bool) -> Option<EdgeId> {
        self.out_edges(state)
            .find(|(_, edge)| pred(&edge.label))
            .map(|(id, _)| id)
    }

    /// Every outgoing edge of `state` whose label satisfies `pred`.
    pub fn find_edges<'a>(
        &'a self,
        state: StateId,
        mut pred: impl FnMut(&L) -> bool + 'a,
    ) -> impl Iterator<Item = EdgeId> + 'a {
        self.out_edges(state)
            .filter(move |(_, edge)| pred(&edge.label))
            .map(|(id, _)| id)
    }

    /// Every edge whose endpoints are both live.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge<L>)> + '_ {
        self.edges.iter().enumerate().filter_map(move |(id, edge)| {
            let edge = edge.as_ref()?;
            (self.is_live(edge.source) && self.is_live(edge.target)).then_some((id, edge))
        })
    }
}

impl<L> Default for Graph<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Graph<char>, [StateId; 3]) {
        let mut graph = Graph::new();
        let a = graph.add_state();
        let b = graph.add_state();
        let c = graph.add_state();
        graph.add_edge(a, b, 'x');
        graph.add_edge(b, c, 'y');
        graph.add_edge(c, a, 'z');
        graph.add_edge(a, c, 'y');
        (graph, [a, b, c])
    }

    #[test]
    fn test_graph_basic() {
        let (graph, [a, b, c]) = triangle();
        assert_eq!(graph.num_live_states(), 3);
        assert_eq!(graph.num_edges(), 4);
        assert_eq!(graph.out_degree(a), 2);
        let sources: Vec<_> = graph.in_edges(c).map(|(_, e)| e.source).collect();
        assert_eq!(sources, vec![b, a]);
        assert_eq!(graph.find_edge(a, |l| *l == 'y').map(|id| graph.edge(id).unwrap().target), Some(c));
        assert_eq!(graph.find_edges(a, |_| true).count(), 2);
        assert!(graph.out_edges(99).next().is_none());
    }

    #[test]
    fn test_eager_delete_removes_edges_and_reuses_slot() {
        let (mut graph, [a, b, c]) = triangle();
        graph.delete_state(b);
        assert!(!graph.is_live(b));
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.in_degree(c), 1);

        let reused = graph.add_state();
        assert_eq!(reused, b);
        assert_eq!(graph.out_degree(reused), 0);
        assert_eq!(graph.in_degree(reused), 0);
        assert_eq!(graph.out_degree(a), 1);
    }

    #[test]
    fn test_lazy_delete_defers_cleanup() {
        let (mut graph, [a, b, c]) = triangle();
        graph.delete_state_lazy(c);
        assert_eq!(graph.num_edges(), 4);
        // dangling edges are hidden from the reversed view and edge listing
        assert_eq!(graph.in_degree(a), 0);
        assert_eq!(graph.edges().count(), 1);

        // slot is not reused before cleanup
        let fresh = graph.add_state();
        assert_ne!(fresh, c);

        graph.cleanup();
        assert_eq!(graph.num_edges(), 1);
        assert_eq!(graph.out_degree(a), 1);
        assert_eq!(graph.out_degree(b), 0);
        assert_eq!(graph.add_state(), c);
    }

    #[test]
    fn test_retarget_and_reanchor() {
        let (mut graph, [a, b, c]) = triangle();
        let ab = graph.find_edge(a, |l| *l == 'x').unwrap();
        graph.retarget(ab, a);
        assert_eq!(graph.in_degree(b), 0);
        assert_eq!(graph.in_degree(a), 2);

        graph.reanchor(ab, c);
        assert_eq!(graph.out_degree(a), 1);
        assert_eq!(graph.out_degree(c), 2);
        assert_eq!(graph.edge(ab).unwrap().source, c);
    }

    #[test]
    fn test_incoming_lists_follow_mutations() {
        let (mut graph, [a, b, c]) = triangle();
        let loop_edge = graph.add_edge(b, b, 'w');
        assert_eq!(graph.in_degree(b), 2);

        graph.remove_edge(loop_edge);
        assert_eq!(graph.in_degree(b), 1);

        graph.add_edge(b, b, 'w');
        graph.delete_state(b);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.in_degree(c), 1);

        let reused = graph.add_state();
        assert_eq!(reused, b);
        assert_eq!(graph.in_degree(reused), 0);
        let ca = graph.find_edge(c, |l| *l == 'z').unwrap();
        graph.retarget(ca, reused);
        assert_eq!(graph.in_degree(a), 0);
        assert_eq!(graph.in_edges(reused).map(|(id, _)| id).collect::<Vec<_>>(), vec![ca]);
    }
}
