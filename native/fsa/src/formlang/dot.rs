//! Graphviz export and a plain node/edge view of an automaton.

use crate::formlang::automaton::Automaton;
use crate::formlang::state::StateId;
use crate::formlang::symbol::Symbol;
use std::fmt::Display;

/// `(source, target, label)` with the label rendered as bytes.
pub type GraphEdge = (StateId, StateId, Vec<u8>);

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<T: Symbol + Display> Automaton<T> {
    /// Render the automaton in DOT. Final states are drawn as double circles and an
    /// invisible entry node points at the initial state.
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        dot.push_str("digraph automaton {\n");
        dot.push_str("    rankdir=LR;\n");
        if let Some(initial) = self.initial() {
            dot.push_str("    entry [shape=point, style=invis];\n");
            dot.push_str(&format!("    entry -> {initial};\n"));
        }
        for state in self.states() {
            let shape = if self.is_final(state) {
                "doublecircle"
            } else {
                "circle"
            };
            dot.push_str(&format!("    {state} [shape={shape}];\n"));
        }
        for (source, label, target) in self.transitions() {
            let label = escape(&label.to_string());
            dot.push_str(&format!("    {source} -> {target} [label=\"{label}\"];\n"));
        }
        dot.push_str("}\n");
        dot
    }

    /// Convert to a graph representation (edges with labels).
    /// Returns: (nodes, edges) where edges are (src, dst, label)
    pub fn to_graph(&self) -> (Vec<StateId>, Vec<GraphEdge>) {
        let nodes: Vec<StateId> = self.states().collect();
        let edges = self
            .transitions()
            .map(|(src, label, dst)| (src, dst, label.to_string().into_bytes()))
            .collect();
        (nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_then_y() -> Automaton<char> {
        let mut a = Automaton::new();
        let x = a.symbol('x');
        let y = a.symbol('"');
        let opt = a.optional(y);
        let both = a.concatenate(x, opt);
        a.set_fragment(both);
        a
    }

    #[test]
    fn test_to_dot() {
        let a = x_then_y();
        let dot = a.to_dot();
        assert!(dot.starts_with("digraph automaton {"));
        assert!(dot.contains("entry -> 0;"));
        assert!(dot.contains("0 -> 1 [label=\"x\"];"));
        assert!(dot.contains("[label=\"ε\"]"));
        assert!(dot.contains("[label=\"\\\"\"]"));
        assert_eq!(dot.matches("doublecircle").count(), 1);
    }

    #[test]
    fn test_to_dot_empty() {
        let dot = Automaton::<char>::new().to_dot();
        assert_eq!(dot, "digraph automaton {\n    rankdir=LR;\n}\n");
    }

    #[test]
    fn test_to_graph() {
        let a = x_then_y();
        let (nodes, edges) = a.to_graph();
        assert_eq!(nodes.len(), a.num_active_states());
        assert_eq!(edges.len(), a.graph().num_edges());
        assert!(edges.contains(&(0, 1, b"x".to_vec())));
        assert!(edges.iter().any(|(_, _, label)| label == "ε".as_bytes()));
    }
}
