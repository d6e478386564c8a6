//! Inheritance graph.
//!
//! Uses `petgraph::DiGraph` with one node per class and an edge from each
//! class to its parent. A well-formed single-inheritance hierarchy is a
//! forest, so any cycle is a [`CompilationError::CircularInheritance`].

use oplang_core::CompilationError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::ClassTable;

pub struct InheritanceGraph {
    graph: DiGraph<String, ()>,
}

impl InheritanceGraph {
    /// Build the graph from every class in the table. Parents that are not
    /// registered contribute no edge.
    pub fn from_table(table: &ClassTable) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: FxHashMap<String, NodeIndex> = FxHashMap::default();

        for record in table.classes() {
            let idx = graph.add_node(record.name.clone());
            nodes.insert(record.name.clone(), idx);
        }

        for record in table.classes() {
            if let Some(parent) = record.parent.as_deref()
                && let (Some(&child), Some(&parent)) = (nodes.get(&record.name), nodes.get(parent))
            {
                graph.add_edge(child, parent, ());
            }
        }

        Self { graph }
    }

    /// Reject cyclic inheritance, naming one class on the cycle.
    pub fn check_acyclic(&self, table: &ClassTable) -> Result<(), CompilationError> {
        toposort(&self.graph, None).map(|_| ()).map_err(|cycle| {
            let name = self.graph[cycle.node_id()].clone();
            let span = table.get(&name).map(|r| r.span).unwrap_or_default();
            CompilationError::CircularInheritance { name, span }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassRecord;
    use oplang_core::Span;

    fn table(classes: &[(&str, Option<&str>)]) -> ClassTable {
        let mut table = ClassTable::new();
        for (name, parent) in classes {
            table
                .register(ClassRecord::new(
                    *name,
                    parent.map(str::to_string),
                    Span::default(),
                ))
                .unwrap();
        }
        table
    }

    #[test]
    fn forest_is_acyclic() {
        let t = table(&[("A", None), ("B", Some("A")), ("C", Some("B")), ("D", None)]);
        let graph = InheritanceGraph::from_table(&t);
        assert!(graph.check_acyclic(&t).is_ok());
    }

    #[test]
    fn cycle_is_reported() {
        let t = table(&[("A", Some("C")), ("B", Some("A")), ("C", Some("B"))]);
        let graph = InheritanceGraph::from_table(&t);
        let err = graph.check_acyclic(&t).unwrap_err();
        assert!(matches!(err, CompilationError::CircularInheritance { .. }));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let t = table(&[("A", Some("A"))]);
        let graph = InheritanceGraph::from_table(&t);
        assert!(graph.check_acyclic(&t).is_err());
    }
}
