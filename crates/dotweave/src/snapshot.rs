//! Frozen enumeration of a graph for one layout pass.

use std::collections::HashSet;

use log::debug;

use dotweave_core::graph::{Graph, SubGraph};

/// A sub-graph together with its members at snapshot time.
pub struct SubGraphEntry<'g, G: Graph> {
    pub sub_graph: &'g G::SubGraph,
    pub members: Vec<&'g G::Vertex>,
}

impl<'g, G: Graph> SubGraphEntry<'g, G> {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn member_set(&self) -> HashSet<&'g G::Vertex> {
        self.members.iter().copied().collect()
    }
}

/// Vertices, edges and sub-graphs of a graph, enumerated once.
///
/// Every later stage of a pass reads the snapshot instead of the graph, so
/// change notifications fired mid-pass cannot alter what is laid out.
pub struct Snapshot<'g, G: Graph> {
    pub vertices: Vec<&'g G::Vertex>,
    pub edges: Vec<&'g G::Edge>,
    pub sub_graphs: Vec<SubGraphEntry<'g, G>>,
}

impl<'g, G: Graph> Snapshot<'g, G> {
    /// Enumerates `graph`, including sub-graph members in the vertex list.
    pub fn take(graph: &'g G) -> Self {
        let vertices = graph.all_vertices();
        let edges: Vec<_> = graph.edges().collect();
        let sub_graphs: Vec<_> = graph
            .sub_graphs()
            .map(|sub_graph| {
                let mut seen = HashSet::new();
                SubGraphEntry {
                    sub_graph,
                    members: sub_graph
                        .vertices()
                        .filter(|vertex| seen.insert(*vertex))
                        .collect(),
                }
            })
            .collect();

        debug!(
            vertices = vertices.len(),
            edges = edges.len(),
            sub_graphs = sub_graphs.len();
            "Graph snapshot taken"
        );

        Self {
            vertices,
            edges,
            sub_graphs,
        }
    }
}

#[cfg(test)]
mod tests {
    use dotweave_core::simple::{SimpleEdge, SimpleGraph, SimpleSubGraph};

    use super::*;

    #[test]
    fn test_snapshot_includes_sub_graph_vertices() {
        let mut graph = SimpleGraph::new();
        graph.add_vertex("a");
        graph.add_edge(SimpleEdge::new("a", "b"));
        graph.add_sub_graph(SimpleSubGraph::new("g").with_vertex("b").with_vertex("b"));
        graph.add_sub_graph(SimpleSubGraph::new("empty"));

        let snapshot = Snapshot::take(&graph);
        assert_eq!(snapshot.vertices, [&"a", &"b"]);
        assert_eq!(snapshot.edges.len(), 1);
        assert_eq!(snapshot.sub_graphs[0].members, [&"b"]);
        assert!(snapshot.sub_graphs[1].is_empty());
    }
}
