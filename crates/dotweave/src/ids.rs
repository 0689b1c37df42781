//! Stable DOT ids for opaque vertices.

use std::{collections::HashMap, fmt, hash::Hash};

use dotweave_core::graph::Graph;

use crate::error::LayoutError;

/// A one-to-one mapping between vertices and the DOT ids written for them.
///
/// When the graph names every vertex through [`Graph::vertex_name`], the
/// names are used. Otherwise ids are sequential integers in enumeration
/// order. Either way the assignment only depends on the enumeration, so
/// serializing the same graph twice yields the same ids.
pub struct IdAssignment<'g, V> {
    vertices: Vec<&'g V>,
    ids: Vec<String>,
    by_vertex: HashMap<&'g V, usize>,
    by_id: HashMap<String, usize>,
}

impl<'g, V: Eq + Hash + fmt::Debug> IdAssignment<'g, V> {
    /// Assigns ids to `vertices`, which must be free of duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Graph`] when two vertices share a name or a
    /// vertex is listed twice.
    pub fn assign<G>(graph: &G, vertices: &[&'g V]) -> Result<Self, LayoutError>
    where
        G: Graph<Vertex = V>,
    {
        let names: Option<Vec<String>> = vertices
            .iter()
            .map(|vertex| graph.vertex_name(vertex))
            .collect();
        let ids = names.unwrap_or_else(|| (0..vertices.len()).map(|i| i.to_string()).collect());

        let mut by_vertex = HashMap::with_capacity(vertices.len());
        let mut by_id = HashMap::with_capacity(vertices.len());
        for (index, (vertex, id)) in vertices.iter().zip(&ids).enumerate() {
            if by_vertex.insert(*vertex, index).is_some() {
                return Err(LayoutError::Graph(format!(
                    "vertex {vertex:?} is enumerated twice"
                )));
            }
            if by_id.insert(id.clone(), index).is_some() {
                return Err(LayoutError::Graph(format!(
                    "vertex name `{id}` is used by more than one vertex"
                )));
            }
        }

        Ok(Self {
            vertices: vertices.to_vec(),
            ids,
            by_vertex,
            by_id,
        })
    }

    /// The id written for `vertex`.
    pub fn id(&self, vertex: &V) -> Option<&str> {
        self.by_vertex
            .get(vertex)
            .map(|&index| self.ids[index].as_str())
    }

    /// The vertex an id was written for.
    pub fn vertex(&self, id: &str) -> Option<&'g V> {
        self.by_id.get(id).map(|&index| self.vertices[index])
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'g V, &str)> {
        self.vertices
            .iter()
            .copied()
            .zip(self.ids.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use dotweave_core::simple::SimpleGraph;

    use super::*;

    #[test]
    fn test_sequential_ids() {
        let graph: SimpleGraph<char> = SimpleGraph::new();
        let vertices = [&'x', &'y', &'z'];
        let ids = IdAssignment::assign(&graph, &vertices).unwrap();

        assert_eq!(ids.id(&'y'), Some("1"));
        assert_eq!(ids.vertex("2"), Some(&'z'));
        assert_eq!(ids.vertex("3"), None);
        let pairs: Vec<_> = ids.iter().collect();
        assert_eq!(pairs, [(&'x', "0"), (&'y', "1"), (&'z', "2")]);
    }

    #[test]
    fn test_names_used_when_complete() {
        let mut graph = SimpleGraph::new();
        graph.set_name(1, "one");
        graph.set_name(2, "two");
        let ids = IdAssignment::assign(&graph, &[&1, &2]).unwrap();
        assert_eq!(ids.id(&2), Some("two"));

        let ids = IdAssignment::assign(&graph, &[&1, &2, &3]).unwrap();
        assert_eq!(ids.id(&1), Some("0"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut graph = SimpleGraph::new();
        graph.set_name(1, "same");
        graph.set_name(2, "same");
        let err = IdAssignment::assign(&graph, &[&1, &2]).err().unwrap();
        assert!(matches!(err, LayoutError::Graph(ref message) if message.contains("same")));
    }

    #[test]
    fn test_duplicate_vertices_rejected() {
        let graph: SimpleGraph<u8> = SimpleGraph::new();
        assert!(IdAssignment::assign(&graph, &[&1, &1]).is_err());
    }
}
