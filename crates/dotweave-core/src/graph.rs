//! Graph model traits.
//!
//! Applications expose their data to the layout pipeline by implementing
//! [`Graph`], [`Edge`] and optionally [`SubGraph`]. Vertices are opaque
//! values: the pipeline only compares and hashes them, and asks the graph for
//! an optional textual name.
//!
//! # Overview
//!
//! - [`Graph`] - Read-only view over vertices, edges and sub-graphs
//! - [`Edge`] - A connection between two vertices with optional arrows and labels
//! - [`SubGraph`] - A labelled group of vertices, laid out as a cluster
//! - [`ArrowShape`] - Arrow decorations understood by the engine
//!
//! A ready-made in-memory implementation lives in [`crate::simple`].

use std::{collections::HashSet, fmt, hash::Hash, str::FromStr};

use serde::Deserialize;

use crate::{attributes::Attributes, notify::ChangeNotifier};

/// Read-only view of a graph to be laid out.
///
/// Only [`vertices`](Graph::vertices) and [`edges`](Graph::edges) are
/// required. The remaining methods have neutral defaults.
pub trait Graph {
    /// Opaque vertex identity.
    type Vertex: Eq + Hash + fmt::Debug;
    /// Edge type connecting two vertices.
    type Edge: Edge<Vertex = Self::Vertex>;
    /// Sub-graph type grouping vertices.
    type SubGraph: SubGraph<Vertex = Self::Vertex>;

    /// Vertices owned directly by the graph, in a stable order.
    fn vertices(&self) -> impl Iterator<Item = &Self::Vertex>;

    /// Edges of the graph, in a stable order.
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Sub-graphs of the graph, in declaration order.
    fn sub_graphs(&self) -> impl Iterator<Item = &Self::SubGraph> {
        std::iter::empty()
    }

    /// Natural textual identity of a vertex.
    ///
    /// When every vertex returns `Some`, those names are used as DOT node ids.
    /// Otherwise sequential integers are assigned in enumeration order.
    fn vertex_name(&self, _vertex: &Self::Vertex) -> Option<String> {
        None
    }

    /// Record field names for a vertex.
    ///
    /// A non-empty list turns the vertex into a `record` shape whose fields
    /// can be targeted by [`Edge::source_port`] and [`Edge::destination_port`].
    fn vertex_ports(&self, _vertex: &Self::Vertex) -> Vec<String> {
        Vec::new()
    }

    /// Graph-level DOT attributes such as `rankdir` or `nodesep`.
    fn attributes(&self) -> Attributes {
        Attributes::default()
    }

    /// Change notification source, if the graph publishes one.
    fn notifier(&self) -> Option<&ChangeNotifier> {
        None
    }

    /// Every vertex reachable for a layout pass.
    ///
    /// The graph's own vertices come first, followed by the vertices of each
    /// sub-graph. Duplicates are dropped, keeping the first occurrence.
    fn all_vertices(&self) -> Vec<&Self::Vertex> {
        let mut seen = HashSet::new();
        self.vertices()
            .chain(self.sub_graphs().flat_map(|sub_graph| sub_graph.vertices()))
            .filter(|vertex| seen.insert(*vertex))
            .collect()
    }
}

/// An edge between two vertices.
pub trait Edge {
    type Vertex;

    fn source(&self) -> &Self::Vertex;

    fn destination(&self) -> &Self::Vertex;

    /// Record field of the source vertex the edge leaves from.
    fn source_port(&self) -> Option<&str> {
        None
    }

    /// Record field of the destination vertex the edge enters.
    fn destination_port(&self) -> Option<&str> {
        None
    }

    /// Arrow drawn at the source end.
    fn source_arrow(&self) -> Option<ArrowShape> {
        None
    }

    /// Arrow drawn at the destination end.
    fn destination_arrow(&self) -> Option<ArrowShape> {
        None
    }

    fn label(&self) -> Option<&str> {
        None
    }

    /// Label placed next to the source arrow (`taillabel`).
    fn source_label(&self) -> Option<&str> {
        None
    }

    /// Label placed next to the destination arrow (`headlabel`).
    fn destination_label(&self) -> Option<&str> {
        None
    }

    /// Extra DOT attributes passed through to the engine.
    fn attributes(&self) -> Attributes {
        Attributes::default()
    }
}

/// A labelled group of vertices, laid out as a DOT cluster.
pub trait SubGraph {
    type Vertex;

    fn vertices(&self) -> impl Iterator<Item = &Self::Vertex>;

    fn label(&self) -> Option<&str> {
        None
    }

    /// Extra DOT attributes passed through to the cluster.
    fn attributes(&self) -> Attributes {
        Attributes::default()
    }

    fn notifier(&self) -> Option<&ChangeNotifier> {
        None
    }
}

/// Uninhabited sub-graph type for graphs without sub-graphs.
///
/// ```
/// # use dotweave_core::graph::{Graph, Edge, NoSubGraph};
/// static IDS: [u32; 2] = [0, 1];
///
/// struct Pair;
/// struct Link;
///
/// impl Edge for Link {
///     type Vertex = u32;
///     fn source(&self) -> &u32 { &0 }
///     fn destination(&self) -> &u32 { &1 }
/// }
///
/// impl Graph for Pair {
///     type Vertex = u32;
///     type Edge = Link;
///     type SubGraph = NoSubGraph<u32>;
///     fn vertices(&self) -> impl Iterator<Item = &u32> { IDS.iter() }
///     fn edges(&self) -> impl Iterator<Item = &Link> { std::iter::once(&Link) }
/// }
///
/// assert_eq!(Pair.all_vertices(), [&0, &1]);
/// ```
#[derive(Debug)]
pub enum NoSubGraph<V> {
    #[doc(hidden)]
    Never(std::convert::Infallible, std::marker::PhantomData<V>),
}

impl<V> SubGraph for NoSubGraph<V> {
    type Vertex = V;

    fn vertices(&self) -> impl Iterator<Item = &V> {
        std::iter::empty()
    }
}

/// Arrow shapes understood by Graphviz for `arrowhead` and `arrowtail`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowShape {
    #[default]
    Normal,
    Inv,
    Dot,
    Odot,
    None,
    Empty,
    Diamond,
    Odiamond,
    Box,
    Tee,
    Vee,
}

impl ArrowShape {
    const ALL: [ArrowShape; 11] = [
        Self::Normal,
        Self::Inv,
        Self::Dot,
        Self::Odot,
        Self::None,
        Self::Empty,
        Self::Diamond,
        Self::Odiamond,
        Self::Box,
        Self::Tee,
        Self::Vee,
    ];

    /// Returns the DOT attribute value for this arrow.
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Inv => "inv",
            Self::Dot => "dot",
            Self::Odot => "odot",
            Self::None => "none",
            Self::Empty => "empty",
            Self::Diamond => "diamond",
            Self::Odiamond => "odiamond",
            Self::Box => "box",
            Self::Tee => "tee",
            Self::Vee => "vee",
        }
    }

    /// Whether the engine draws the shape filled.
    pub fn is_filled(self) -> bool {
        !matches!(self, Self::Odot | Self::Empty | Self::Odiamond | Self::None)
    }
}

impl fmt::Display for ArrowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArrowShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| format!("unknown arrow shape `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vertices(Vec<&'static str>);

    struct Group(Vec<&'static str>);

    struct Link(&'static str, &'static str);

    impl Edge for Link {
        type Vertex = &'static str;

        fn source(&self) -> &&'static str {
            &self.0
        }

        fn destination(&self) -> &&'static str {
            &self.1
        }
    }

    impl SubGraph for Group {
        type Vertex = &'static str;

        fn vertices(&self) -> impl Iterator<Item = &&'static str> {
            self.0.iter()
        }
    }

    struct Grouped {
        vertices: Vertices,
        groups: Vec<Group>,
        links: Vec<Link>,
    }

    impl Graph for Grouped {
        type Vertex = &'static str;
        type Edge = Link;
        type SubGraph = Group;

        fn vertices(&self) -> impl Iterator<Item = &&'static str> {
            self.vertices.0.iter()
        }

        fn edges(&self) -> impl Iterator<Item = &Link> {
            self.links.iter()
        }

        fn sub_graphs(&self) -> impl Iterator<Item = &Group> {
            self.groups.iter()
        }
    }

    #[test]
    fn test_all_vertices_dedup_and_order() {
        let graph = Grouped {
            vertices: Vertices(vec!["a", "b"]),
            groups: vec![Group(vec!["c", "a"]), Group(vec!["d", "c"])],
            links: vec![Link("a", "d")],
        };

        let all: Vec<_> = graph.all_vertices().into_iter().copied().collect();
        assert_eq!(all, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_edge_defaults() {
        let link = Link("a", "b");
        assert_eq!(link.source_port(), None);
        assert_eq!(link.destination_arrow(), None);
        assert!(link.attributes().is_empty());
    }

    #[test]
    fn test_arrow_shape_roundtrip() {
        for shape in ArrowShape::ALL {
            assert_eq!(shape.name().parse::<ArrowShape>().unwrap(), shape);
        }
        assert!("crow".parse::<ArrowShape>().is_err());
    }

    #[test]
    fn test_arrow_shape_filled() {
        assert!(ArrowShape::Normal.is_filled());
        assert!(ArrowShape::Diamond.is_filled());
        assert!(!ArrowShape::Odiamond.is_filled());
        assert!(!ArrowShape::Empty.is_filled());
    }
}
