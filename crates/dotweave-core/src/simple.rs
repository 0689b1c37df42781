//! In-memory reference implementation of the graph model.
//!
//! [`SimpleGraph`] stores vertices, edges and sub-graphs in vectors and fires
//! its [`ChangeNotifier`] from every mutator.

use std::{collections::HashMap, fmt, hash::Hash};

use crate::{
    attributes::Attributes,
    graph::{ArrowShape, Edge, Graph, SubGraph},
    notify::ChangeNotifier,
};

/// Vector-backed graph over cloneable vertex values.
///
/// # Examples
///
/// ```
/// # use dotweave_core::simple::{SimpleEdge, SimpleGraph, SimpleSubGraph};
/// # use dotweave_core::graph::Graph;
/// let mut graph = SimpleGraph::new();
/// graph.add_vertex("a");
/// graph.add_vertex("b");
/// graph.add_edge(SimpleEdge::new("a", "b"));
/// graph.add_sub_graph(SimpleSubGraph::new("group").with_vertex("c"));
///
/// assert_eq!(graph.edges().count(), 1);
/// assert_eq!(graph.all_vertices(), [&"a", &"b", &"c"]);
/// ```
#[derive(Debug)]
pub struct SimpleGraph<V> {
    vertices: Vec<V>,
    edges: Vec<SimpleEdge<V>>,
    sub_graphs: Vec<SimpleSubGraph<V>>,
    ports: HashMap<V, Vec<String>>,
    names: HashMap<V, String>,
    attributes: Attributes,
    notifier: ChangeNotifier,
}

impl<V> Default for SimpleGraph<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            sub_graphs: Vec::new(),
            ports: HashMap::new(),
            names: HashMap::new(),
            attributes: Attributes::default(),
            notifier: ChangeNotifier::default(),
        }
    }
}

impl<V: Eq + Hash + Clone + fmt::Debug> SimpleGraph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: V) {
        self.vertices.push(vertex);
        self.notifier.notify();
    }

    /// Removes a vertex together with every edge touching it.
    ///
    /// Returns `false` without notifying when the vertex is not owned by the
    /// graph. Sub-graph membership is left untouched.
    pub fn remove_vertex(&mut self, vertex: &V) -> bool {
        let Some(index) = self.vertices.iter().position(|v| v == vertex) else {
            return false;
        };
        self.vertices.remove(index);
        self.edges
            .retain(|edge| edge.source() != vertex && edge.destination() != vertex);
        self.ports.remove(vertex);
        self.names.remove(vertex);
        self.notifier.notify();
        true
    }

    pub fn add_edge(&mut self, edge: SimpleEdge<V>) {
        self.edges.push(edge);
        self.notifier.notify();
    }

    pub fn add_sub_graph(&mut self, sub_graph: SimpleSubGraph<V>) {
        self.sub_graphs.push(sub_graph);
        self.notifier.notify();
    }

    /// Declares record fields for a vertex.
    pub fn set_ports<I, S>(&mut self, vertex: V, ports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ports
            .insert(vertex, ports.into_iter().map(Into::into).collect());
    }

    /// Gives a vertex a textual name.
    ///
    /// Names become DOT node ids once every vertex of a pass has one.
    pub fn set_name(&mut self, vertex: V, name: impl Into<String>) {
        self.names.insert(vertex, name.into());
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn change_notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

impl<V: Eq + Hash + Clone + fmt::Debug> Graph for SimpleGraph<V> {
    type Vertex = V;
    type Edge = SimpleEdge<V>;
    type SubGraph = SimpleSubGraph<V>;

    fn vertices(&self) -> impl Iterator<Item = &V> {
        self.vertices.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &SimpleEdge<V>> {
        self.edges.iter()
    }

    fn sub_graphs(&self) -> impl Iterator<Item = &SimpleSubGraph<V>> {
        self.sub_graphs.iter()
    }

    fn vertex_name(&self, vertex: &V) -> Option<String> {
        self.names.get(vertex).cloned()
    }

    fn vertex_ports(&self, vertex: &V) -> Vec<String> {
        self.ports.get(vertex).cloned().unwrap_or_default()
    }

    fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }

    fn notifier(&self) -> Option<&ChangeNotifier> {
        Some(&self.notifier)
    }
}

/// An edge with an arrow at the destination unless configured otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleEdge<V> {
    source: V,
    destination: V,
    source_port: Option<String>,
    destination_port: Option<String>,
    source_arrow: Option<ArrowShape>,
    destination_arrow: Option<ArrowShape>,
    label: Option<String>,
    source_label: Option<String>,
    destination_label: Option<String>,
    attributes: Attributes,
}

impl<V> SimpleEdge<V> {
    pub fn new(source: V, destination: V) -> Self {
        Self {
            source,
            destination,
            source_port: None,
            destination_port: None,
            source_arrow: None,
            destination_arrow: Some(ArrowShape::Normal),
            label: None,
            source_label: None,
            destination_label: None,
            attributes: Attributes::default(),
        }
    }

    pub fn with_ports(mut self, source: Option<&str>, destination: Option<&str>) -> Self {
        self.source_port = source.map(str::to_string);
        self.destination_port = destination.map(str::to_string);
        self
    }

    pub fn with_arrows(
        mut self,
        source: Option<ArrowShape>,
        destination: Option<ArrowShape>,
    ) -> Self {
        self.source_arrow = source;
        self.destination_arrow = destination;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_end_labels(mut self, source: Option<&str>, destination: Option<&str>) -> Self {
        self.source_label = source.map(str::to_string);
        self.destination_label = destination.map(str::to_string);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }
}

impl<V> Edge for SimpleEdge<V> {
    type Vertex = V;

    fn source(&self) -> &V {
        &self.source
    }

    fn destination(&self) -> &V {
        &self.destination
    }

    fn source_port(&self) -> Option<&str> {
        self.source_port.as_deref()
    }

    fn destination_port(&self) -> Option<&str> {
        self.destination_port.as_deref()
    }

    fn source_arrow(&self) -> Option<ArrowShape> {
        self.source_arrow
    }

    fn destination_arrow(&self) -> Option<ArrowShape> {
        self.destination_arrow
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    fn destination_label(&self) -> Option<&str> {
        self.destination_label.as_deref()
    }

    fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }
}

/// A labelled vertex group.
#[derive(Debug)]
pub struct SimpleSubGraph<V> {
    label: String,
    vertices: Vec<V>,
    notifier: ChangeNotifier,
}

impl<V: PartialEq> SimpleSubGraph<V> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            vertices: Vec::new(),
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn with_vertex(mut self, vertex: V) -> Self {
        self.vertices.push(vertex);
        self
    }

    pub fn add_vertex(&mut self, vertex: V) {
        self.vertices.push(vertex);
        self.notifier.notify();
    }

    pub fn remove_vertex(&mut self, vertex: &V) -> bool {
        let before = self.vertices.len();
        self.vertices.retain(|v| v != vertex);
        let removed = self.vertices.len() != before;
        if removed {
            self.notifier.notify();
        }
        removed
    }
}

impl<V> SubGraph for SimpleSubGraph<V> {
    type Vertex = V;

    fn vertices(&self) -> impl Iterator<Item = &V> {
        self.vertices.iter()
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn notifier(&self) -> Option<&ChangeNotifier> {
        Some(&self.notifier)
    }
}
