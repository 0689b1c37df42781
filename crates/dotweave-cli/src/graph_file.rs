//! TOML graph descriptions.
//!
//! A graph file lists vertices, edges, clusters and graph attributes:
//!
//! ```toml
//! [attributes]
//! rankdir = "LR"
//!
//! [[vertices]]
//! name = "server"
//! label = "Web server"
//! ports = ["in", "out"]
//!
//! [[edges]]
//! from = "client"
//! to = "server"
//! to_port = "in"
//! label = "HTTPS"
//!
//! [[subgraphs]]
//! label = "backend"
//! members = ["server"]
//! ```
//!
//! Vertex names become DOT node ids. Labels default to the name.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use dotweave::{
    LayoutError,
    graph::ArrowShape,
    simple::{SimpleEdge, SimpleGraph, SimpleSubGraph},
};

#[derive(Debug, Error)]
pub enum GraphFileError {
    #[error("invalid graph file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("vertex `{0}` is declared more than once")]
    DuplicateVertex(String),

    #[error("{context} refers to undeclared vertex `{name}`")]
    UndeclaredVertex { context: String, name: String },
}

impl From<GraphFileError> for LayoutError {
    fn from(err: GraphFileError) -> Self {
        LayoutError::Graph(err.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphFile {
    #[serde(default)]
    attributes: BTreeMap<String, String>,

    #[serde(default)]
    vertices: Vec<VertexEntry>,

    #[serde(default)]
    edges: Vec<EdgeEntry>,

    #[serde(default)]
    subgraphs: Vec<SubGraphEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VertexEntry {
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    ports: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeEntry {
    from: String,
    to: String,
    #[serde(default)]
    from_port: Option<String>,
    #[serde(default)]
    to_port: Option<String>,
    /// Arrow at the source end. None drawn unless set.
    #[serde(default)]
    from_arrow: Option<ArrowShape>,
    /// Arrow at the destination end. `normal` unless set.
    #[serde(default = "default_to_arrow")]
    to_arrow: Option<ArrowShape>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    from_label: Option<String>,
    #[serde(default)]
    to_label: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

fn default_to_arrow() -> Option<ArrowShape> {
    Some(ArrowShape::Normal)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubGraphEntry {
    label: String,
    #[serde(default)]
    members: Vec<String>,
}

/// A graph ready for layout, with the display label of every vertex.
#[derive(Debug)]
pub struct LoadedGraph {
    graph: SimpleGraph<String>,
    labels: HashMap<String, String>,
}

impl LoadedGraph {
    pub fn graph(&self) -> &SimpleGraph<String> {
        &self.graph
    }

    /// Display label of `vertex`, falling back to its name.
    pub fn label(&self, vertex: &str) -> String {
        self.labels
            .get(vertex)
            .cloned()
            .unwrap_or_else(|| vertex.to_owned())
    }
}

impl GraphFile {
    /// Parses a graph description.
    ///
    /// # Errors
    ///
    /// Returns [`GraphFileError::Parse`] for malformed TOML or unknown keys.
    pub fn parse(source: &str) -> Result<Self, GraphFileError> {
        Ok(toml::from_str(source)?)
    }

    /// Builds the in-memory graph.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate vertex names, and for edges or clusters
    /// that mention a vertex the file does not declare.
    pub fn into_graph(self) -> Result<LoadedGraph, GraphFileError> {
        let mut graph = SimpleGraph::new();
        let mut labels = HashMap::new();
        let mut declared = HashSet::new();

        for vertex in self.vertices {
            if !declared.insert(vertex.name.clone()) {
                return Err(GraphFileError::DuplicateVertex(vertex.name));
            }
            graph.add_vertex(vertex.name.clone());
            graph.set_name(vertex.name.clone(), vertex.name.clone());
            if !vertex.ports.is_empty() {
                graph.set_ports(vertex.name.clone(), vertex.ports);
            }
            if let Some(label) = vertex.label {
                labels.insert(vertex.name, label);
            }
        }

        let check = |context: String, name: &String| {
            if declared.contains(name) {
                Ok(())
            } else {
                Err(GraphFileError::UndeclaredVertex {
                    context,
                    name: name.clone(),
                })
            }
        };

        for (index, entry) in self.edges.into_iter().enumerate() {
            check(format!("edge {index}"), &entry.from)?;
            check(format!("edge {index}"), &entry.to)?;

            let mut edge = SimpleEdge::new(entry.from, entry.to)
                .with_ports(entry.from_port.as_deref(), entry.to_port.as_deref())
                .with_arrows(entry.from_arrow, entry.to_arrow)
                .with_end_labels(entry.from_label.as_deref(), entry.to_label.as_deref());
            if let Some(label) = entry.label {
                edge = edge.with_label(label);
            }
            for (name, value) in entry.attributes {
                edge = edge.with_attribute(name, value);
            }
            graph.add_edge(edge);
        }

        for entry in self.subgraphs {
            let mut sub_graph = SimpleSubGraph::new(entry.label.as_str());
            for member in entry.members {
                check(format!("cluster `{}`", entry.label), &member)?;
                sub_graph = sub_graph.with_vertex(member);
            }
            graph.add_sub_graph(sub_graph);
        }

        for (name, value) in self.attributes {
            graph.attributes_mut().set(name, value);
        }

        debug!(vertices = declared.len(), labels = labels.len(); "Graph file loaded");
        Ok(LoadedGraph { graph, labels })
    }
}

#[cfg(test)]
mod tests {
    use dotweave::graph::{Edge, Graph, SubGraph};

    use super::*;

    const SERVICES: &str = r#"
[attributes]
rankdir = "LR"

[[vertices]]
name = "client"

[[vertices]]
name = "server"
label = "Web server"
ports = ["in", "out"]

[[edges]]
from = "client"
to = "server"
to_port = "in"
from_arrow = "dot"
label = "HTTPS"
to_label = "443"

[[subgraphs]]
label = "backend"
members = ["server"]
"#;

    #[test]
    fn test_load_services() {
        let loaded = GraphFile::parse(SERVICES).unwrap().into_graph().unwrap();
        let graph = loaded.graph();

        assert_eq!(graph.vertices().count(), 2);
        assert_eq!(graph.vertex_name(&"server".to_owned()).as_deref(), Some("server"));
        assert_eq!(graph.vertex_ports(&"server".to_owned()), ["in", "out"]);
        assert_eq!(graph.attributes().get("rankdir"), Some("LR"));

        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.destination_port(), Some("in"));
        assert_eq!(edge.source_arrow(), Some(ArrowShape::Dot));
        assert_eq!(edge.destination_arrow(), Some(ArrowShape::Normal));
        assert_eq!(edge.label(), Some("HTTPS"));
        assert_eq!(edge.destination_label(), Some("443"));

        let cluster = graph.sub_graphs().next().unwrap();
        assert_eq!(cluster.label(), Some("backend"));

        assert_eq!(loaded.label("server"), "Web server");
        assert_eq!(loaded.label("client"), "client");
    }

    #[test]
    fn test_arrow_can_be_removed() {
        let source = r#"
[[vertices]]
name = "a"

[[edges]]
from = "a"
to = "a"
to_arrow = "none"
"#;
        let loaded = GraphFile::parse(source).unwrap().into_graph().unwrap();
        let edge = loaded.graph().edges().next().unwrap();
        assert_eq!(edge.destination_arrow(), Some(ArrowShape::None));
        assert_eq!(edge.source_arrow(), None);
    }

    #[test]
    fn test_duplicate_vertex() {
        let source = "[[vertices]]\nname = \"a\"\n\n[[vertices]]\nname = \"a\"\n";
        let err = GraphFile::parse(source).unwrap().into_graph().unwrap_err();
        assert!(matches!(err, GraphFileError::DuplicateVertex(name) if name == "a"));
    }

    #[test]
    fn test_undeclared_edge_endpoint() {
        let source = "[[vertices]]\nname = \"a\"\n\n[[edges]]\nfrom = \"a\"\nto = \"b\"\n";
        let err = GraphFile::parse(source).unwrap().into_graph().unwrap_err();
        assert_eq!(err.to_string(), "edge 0 refers to undeclared vertex `b`");
    }

    #[test]
    fn test_undeclared_cluster_member() {
        let source = "[[subgraphs]]\nlabel = \"x\"\nmembers = [\"ghost\"]\n";
        let err = GraphFile::parse(source).unwrap().into_graph().unwrap_err();
        assert_eq!(
            err.to_string(),
            "cluster `x` refers to undeclared vertex `ghost`"
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = GraphFile::parse("[[vertices]]\nname = \"a\"\ncolour = \"red\"\n").unwrap_err();
        assert!(matches!(err, GraphFileError::Parse(_)));
    }
}
