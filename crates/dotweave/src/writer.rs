//! DOT serialization of a graph model.
//!
//! [`DotWriter`] turns a [`Graph`] plus per-vertex sizes into the text fed to
//! the layout engine. The output is always a `digraph`; edge direction is
//! carried by the `dir` attribute so undirected edges keep their shape.
//!
//! Every vertex is emitted as a fixed-size box (or a record when the graph
//! declares ports for it) with an empty label, so the engine reserves exactly
//! the reported size. Edges carry `id="e<index>"` so the matcher can pair them
//! with their originals.
//!
//! # Example
//!
//! ```
//! # use dotweave::writer::DotWriter;
//! # use dotweave_core::{geometry::Size, simple::{SimpleEdge, SimpleGraph}};
//! let mut graph = SimpleGraph::new();
//! graph.add_vertex("a");
//! graph.add_vertex("b");
//! graph.add_edge(SimpleEdge::new("a", "b"));
//!
//! let writer = DotWriter::new(&graph).unwrap();
//! let text = writer.write(|_| Some(Size::new(72.0, 36.0))).unwrap();
//! assert!(text.contains(r#"0 -> 1 [id=e0, dir=forward, arrowhead=normal];"#));
//! ```

use std::collections::HashSet;

use log::{debug, trace, warn};

use dotweave_core::{
    attributes::Attributes,
    geometry::{POINTS_PER_INCH, Size},
    graph::{Edge, Graph, SubGraph},
};

use crate::{error::LayoutError, ids::IdAssignment, snapshot::Snapshot};

const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];
const RECORD_SPECIALS: [char; 6] = ['{', '}', '|', '<', '>', '\\'];

/// Serializes one snapshot of a graph.
pub struct DotWriter<'g, G: Graph> {
    graph: &'g G,
    snapshot: Snapshot<'g, G>,
    ids: IdAssignment<'g, G::Vertex>,
}

impl<'g, G: Graph> DotWriter<'g, G> {
    /// Snapshots `graph` and assigns vertex ids.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Graph`] when vertex names collide.
    pub fn new(graph: &'g G) -> Result<Self, LayoutError> {
        let snapshot = Snapshot::take(graph);
        let ids = IdAssignment::assign(graph, &snapshot.vertices)?;
        Ok(Self {
            graph,
            snapshot,
            ids,
        })
    }

    pub fn graph(&self) -> &'g G {
        self.graph
    }

    pub fn snapshot(&self) -> &Snapshot<'g, G> {
        &self.snapshot
    }

    pub fn ids(&self) -> &IdAssignment<'g, G::Vertex> {
        &self.ids
    }

    /// Writes the DOT text, asking `size` for every vertex in points.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidSize`] when `size` has no positive
    /// answer for a vertex, and [`LayoutError::Graph`] when an edge leaves the
    /// snapshot or a port name cannot be written as a record field.
    pub fn write(
        &self,
        mut size: impl FnMut(&G::Vertex) -> Option<Size>,
    ) -> Result<String, LayoutError> {
        let mut lines = vec!["digraph {".to_owned()];

        let attributes = self.graph.attributes();
        if !attributes.is_empty() {
            lines.push(format!("  graph [{}];", attr_list(&attributes)));
        }
        lines.push(r#"  node [shape=box, fixedsize=true, label=""];"#.to_owned());

        let clustered: HashSet<&G::Vertex> = self
            .snapshot
            .sub_graphs
            .iter()
            .flat_map(|entry| entry.members.iter().copied())
            .collect();

        let mut declared = HashSet::new();
        for vertex in &self.snapshot.vertices {
            if !clustered.contains(vertex) {
                declared.insert(*vertex);
                lines.push(format!("  {};", self.vertex_stmt(vertex, &mut size)?));
            }
        }

        for (index, entry) in self.snapshot.sub_graphs.iter().enumerate() {
            if entry.is_empty() {
                debug!(index; "Skipping empty sub-graph");
                continue;
            }
            lines.push(format!("  subgraph cluster_{index} {{"));
            if let Some(label) = entry.sub_graph.label() {
                lines.push(format!("    label={};", quote(label)));
            }
            for (name, value) in entry.sub_graph.attributes().iter() {
                lines.push(format!("    {}={};", quote(name), quote(value)));
            }
            for member in &entry.members {
                if declared.insert(*member) {
                    lines.push(format!("    {};", self.vertex_stmt(member, &mut size)?));
                } else {
                    lines.push(format!("    {};", quote(self.id(member)?)));
                }
            }
            lines.push("  }".to_owned());
        }

        for (index, edge) in self.snapshot.edges.iter().enumerate() {
            lines.push(format!("  {};", self.edge_stmt(index, edge)?));
        }
        lines.push("}".to_owned());

        let text = lines.join("\n") + "\n";
        debug!(bytes = text.len(); "Graph serialized");
        trace!(text = text.as_str(); "Serialized graph");
        Ok(text)
    }

    fn id(&self, vertex: &G::Vertex) -> Result<&str, LayoutError> {
        self.ids
            .id(vertex)
            .ok_or_else(|| LayoutError::Graph(format!("vertex {vertex:?} is not part of the graph")))
    }

    fn vertex_stmt(
        &self,
        vertex: &G::Vertex,
        size: &mut impl FnMut(&G::Vertex) -> Option<Size>,
    ) -> Result<String, LayoutError> {
        let id = self.id(vertex)?;
        let reported = size(vertex);
        let size = match reported {
            Some(size) if size.is_positive() => size,
            _ => {
                return Err(LayoutError::InvalidSize {
                    vertex: format!("{vertex:?}"),
                    size: reported,
                });
            }
        };

        let mut attrs = Attributes::new()
            .with("width", inches(size.width()))
            .with("height", inches(size.height()));

        let ports = self.graph.vertex_ports(vertex);
        if !ports.is_empty() {
            if let Some(port) = ports
                .iter()
                .find(|port| port.is_empty() || port.contains(RECORD_SPECIALS))
            {
                return Err(LayoutError::Graph(format!(
                    "port `{port}` of vertex `{id}` is not a valid record field name"
                )));
            }
            let fields: Vec<_> = ports.iter().map(|port| format!("<{port}>")).collect();
            attrs.set("shape", "record");
            attrs.set("label", fields.join("|"));
        }

        Ok(format!("{} [{}]", quote(id), attr_list(&attrs)))
    }

    fn edge_stmt(&self, index: usize, edge: &G::Edge) -> Result<String, LayoutError> {
        let source = endpoint(self.id(edge.source())?, edge.source_port());
        let destination = endpoint(self.id(edge.destination())?, edge.destination_port());

        let tail = edge.source_arrow();
        let head = edge.destination_arrow();
        let dir = match (tail.is_some(), head.is_some()) {
            (true, true) => "both",
            (false, true) => "forward",
            (true, false) => "back",
            (false, false) => "none",
        };

        let mut attrs = Attributes::new()
            .with("id", format!("e{index}"))
            .with("dir", dir);
        if let Some(tail) = tail {
            attrs.set("arrowtail", tail.name());
        }
        if let Some(head) = head {
            attrs.set("arrowhead", head.name());
        }
        if let Some(label) = edge.label() {
            attrs.set("label", label);
        }
        if let Some(label) = edge.source_label() {
            attrs.set("taillabel", label);
        }
        if let Some(label) = edge.destination_label() {
            attrs.set("headlabel", label);
        }
        for (name, value) in edge.attributes().iter() {
            if name == "id" {
                warn!(edge = index, value; "Ignoring edge `id` attribute, ids are assigned by the writer");
                continue;
            }
            attrs.set(name, value);
        }

        Ok(format!("{source} -> {destination} [{}]", attr_list(&attrs)))
    }
}

fn endpoint(id: &str, port: Option<&str>) -> String {
    match port {
        Some(port) => format!("{}:{}", quote(id), quote(port)),
        None => quote(id),
    }
}

fn inches(points: f32) -> String {
    format!("{:.4}", points / POINTS_PER_INCH)
}

fn attr_list(attrs: &Attributes) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!("{}={}", quote(name), quote(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns true when `text` can be written as a bare DOT id.
fn is_plain_id(text: &str) -> bool {
    let mut chars = text.chars();
    let identifier = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        && !KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(text));
    identifier || is_numeral(text)
}

/// `-?(.[0-9]+ | [0-9]+(.[0-9]*)?)`
fn is_numeral(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |s: &str| s.chars().all(|ch| ch.is_ascii_digit());
    match fraction {
        None => !whole.is_empty() && all_digits(whole),
        Some(fraction) => {
            all_digits(whole) && all_digits(fraction) && !(whole.is_empty() && fraction.is_empty())
        }
    }
}

/// Writes `text` as a DOT id, quoting and escaping when needed.
pub(crate) fn quote(text: &str) -> String {
    if is_plain_id(text) {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use dotweave_core::{
        graph::ArrowShape,
        simple::{SimpleEdge, SimpleGraph, SimpleSubGraph},
    };

    use super::*;

    fn fixed(_: &&str) -> Option<Size> {
        Some(Size::new(66.0, 38.0))
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("Hello"), "Hello");
        assert_eq!(quote("_a1"), "_a1");
        assert_eq!(quote("-1.5"), "-1.5");
        assert_eq!(quote(".5"), ".5");
        assert_eq!(quote("node"), "\"node\"");
        assert_eq!(quote("Graph"), "\"Graph\"");
        assert_eq!(quote("a b"), "\"a b\"");
        assert_eq!(quote("1a"), "\"1a\"");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("."), "\".\"");
        assert_eq!(quote("say \"hi\"\nC:\\"), r#""say \"hi\"\nC:\\""#);
    }

    #[test]
    fn test_hello_world_text() {
        let mut graph = SimpleGraph::new();
        graph.add_vertex("Hello");
        graph.add_vertex("World");
        graph.set_name("Hello", "Hello");
        graph.set_name("World", "World");
        graph.add_edge(SimpleEdge::new("Hello", "World"));

        let text = DotWriter::new(&graph).unwrap().write(fixed).unwrap();
        assert_eq!(
            text,
            concat!(
                "digraph {\n",
                "  node [shape=box, fixedsize=true, label=\"\"];\n",
                "  Hello [width=0.9167, height=0.5278];\n",
                "  World [width=0.9167, height=0.5278];\n",
                "  Hello -> World [id=e0, dir=forward, arrowhead=normal];\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_clusters_arrows_and_ports() {
        let mut graph = SimpleGraph::new();
        graph.add_vertex("a");
        graph.attributes_mut().set("rankdir", "LR");
        graph.set_ports("a", ["left", "right"]);
        graph.add_sub_graph(SimpleSubGraph::new("Group 1").with_vertex("b").with_vertex("c"));
        graph.add_sub_graph(SimpleSubGraph::new("empty"));
        graph.add_sub_graph(SimpleSubGraph::new("again").with_vertex("b"));
        graph.add_edge(
            SimpleEdge::new("a", "b")
                .with_ports(Some("left"), None)
                .with_arrows(Some(ArrowShape::Diamond), None)
                .with_label("owns"),
        );

        let text = DotWriter::new(&graph).unwrap().write(fixed).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "  graph [rankdir=LR];");
        assert_eq!(
            lines[3],
            r#"  0 [width=0.9167, height=0.5278, shape=record, label="<left>|<right>"];"#
        );
        assert_eq!(lines[4], "  subgraph cluster_0 {");
        assert_eq!(lines[5], "    label=\"Group 1\";");
        assert!(!text.contains("cluster_1"));
        assert!(text.contains("  subgraph cluster_2 {\n    label=again;\n    1;\n  }"));
        assert!(text.contains(
            r#"0:left -> 1 [id=e0, dir=back, arrowtail=diamond, label=owns];"#
        ));
    }

    #[test]
    fn test_invalid_size_rejected() {
        let mut graph = SimpleGraph::new();
        graph.add_vertex("a");
        let writer = DotWriter::new(&graph).unwrap();

        let err = writer.write(|_| Some(Size::new(0.0, 10.0))).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSize { .. }));
        let err = writer.write(|_| None).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSize { size: None, .. }));
    }

    #[test]
    fn test_edge_outside_graph_rejected() {
        let mut graph = SimpleGraph::new();
        graph.add_vertex("a");
        graph.add_edge(SimpleEdge::new("a", "ghost"));
        let err = DotWriter::new(&graph).unwrap().write(fixed).unwrap_err();
        assert!(matches!(err, LayoutError::Graph(_)));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut graph = SimpleGraph::new();
        for v in ["x", "y", "z"] {
            graph.add_vertex(v);
        }
        graph.add_edge(SimpleEdge::new("x", "z"));
        graph.add_edge(SimpleEdge::new("z", "y").with_attribute("color", "red"));

        let first = DotWriter::new(&graph).unwrap().write(fixed).unwrap();
        let second = DotWriter::new(&graph).unwrap().write(fixed).unwrap();
        assert_eq!(first, second);
    }
}
