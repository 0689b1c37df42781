//! Elaboration of the syntax tree into a [`DotGraph`].
//!
//! This pass applies DOT attribute scoping, expands edge chains and subgraph
//! operands into individual edges, interprets the geometry attributes written
//! by the layout engine, and checks that the graph is consistent.
//!
//! Scoping follows DOT: `node [...]` and `edge [...]` defaults are inherited by
//! nested subgraphs and apply to vertices declared after them. A vertex takes
//! the defaults in effect at its first declaration; later statements for the
//! same id only override. Every vertex mentioned inside a subgraph, including
//! edge endpoints, becomes a member of that subgraph and of all its ancestors.
//!
//! Syntax problems with values (`E102`-`E104`) are reported before semantic
//! ones (`E2xx`), so a malformed document is never reported as inconsistent.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};

use dotweave_core::{attributes::Attributes, geometry::Point};

use crate::{
    dot::{DotEdge, DotGraph, DotSubGraph, DotVertex},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types::{
        AttrTarget, Attribute, Document, EdgeOperand, EdgeStmt, NodeRef, NodeStmt, Stmt, Subgraph,
    },
    record::RecordLabel,
    span::{Span, Spanned},
    values::{self, LabelContext},
};

type SpannedAttrs = IndexMap<String, Spanned<String>>;

const COMPASS_POINTS: [&str; 10] = ["n", "ne", "e", "se", "s", "sw", "w", "nw", "c", "_"];

fn merge(target: &mut SpannedAttrs, attrs: &[Attribute]) {
    for attr in attrs {
        target.insert(attr.name.inner().clone(), attr.value.clone());
    }
}

fn to_attributes(attrs: &SpannedAttrs) -> Attributes {
    attrs
        .iter()
        .map(|(name, value)| (name.clone(), value.inner().clone()))
        .collect()
}

fn text<'a>(attrs: &'a SpannedAttrs, name: &str) -> Option<&'a str> {
    attrs.get(name).map(|value| value.inner().as_str())
}

/// Looks up the first present attribute among alternative spellings.
fn first_of<'a>(attrs: &'a SpannedAttrs, names: &[&str]) -> Option<&'a Spanned<String>> {
    names.iter().find_map(|name| attrs.get(*name))
}

#[derive(Debug, Clone, Default)]
struct Scope {
    node: SpannedAttrs,
    edge: SpannedAttrs,
}

#[derive(Debug)]
struct PendingVertex {
    span: Span,
    attrs: SpannedAttrs,
}

#[derive(Debug)]
struct PendingEdge {
    source: NodeRef,
    destination: NodeRef,
    attrs: SpannedAttrs,
}

#[derive(Debug)]
struct PendingCluster {
    name: Spanned<String>,
    members: IndexSet<String>,
    attrs: SpannedAttrs,
}

struct GraphBuilder {
    directed: bool,
    vertices: IndexMap<String, PendingVertex>,
    edges: Vec<PendingEdge>,
    clusters: Vec<PendingCluster>,
    cluster_slots: HashMap<String, usize>,
    syntax: DiagnosticCollector,
    semantic: DiagnosticCollector,
}

/// Builds a [`DotGraph`] from a parsed document.
///
/// All value and consistency problems are collected; the returned error
/// holds either every syntax diagnostic or, when there are none, every
/// semantic one.
pub(crate) fn build(document: Document) -> Result<DotGraph, ParseError> {
    debug!("Building engine graph");
    let mut builder = GraphBuilder {
        directed: document.directed,
        vertices: IndexMap::new(),
        edges: Vec::new(),
        clusters: Vec::new(),
        cluster_slots: HashMap::new(),
        syntax: DiagnosticCollector::new(),
        semantic: DiagnosticCollector::new(),
    };

    let mut scope = Scope::default();
    let mut graph_attrs = SpannedAttrs::new();
    let mut members = IndexSet::new();
    builder.walk(&document.stmts, &mut scope, &mut graph_attrs, &mut members);
    builder.finish(document, graph_attrs)
}

impl GraphBuilder {
    fn walk(
        &mut self,
        stmts: &[Stmt],
        scope: &mut Scope,
        graph_attrs: &mut SpannedAttrs,
        members: &mut IndexSet<String>,
    ) {
        for stmt in stmts {
            match stmt {
                Stmt::Attr(attr) => {
                    let target = match attr.target {
                        AttrTarget::Graph => &mut *graph_attrs,
                        AttrTarget::Node => &mut scope.node,
                        AttrTarget::Edge => &mut scope.edge,
                    };
                    merge(target, &attr.attrs);
                }
                Stmt::Assign(attr) => merge(graph_attrs, std::slice::from_ref(attr)),
                Stmt::Node(node) => {
                    self.declare_vertex(node, &scope.node);
                    members.insert(node.node.id.inner().clone());
                }
                Stmt::Edge(edge) => self.edge_stmt(edge, scope, members),
                Stmt::Subgraph(subgraph) => {
                    self.subgraph(subgraph, scope, members);
                }
            }
        }
    }

    fn declare_vertex(&mut self, stmt: &NodeStmt, defaults: &SpannedAttrs) {
        let vertex = self
            .vertices
            .entry(stmt.node.id.inner().clone())
            .or_insert_with(|| PendingVertex {
                span: stmt.node.id.span(),
                attrs: defaults.clone(),
            });
        merge(&mut vertex.attrs, &stmt.attrs);
    }

    /// Walks a subgraph body in a child scope and returns its members.
    fn subgraph(
        &mut self,
        subgraph: &Subgraph,
        parent: &Scope,
        parent_members: &mut IndexSet<String>,
    ) -> IndexSet<String> {
        let slot = subgraph
            .name
            .as_ref()
            .filter(|name| name.inner().starts_with("cluster"))
            .map(|name| self.cluster_slot(name));

        let mut scope = parent.clone();
        let mut attrs = SpannedAttrs::new();
        let mut members = IndexSet::new();
        self.walk(&subgraph.stmts, &mut scope, &mut attrs, &mut members);

        if let Some(slot) = slot {
            let cluster = &mut self.clusters[slot];
            cluster.members.extend(members.iter().cloned());
            cluster.attrs.extend(attrs);
        }
        parent_members.extend(members.iter().cloned());
        members
    }

    /// Reserves the pre-order slot of a cluster, reusing it when the same
    /// cluster is reopened.
    fn cluster_slot(&mut self, name: &Spanned<String>) -> usize {
        if let Some(&slot) = self.cluster_slots.get(name.inner()) {
            return slot;
        }
        self.clusters.push(PendingCluster {
            name: name.clone(),
            members: IndexSet::new(),
            attrs: SpannedAttrs::new(),
        });
        let slot = self.clusters.len() - 1;
        self.cluster_slots.insert(name.inner().clone(), slot);
        slot
    }

    fn edge_stmt(&mut self, stmt: &EdgeStmt, scope: &Scope, members: &mut IndexSet<String>) {
        let mut attrs = scope.edge.clone();
        merge(&mut attrs, &stmt.attrs);

        let mut groups: Vec<Vec<NodeRef>> = Vec::with_capacity(stmt.operands.len());
        for operand in &stmt.operands {
            match operand {
                EdgeOperand::Node(node) => {
                    members.insert(node.id.inner().clone());
                    groups.push(vec![node.clone()]);
                }
                EdgeOperand::Subgraph(subgraph) => {
                    let ids = self.subgraph(subgraph, scope, members);
                    groups.push(
                        ids.into_iter()
                            .map(|id| NodeRef {
                                id: Spanned::new(id, subgraph.span),
                                port: None,
                                compass: None,
                            })
                            .collect(),
                    );
                }
            }
        }

        for (operator, pair) in stmt.operators.iter().zip(groups.windows(2)) {
            if *operator.inner() != self.directed {
                let (used, expected) = if *operator.inner() {
                    ("->", "--")
                } else {
                    ("--", "->")
                };
                let kind = if self.directed { "digraph" } else { "graph" };
                self.syntax.emit(
                    Diagnostic::new(
                        ErrorCode::E103,
                        format!("edge operator `{used}` used in a {kind}"),
                    )
                    .with_label(operator.span(), "wrong edge operator")
                    .with_help(format!("use `{expected}` in a {kind}")),
                );
            }
            for source in &pair[0] {
                for destination in &pair[1] {
                    self.edges.push(PendingEdge {
                        source: source.clone(),
                        destination: destination.clone(),
                        attrs: attrs.clone(),
                    });
                }
            }
        }
    }

    /// Interprets a value, reporting `E102` on failure.
    fn value<T>(
        &mut self,
        value: &Spanned<String>,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let result = parse(value.inner()).map_err(|message| {
            Diagnostic::new(ErrorCode::E102, message).with_label(value.span(), "invalid value")
        });
        self.syntax.check(result)
    }

    fn missing_position(&mut self, what: String, span: Span) {
        self.semantic.emit(
            Diagnostic::new(ErrorCode::E202, format!("{what} has no `pos` attribute"))
                .with_label(span, "declared here")
                .with_help("pass the graph through a layout engine before reading it"),
        );
    }

    fn finish(
        mut self,
        document: Document,
        graph_attrs: SpannedAttrs,
    ) -> Result<DotGraph, ParseError> {
        let name = document.id.map(Spanned::into_inner);

        let bounds = match graph_attrs.get("bb") {
            Some(bb) => self.value(bb, values::parse_bounds),
            None => {
                self.semantic.emit(
                    Diagnostic::new(ErrorCode::E201, "graph has no `bb` attribute")
                        .with_label(document.keyword, "graph declared here")
                        .with_help("pass the graph through a layout engine before reading it"),
                );
                None
            }
        };

        let declared: HashSet<String> = self.vertices.keys().cloned().collect();
        let mut vertices = IndexMap::with_capacity(self.vertices.len());
        for (id, pending) in std::mem::take(&mut self.vertices) {
            if let Some(vertex) = self.vertex(id, pending, name.as_deref()) {
                vertices.insert(vertex.id.clone(), vertex);
            }
        }

        let mut edges = Vec::with_capacity(self.edges.len());
        for pending in std::mem::take(&mut self.edges) {
            for end in [&pending.source, &pending.destination] {
                if !declared.contains(end.id.inner()) {
                    self.semantic.emit(
                        Diagnostic::new(
                            ErrorCode::E200,
                            format!("vertex `{}` is not declared", end.id.inner()),
                        )
                        .with_label(end.id.span(), "referenced by an edge")
                        .with_help("every edge endpoint needs a node statement with a position"),
                    );
                }
            }
            if let Some(edge) = self.edge(pending, &vertices) {
                edges.push(edge);
            }
        }

        let mut sub_graphs = Vec::with_capacity(self.clusters.len());
        for cluster in std::mem::take(&mut self.clusters) {
            if let Some(sub_graph) = self.sub_graph(cluster) {
                sub_graphs.push(sub_graph);
            }
        }

        self.syntax.finish()?;
        self.semantic.finish()?;

        let Some(bounds) = bounds else {
            return Err(Diagnostic::new(ErrorCode::E201, "graph has no usable `bb` attribute").into());
        };

        trace!(
            vertices = vertices.len(),
            edges = edges.len(),
            clusters = sub_graphs.len();
            "Engine graph built"
        );

        Ok(DotGraph {
            name,
            strict: document.strict,
            directed: document.directed,
            bounds,
            vertices,
            edges,
            sub_graphs,
            attributes: to_attributes(&graph_attrs),
        })
    }

    fn vertex(
        &mut self,
        id: String,
        pending: PendingVertex,
        graph: Option<&str>,
    ) -> Option<DotVertex> {
        let attrs = &pending.attrs;

        let position = match attrs.get("pos") {
            Some(pos) => self.value(pos, values::parse_point),
            None => {
                self.missing_position(format!("vertex `{id}`"), pending.span);
                None
            }
        };
        let width = attrs
            .get("width")
            .and_then(|w| self.value(w, values::parse_number));
        let height = attrs
            .get("height")
            .and_then(|h| self.value(h, values::parse_number));
        let rects = attrs
            .get("rects")
            .and_then(|r| self.value(r, values::parse_rects))
            .unwrap_or_default();

        let context = LabelContext {
            node: Some(&id),
            graph,
            ..LabelContext::default()
        };
        let label_attr = attrs.get("label");
        let is_record = matches!(text(attrs, "shape"), Some("record" | "Mrecord"));

        let (label, record) = if is_record {
            let source = label_attr.map_or(r"\N", |label| label.inner().as_str());
            let span = label_attr.map_or(pending.span, Spanned::span);
            match RecordLabel::parse(source) {
                Ok(record) => (
                    None,
                    Some(record.map_text(|t| values::expand_label(t, context))),
                ),
                Err(message) => {
                    self.syntax.emit(
                        Diagnostic::new(ErrorCode::E104, message)
                            .with_label(span, "invalid record label")
                            .with_help("balance `{`, `}`, `<` and `>`, or escape them with `\\`"),
                    );
                    (None, None)
                }
            }
        } else {
            let source = label_attr.map_or(r"\N", |label| label.inner().as_str());
            (Some(values::expand_label(source, context)), None)
        };

        Some(DotVertex {
            position: position?,
            width,
            height,
            label,
            record,
            rects,
            attributes: to_attributes(attrs),
            id,
        })
    }

    fn edge(
        &mut self,
        pending: PendingEdge,
        vertices: &IndexMap<String, DotVertex>,
    ) -> Option<DotEdge> {
        let PendingEdge {
            source,
            destination,
            attrs,
        } = pending;

        let spline = match attrs.get("pos") {
            Some(pos) => self.value(pos, values::parse_spline),
            None => {
                self.missing_position(
                    format!(
                        "edge `{}` to `{}`",
                        source.id.inner(),
                        destination.id.inner()
                    ),
                    source.id.span().union(destination.id.span()),
                );
                None
            }
        };
        if attrs
            .get("pos")
            .is_some_and(|pos| pos.inner().contains(';'))
        {
            debug!(
                source = source.id.inner().as_str(),
                destination = destination.id.inner().as_str();
                "Edge has several splines, keeping the first"
            );
        }

        let label_position = self.optional_point(&attrs, &["lp"]);
        let destination_label_position = self.optional_point(&attrs, &["head_lp", "headlp"]);
        let source_label_position = self.optional_point(&attrs, &["tail_lp", "taillp"]);

        let source_vertex = vertices.get(source.id.inner());
        let destination_vertex = vertices.get(destination.id.inner());
        let source_port = port_name(&source, source_vertex);
        let destination_port = port_name(&destination, destination_vertex);

        let mut spline = spline?;
        if let (Some(s), Some(d)) = (source_vertex, destination_vertex) {
            orient(&mut spline.points, s.position(), d.position());
        }

        let context = LabelContext {
            node: None,
            graph: None,
            tail: Some(source.id.inner()),
            head: Some(destination.id.inner()),
        };
        let label = text(&attrs, "label").map(|t| values::expand_label(t, context));
        let source_label = text(&attrs, "taillabel").map(|t| values::expand_label(t, context));
        let destination_label =
            text(&attrs, "headlabel").map(|t| values::expand_label(t, context));

        Some(DotEdge {
            source: source.id.into_inner(),
            destination: destination.id.into_inner(),
            source_port,
            destination_port,
            points: spline.points,
            source_arrow: spline.start,
            destination_arrow: spline.end,
            label_position,
            source_label_position,
            destination_label_position,
            label,
            source_label,
            destination_label,
            attributes: to_attributes(&attrs),
        })
    }

    fn optional_point(&mut self, attrs: &SpannedAttrs, names: &[&str]) -> Option<Point> {
        first_of(attrs, names).and_then(|value| self.value(value, values::parse_point))
    }

    fn sub_graph(&mut self, cluster: PendingCluster) -> Option<DotSubGraph> {
        let PendingCluster {
            name,
            members,
            attrs,
        } = cluster;

        let bounds = match attrs.get("bb") {
            Some(bb) => self.value(bb, values::parse_bounds),
            None => {
                self.semantic.emit(
                    Diagnostic::new(
                        ErrorCode::E201,
                        format!("cluster `{}` has no `bb` attribute", name.inner()),
                    )
                    .with_label(name.span(), "cluster declared here"),
                );
                None
            }
        };
        let label_position = self.optional_point(&attrs, &["lp"]);
        let context = LabelContext {
            graph: Some(name.inner()),
            ..LabelContext::default()
        };
        let label = text(&attrs, "label").map(|t| values::expand_label(t, context));

        Some(DotSubGraph {
            bounds: bounds?,
            members: members.into_iter().collect(),
            label,
            label_position,
            attributes: to_attributes(&attrs),
            name: name.into_inner(),
        })
    }
}

/// Resolves the port of an edge endpoint.
///
/// A single `:name` suffix is kept as the port even when the vertex has no
/// record field of that name, since the engine accepts compass points there.
fn port_name(node: &NodeRef, vertex: Option<&DotVertex>) -> Option<String> {
    let port = node.port.as_ref()?.inner();
    let known = vertex.is_some_and(|v| v.has_port(port));
    if !known && node.compass.is_none() && !COMPASS_POINTS.contains(&port.as_str()) {
        warn!(
            vertex = node.id.inner().as_str(),
            port = port.as_str();
            "Edge references an unknown port"
        );
    }
    Some(port.clone())
}

/// Puts control points in source to destination order.
///
/// The engine may emit a path from the head towards the tail, for example for
/// edges it reversed while ranking. The order whose ends lie closer to the
/// matching vertices wins; ties keep the file order.
fn orient(points: &mut [Point], source: Point, destination: Point) {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return;
    };
    let forward = first.distance(source) + last.distance(destination);
    let backward = first.distance(destination) + last.distance(source);
    if backward < forward {
        points.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::tokenize, parser::build_document};

    fn build_str(source: &str) -> Result<DotGraph, ParseError> {
        let tokens = tokenize(source).expect("tokenize");
        let document = build_document(&tokens).expect("parse");
        build(document)
    }

    fn codes(err: &ParseError) -> Vec<ErrorCode> {
        err.diagnostics().iter().map(Diagnostic::code).collect()
    }

    #[test]
    fn test_orient_keeps_forward_path() {
        let mut points = vec![Point::new(0.0, 10.0), Point::new(0.0, 0.0)];
        orient(&mut points, Point::new(0.0, 12.0), Point::new(0.0, -2.0));
        assert_eq!(points[0], Point::new(0.0, 10.0));
    }

    #[test]
    fn test_orient_reverses_backward_path() {
        let mut points = vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0)];
        orient(&mut points, Point::new(0.0, 12.0), Point::new(0.0, -2.0));
        assert_eq!(points[0], Point::new(0.0, 10.0));
    }

    #[test]
    fn test_orient_self_loop_untouched() {
        let mut points = vec![Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 0.0)];
        orient(&mut points, Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(points[0], Point::new(1.0, 0.0));
    }

    #[test]
    fn test_node_defaults_apply_at_declaration() {
        let graph = build_str(
            r#"digraph { graph [bb="0,0,10,10"];
                node [width=1];
                a [pos="1,1"];
                node [width=2];
                b [pos="2,2"];
                a [height=3];
            }"#,
        )
        .unwrap();
        let a = graph.vertex("a").unwrap();
        assert_eq!(a.width(), Some(1.0));
        assert_eq!(a.height(), Some(3.0));
        assert_eq!(graph.vertex("b").unwrap().width(), Some(2.0));
    }

    #[test]
    fn test_subgraph_scope_does_not_leak() {
        let graph = build_str(
            r#"graph { bb="0,0,10,10";
                subgraph s { node [width=5]; a [pos="1,1"]; }
                b [pos="2,2"];
            }"#,
        )
        .unwrap();
        assert_eq!(graph.vertex("a").unwrap().width(), Some(5.0));
        assert_eq!(graph.vertex("b").unwrap().width(), None);
    }

    #[test]
    fn test_edge_chain_and_subgraph_operand_expand() {
        let graph = build_str(
            r#"digraph { bb="0,0,10,10";
                a [pos="0,0"]; b [pos="5,5"]; c [pos="9,9"];
                edge [pos="0,0 9,9"];
                a -> { b c } -> a;
            }"#,
        )
        .unwrap();
        let pairs: Vec<_> = graph
            .edges()
            .iter()
            .map(|e| (e.source(), e.destination()))
            .collect();
        assert_eq!(pairs, [("a", "b"), ("a", "c"), ("b", "a"), ("c", "a")]);
    }

    #[test]
    fn test_nested_clusters_flatten_preorder() {
        let graph = build_str(
            r#"digraph { bb="0,0,10,10";
                subgraph cluster_0 { bb="0,0,8,8";
                    a [pos="1,1"];
                    subgraph cluster_1 { bb="2,2,6,6"; b [pos="3,3"]; }
                }
                subgraph cluster_2 { bb="8,8,10,10"; c [pos="9,9"]; }
            }"#,
        )
        .unwrap();
        let names: Vec<_> = graph.sub_graphs().iter().map(DotSubGraph::name).collect();
        assert_eq!(names, ["cluster_0", "cluster_1", "cluster_2"]);
        assert_eq!(graph.sub_graphs()[0].members(), ["a", "b"]);
        assert_eq!(graph.sub_graphs()[1].members(), ["b"]);
    }

    #[test]
    fn test_plain_subgraph_is_not_cluster() {
        let graph = build_str(
            r#"graph { bb="0,0,10,10"; subgraph rank_same { a [pos="1,1"]; } }"#,
        )
        .unwrap();
        assert!(graph.sub_graphs().is_empty());
    }

    #[test]
    fn test_mismatched_operator_is_syntax_error() {
        let err = build_str(r#"graph { bb="0,0,1,1"; a [pos="0,0"]; b [pos="1,1"]; a -> b [pos="0,0 1,1"]; }"#)
            .unwrap_err();
        assert_eq!(codes(&err), [ErrorCode::E103]);
    }

    #[test]
    fn test_syntax_errors_win_over_semantic() {
        let err = build_str(r#"digraph { bb="0,0,1,1"; a [pos="x,y"]; a -> ghost [pos="0,0 1,1"]; }"#)
            .unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(codes(&err), [ErrorCode::E102]);
    }

    #[test]
    fn test_missing_positions() {
        let err = build_str(r#"digraph { bb="0,0,1,1"; a; b [pos="1,1"]; a -> b; }"#).unwrap_err();
        assert!(err.is_semantic());
        assert_eq!(codes(&err), [ErrorCode::E202, ErrorCode::E202]);
    }

    #[test]
    fn test_cluster_without_bb() {
        let err = build_str(
            r#"digraph { bb="0,0,1,1"; subgraph cluster_x { a [pos="0,0"]; } }"#,
        )
        .unwrap_err();
        assert_eq!(codes(&err), [ErrorCode::E201]);
        assert_eq!(err.diagnostics()[0].span(), Span::new(33..42));
    }

    #[test]
    fn test_labels_expand() {
        let graph = build_str(
            r#"digraph G { bb="0,0,1,1"; node [label="\N!"];
                a [pos="0,0"]; b [pos="1,1"];
                a -> b [pos="0,0 1,1", label="\E", headlabel="\H", taillabel="\T"];
            }"#,
        )
        .unwrap();
        assert_eq!(graph.vertex("a").unwrap().label(), Some("a!"));
        let edge = &graph.edges()[0];
        assert_eq!(edge.label(), Some("a->b"));
        assert_eq!(edge.destination_label(), Some("b"));
        assert_eq!(edge.source_label(), Some("a"));
    }
}
