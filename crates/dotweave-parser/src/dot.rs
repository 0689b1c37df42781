//! The laid-out graph read back from the layout engine.
//!
//! Coordinates are in points with the origin at the bottom-left corner of
//! [`DotGraph::bounds`], exactly as the engine writes them. Vertex sizes are
//! kept in inches and converted by [`DotVertex::size`].

use indexmap::IndexMap;

use dotweave_core::{
    attributes::Attributes,
    geometry::{Bounds, Point, Size},
};

use crate::record::RecordLabel;

/// Default vertex width when the engine omits `width`.
const DEFAULT_WIDTH_INCHES: f32 = 0.75;
/// Default vertex height when the engine omits `height`.
const DEFAULT_HEIGHT_INCHES: f32 = 0.5;

/// A complete engine graph.
#[derive(Debug, Clone)]
pub struct DotGraph {
    pub(crate) name: Option<String>,
    pub(crate) strict: bool,
    pub(crate) directed: bool,
    pub(crate) bounds: Bounds,
    pub(crate) vertices: IndexMap<String, DotVertex>,
    pub(crate) edges: Vec<DotEdge>,
    pub(crate) sub_graphs: Vec<DotSubGraph>,
    pub(crate) attributes: Attributes,
}

impl DotGraph {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// The drawing bounding box from the root `bb` attribute.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Vertices in declaration order.
    pub fn vertices(&self) -> impl Iterator<Item = &DotVertex> {
        self.vertices.values()
    }

    pub fn vertex(&self, id: &str) -> Option<&DotVertex> {
        self.vertices.get(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Edges in declaration order, one per expanded operand pair.
    pub fn edges(&self) -> &[DotEdge] {
        &self.edges
    }

    /// Clusters in pre-order, nested clusters following their parent.
    pub fn sub_graphs(&self) -> &[DotSubGraph] {
        &self.sub_graphs
    }

    /// Root graph attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A positioned vertex.
#[derive(Debug, Clone)]
pub struct DotVertex {
    pub(crate) id: String,
    pub(crate) position: Point,
    pub(crate) width: Option<f32>,
    pub(crate) height: Option<f32>,
    pub(crate) label: Option<String>,
    pub(crate) record: Option<RecordLabel>,
    pub(crate) rects: Vec<Bounds>,
    pub(crate) attributes: Attributes,
}

impl DotVertex {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Center of the vertex.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Width in inches as written by the engine.
    pub fn width(&self) -> Option<f32> {
        self.width
    }

    /// Height in inches as written by the engine.
    pub fn height(&self) -> Option<f32> {
        self.height
    }

    /// Size in points, falling back to the engine defaults.
    pub fn size(&self) -> Size {
        Size::from_inches(
            self.width.unwrap_or(DEFAULT_WIDTH_INCHES),
            self.height.unwrap_or(DEFAULT_HEIGHT_INCHES),
        )
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_center(self.position, self.size())
    }

    /// Expanded label text for non-record shapes.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Parsed label for `record` and `Mrecord` shapes.
    pub fn record(&self) -> Option<&RecordLabel> {
        self.record.as_ref()
    }

    /// Record port names, empty for other shapes.
    pub fn ports(&self) -> Vec<&str> {
        self.record.as_ref().map(RecordLabel::ports).unwrap_or_default()
    }

    pub fn has_port(&self, port: &str) -> bool {
        self.ports().contains(&port)
    }

    /// Record field rectangles in depth-first field order.
    pub fn rects(&self) -> &[Bounds] {
        &self.rects
    }

    /// Rectangle of the record field declaring `port`.
    pub fn port_bounds(&self, port: &str) -> Option<Bounds> {
        let index = self.record.as_ref()?.leaf_index(port)?;
        self.rects.get(index).copied()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A routed edge.
#[derive(Debug, Clone)]
pub struct DotEdge {
    pub(crate) source: String,
    pub(crate) destination: String,
    pub(crate) source_port: Option<String>,
    pub(crate) destination_port: Option<String>,
    pub(crate) points: Vec<Point>,
    pub(crate) source_arrow: Option<Point>,
    pub(crate) destination_arrow: Option<Point>,
    pub(crate) label_position: Option<Point>,
    pub(crate) source_label_position: Option<Point>,
    pub(crate) destination_label_position: Option<Point>,
    pub(crate) label: Option<String>,
    pub(crate) source_label: Option<String>,
    pub(crate) destination_label: Option<String>,
    pub(crate) attributes: Attributes,
}

impl DotEdge {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn source_port(&self) -> Option<&str> {
        self.source_port.as_deref()
    }

    pub fn destination_port(&self) -> Option<&str> {
        self.destination_port.as_deref()
    }

    /// The `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id")
    }

    /// Bézier control points running from source to destination.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Arrow tip at the source end (`s,x,y`).
    pub fn source_arrow(&self) -> Option<Point> {
        self.source_arrow
    }

    /// Arrow tip at the destination end (`e,x,y`).
    pub fn destination_arrow(&self) -> Option<Point> {
        self.destination_arrow
    }

    /// Arrow at the destination as a `(base, tip)` pair.
    ///
    /// The base is the last control point and the tip the `e` endpoint.
    pub fn arrow_at_destination(&self) -> Option<(Point, Point)> {
        Some((*self.points.last()?, self.destination_arrow?))
    }

    /// Arrow at the source as a `(base, tip)` pair.
    pub fn arrow_at_source(&self) -> Option<(Point, Point)> {
        Some((*self.points.first()?, self.source_arrow?))
    }

    /// Center of the main label (`lp`).
    pub fn label_position(&self) -> Option<Point> {
        self.label_position
    }

    /// Center of the tail label (`tail_lp`).
    pub fn source_label_position(&self) -> Option<Point> {
        self.source_label_position
    }

    /// Center of the head label (`head_lp`).
    pub fn destination_label_position(&self) -> Option<Point> {
        self.destination_label_position
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    pub fn destination_label(&self) -> Option<&str> {
        self.destination_label.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A cluster subgraph.
#[derive(Debug, Clone)]
pub struct DotSubGraph {
    pub(crate) name: String,
    pub(crate) members: Vec<String>,
    pub(crate) bounds: Bounds,
    pub(crate) label: Option<String>,
    pub(crate) label_position: Option<Point>,
    pub(crate) attributes: Attributes,
}

impl DotSubGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertex ids declared in this cluster or any subgraph nested in it.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn label_position(&self) -> Option<Point> {
        self.label_position
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
