//! SVG rendering of a layout pass.
//!
//! [`SvgBuilder`] is a [`LayoutBuilder`] that measures vertex labels with
//! cosmic-text, reports padded sizes to the engine, and draws the replayed
//! geometry into an SVG document. Engine coordinates are flipped so the
//! document uses the usual top-left origin.

mod layer;
mod text;

pub use text::TextStyle;

use std::{collections::HashMap, fmt, hash::Hash};

use log::debug;
use svg::{Document, node::element as svg_element};

use dotweave_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    graph::{ArrowShape, Edge, Graph, SubGraph},
};
use dotweave_parser::{DotEdge, DotGraph, DotSubGraph, DotVertex};

use crate::{
    builder::{BuilderError, LayoutBuilder},
    config::StyleConfig,
};

use layer::{LayeredOutput, RenderLayer};

const ARROW_HALF_WIDTH: f32 = 3.5;

/// Resolved colors and font of a drawing.
#[derive(Debug, Clone)]
struct Palette {
    background: Option<Color>,
    node_fill: Color,
    stroke: Color,
    cluster_fill: Color,
    text: TextStyle,
    padding: f32,
}

impl Palette {
    fn from_config(style: &StyleConfig) -> Result<Self, String> {
        Ok(Self {
            background: style.background_color()?,
            node_fill: style.node_fill_color()?,
            stroke: style.edge_color()?,
            cluster_fill: style.cluster_fill_color()?,
            text: TextStyle::new(style.font_family(), style.font_size()),
            padding: style.node_padding(),
        })
    }
}

type LabelFn<'a, V> = Box<dyn Fn(&V) -> String + 'a>;

/// Draws a layout pass as SVG.
///
/// Vertex labels come from a closure; [`SvgBuilder::new`] uses the vertex's
/// [`Display`](fmt::Display) output.
///
/// # Example
///
/// ```no_run
/// # use dotweave::{LayoutDirector, config::StyleConfig, export::svg::SvgBuilder, runner::ProcessRunner};
/// # use dotweave_core::simple::{SimpleEdge, SimpleGraph};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut graph = SimpleGraph::new();
/// graph.add_edge(SimpleEdge::new("Hello", "World"));
/// graph.add_vertex("Hello");
/// graph.add_vertex("World");
///
/// let mut builder = SvgBuilder::new(&StyleConfig::default())?;
/// LayoutDirector::new().layout(&graph, &mut builder, &ProcessRunner::new())?;
/// println!("{}", builder.into_svg_string());
/// # Ok(())
/// # }
/// ```
pub struct SvgBuilder<'a, V> {
    palette: Palette,
    labels: LabelFn<'a, V>,
    sizes: HashMap<String, Size>,
    height: f32,
    /// Engine bounding box in document coordinates.
    view: Bounds,
    output: LayeredOutput,
}

impl<'a, V: fmt::Display> SvgBuilder<'a, V> {
    /// Creates a builder labelling vertices with their `Display` text.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable color in `style`.
    pub fn new(style: &StyleConfig) -> Result<Self, String> {
        Self::with_labels(style, |vertex: &V| vertex.to_string())
    }
}

impl<'a, V> SvgBuilder<'a, V> {
    /// Creates a builder labelling vertices with `labels`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable color in `style`.
    pub fn with_labels(
        style: &StyleConfig,
        labels: impl Fn(&V) -> String + 'a,
    ) -> Result<Self, String> {
        Ok(Self {
            palette: Palette::from_config(style)?,
            labels: Box::new(labels),
            sizes: HashMap::new(),
            height: 0.0,
            view: Bounds::default(),
            output: LayeredOutput::default(),
        })
    }

    /// Size reported to the engine for a label: the padded text extent, and
    /// never smaller than one line of text.
    fn label_size(&self, label: &str) -> Size {
        let text = &self.palette.text;
        let minimum = Size::new(text.font_size() * 2.0, text.font_size());
        text.measure(label).max(minimum).pad(self.palette.padding)
    }

    fn flip(&self, point: Point) -> Point {
        point.flip_y(self.height)
    }

    fn add_label(&mut self, text: &str, position: Point) {
        if text.is_empty() {
            return;
        }
        let node = self
            .palette
            .text
            .render(text, self.flip(position), self.palette.stroke);
        self.output.add_to_layer(RenderLayer::Text, node);
    }

    fn add_arrow(&mut self, from: Point, tip: Point, shape: ArrowShape) {
        if shape == ArrowShape::None {
            return;
        }
        let (from, tip) = (self.flip(from), self.flip(tip));
        let direction = tip.sub_point(from);
        let length = direction.hypot();
        if length == 0.0 {
            return;
        }
        let normal = Point::new(-direction.y(), direction.x()).scale(ARROW_HALF_WIDTH / length);
        let corners = [tip, from.add_point(normal), from.sub_point(normal)];
        let points: Vec<_> = corners
            .iter()
            .map(|corner| format!("{},{}", corner.x(), corner.y()))
            .collect();

        let fill = if shape.is_filled() {
            self.palette.stroke.to_string()
        } else {
            "none".to_owned()
        };
        let polygon = svg_element::Polygon::new()
            .set("points", points.join(" "))
            .set("fill", fill)
            .set("stroke", self.palette.stroke.to_string());
        self.output.add_to_layer(RenderLayer::Edge, polygon);
    }

    /// Assembles the document drawn so far.
    pub fn into_document(self) -> Document {
        let view = self.view;
        let mut document = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    view.min_x(),
                    view.min_y(),
                    view.width(),
                    view.height()
                ),
            )
            .set("width", view.width())
            .set("height", view.height());
        for node in self.output.render() {
            document = document.add(node);
        }
        document
    }

    pub fn into_svg_string(self) -> String {
        self.into_document().to_string()
    }
}

impl<G, V> LayoutBuilder<G> for SvgBuilder<'_, V>
where
    G: Graph<Vertex = V>,
    V: Eq + Hash + fmt::Debug,
{
    fn start(&mut self, graph: &G) -> Result<(), BuilderError> {
        self.output = LayeredOutput::default();
        self.sizes.clear();
        for vertex in graph.all_vertices() {
            let label = (self.labels)(vertex);
            if !self.sizes.contains_key(&label) {
                let size = self.label_size(&label);
                self.sizes.insert(label, size);
            }
        }
        debug!(labels = self.sizes.len(); "Vertex labels measured");
        Ok(())
    }

    fn size(&self, vertex: &G::Vertex) -> Option<Size> {
        self.sizes.get(&(self.labels)(vertex)).copied()
    }

    fn build_graph(&mut self, _size: Size, _graph: &G, dot: &DotGraph) -> Result<(), BuilderError> {
        self.height = dot.bounds().max_y();
        self.view = dot.bounds().flip_y(self.height);
        if let Some(background) = self.palette.background {
            let rect = svg_element::Rectangle::new()
                .set("x", self.view.min_x())
                .set("y", self.view.min_y())
                .set("width", self.view.width())
                .set("height", self.view.height())
                .set("fill", background.to_string())
                .set("fill-opacity", background.alpha());
            self.output.add_to_layer(RenderLayer::Background, rect);
        }
        Ok(())
    }

    fn build_sub_graph(
        &mut self,
        bounds: Bounds,
        sub_graph: &G::SubGraph,
        dot: &DotSubGraph,
    ) -> Result<(), BuilderError> {
        let flipped = bounds.flip_y(self.height);
        let rect = svg_element::Rectangle::new()
            .set("x", flipped.min_x())
            .set("y", flipped.min_y())
            .set("width", flipped.width())
            .set("height", flipped.height())
            .set("fill", self.palette.cluster_fill.to_string())
            .set("stroke", self.palette.stroke.to_string());
        self.output.add_to_layer(RenderLayer::Cluster, rect);

        if let Some(label) = dot.label().or(sub_graph.label()) {
            let font_size = self.palette.text.font_size();
            let position = dot.label_position().unwrap_or_else(|| {
                Point::new(bounds.center().x(), bounds.max_y() - font_size)
            });
            self.add_label(label, position);
        }
        Ok(())
    }

    fn build_vertex(
        &mut self,
        position: Point,
        size: Size,
        vertex: &G::Vertex,
        dot: &DotVertex,
    ) -> Result<(), BuilderError> {
        let bounds = Bounds::new_from_center(self.flip(position), size);
        let rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("fill", self.palette.node_fill.to_string())
            .set("stroke", self.palette.stroke.to_string());
        self.output.add_to_layer(RenderLayer::Vertex, rect);

        for field in dot.rects() {
            let field = field.flip_y(self.height);
            let rect = svg_element::Rectangle::new()
                .set("x", field.min_x())
                .set("y", field.min_y())
                .set("width", field.width())
                .set("height", field.height())
                .set("fill", "none")
                .set("stroke", self.palette.stroke.to_string());
            self.output.add_to_layer(RenderLayer::Vertex, rect);
        }

        let label = (self.labels)(vertex);
        self.add_label(&label, position);
        Ok(())
    }

    fn build_edge(
        &mut self,
        points: &[Point],
        edge: &G::Edge,
        dot: &DotEdge,
    ) -> Result<(), BuilderError> {
        if let Some(data) = path_data(points.iter().map(|point| self.flip(*point))) {
            let path = svg_element::Path::new()
                .set("d", data)
                .set("fill", "none")
                .set("stroke", self.palette.stroke.to_string());
            self.output.add_to_layer(RenderLayer::Edge, path);
        }

        if let Some((from, tip)) = dot.arrow_at_destination() {
            self.add_arrow(from, tip, edge.destination_arrow().unwrap_or_default());
        }
        if let Some((from, tip)) = dot.arrow_at_source() {
            self.add_arrow(from, tip, edge.source_arrow().unwrap_or_default());
        }

        let labels = [
            (dot.label(), dot.label_position()),
            (dot.source_label(), dot.source_label_position()),
            (dot.destination_label(), dot.destination_label_position()),
        ];
        for (text, position) in labels {
            if let (Some(text), Some(position)) = (text, position) {
                self.add_label(text, position);
            }
        }
        Ok(())
    }
}

/// `M x,y C x,y x,y x,y ...` for B-spline control points, or a polyline when
/// the point count does not describe cubic segments.
fn path_data(points: impl Iterator<Item = Point>) -> Option<String> {
    let points: Vec<Point> = points.collect();
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let command = if rest.len() % 3 == 0 { "C" } else { "L" };
    let coords: Vec<_> = rest
        .iter()
        .map(|point| format!("{},{}", point.x(), point.y()))
        .collect();
    Some(format!(
        "M {},{} {command} {}",
        first.x(),
        first.y(),
        coords.join(" ")
    ))
}
