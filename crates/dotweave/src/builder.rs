//! The callback protocol a layout pass replays into.
//!
//! A [`LayoutBuilder`] is the technology-specific consumer of a layout: it
//! reports vertex sizes before the engine runs, then receives the computed
//! geometry in a fixed order.
//!
//! 1. [`start`](LayoutBuilder::start)
//! 2. [`size`](LayoutBuilder::size) for every vertex, before the engine runs
//! 3. [`build_graph`](LayoutBuilder::build_graph)
//! 4. [`build_sub_graph`](LayoutBuilder::build_sub_graph) for each cluster
//! 5. [`build_vertex`](LayoutBuilder::build_vertex) for each vertex
//! 6. [`build_edge`](LayoutBuilder::build_edge) for each edge
//! 7. [`finish`](LayoutBuilder::finish)
//!
//! Clusters come before vertices and vertices before edges, so backgrounds
//! stack behind nodes and edge geometry can use placed node bounds.
//!
//! All coordinates are engine coordinates in points with the origin at the
//! bottom left. Builders that draw top-down flip them with
//! [`Point::flip_y`](dotweave_core::geometry::Point::flip_y).

use std::error::Error;

use dotweave_core::{
    geometry::{Bounds, Point, Size},
    graph::Graph,
};
use dotweave_parser::{DotEdge, DotGraph, DotSubGraph, DotVertex};

/// Error type returned by builder callbacks.
pub type BuilderError = Box<dyn Error + Send + Sync>;

/// Consumer of a layout pass.
pub trait LayoutBuilder<G: Graph> {
    /// Called once at the beginning of a pass.
    ///
    /// This is where a builder measures its vertices, so that every later
    /// [`size`](Self::size) query can be answered.
    fn start(&mut self, graph: &G) -> Result<(), BuilderError>;

    /// Size of `vertex` in points.
    ///
    /// `None` or a non-positive size aborts the pass with
    /// [`LayoutError::InvalidSize`](crate::LayoutError::InvalidSize).
    fn size(&self, vertex: &G::Vertex) -> Option<Size>;

    /// Receives the total drawing size.
    fn build_graph(&mut self, size: Size, graph: &G, dot: &DotGraph) -> Result<(), BuilderError>;

    fn build_sub_graph(
        &mut self,
        _bounds: Bounds,
        _sub_graph: &G::SubGraph,
        _dot: &DotSubGraph,
    ) -> Result<(), BuilderError> {
        Ok(())
    }

    /// Receives a vertex center and its laid-out size in points.
    fn build_vertex(
        &mut self,
        position: Point,
        size: Size,
        vertex: &G::Vertex,
        dot: &DotVertex,
    ) -> Result<(), BuilderError>;

    /// Receives the spline control points of an edge, oriented from source to
    /// destination.
    fn build_edge(
        &mut self,
        points: &[Point],
        edge: &G::Edge,
        dot: &DotEdge,
    ) -> Result<(), BuilderError>;

    /// Called once after every build callback of a successful pass.
    fn finish(&mut self) -> Result<(), BuilderError> {
        Ok(())
    }
}
