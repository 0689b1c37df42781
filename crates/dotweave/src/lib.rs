//! dotweave - graph layout through Graphviz with a replayable builder protocol.
//!
//! An application exposes its data through the [`Graph`](dotweave_core::graph::Graph)
//! traits. A layout pass serializes the graph to DOT, runs a Graphviz engine,
//! parses the annotated output, matches it back to the original objects and
//! replays the geometry into a [`LayoutBuilder`].
//!
//! The pass is driven by a [`LayoutDirector`]. [`Renderer`] wraps the whole
//! pipeline for the common case of producing SVG.

pub mod builder;
pub mod config;
pub mod director;
pub mod export;
pub mod ids;
pub mod matcher;
pub mod runner;
pub mod snapshot;
pub mod writer;

mod error;

pub use dotweave_core::{attributes, color, engine, geometry, graph, notify, simple};

pub use builder::{BuilderError, LayoutBuilder};
pub use director::{DirectorState, LayoutDirector};
pub use error::LayoutError;

use std::fmt;

use log::{debug, info};

use config::AppConfig;
use export::svg::SvgBuilder;
use graph::Graph;
use runner::DotRunner;

/// Result of [`Renderer::render_svg`].
#[derive(Debug, Clone)]
pub struct SvgOutput {
    /// The rendered document.
    pub svg: String,
    /// Raw engine output, suitable for [`StaticRunner`](runner::StaticRunner).
    pub engine_output: String,
}

/// Lays graphs out and renders them to SVG.
///
/// # Examples
///
/// ```rust,no_run
/// use dotweave::{Renderer, config::AppConfig, simple::{SimpleEdge, SimpleGraph}};
///
/// let mut graph = SimpleGraph::new();
/// graph.add_vertex("Hello");
/// graph.add_vertex("World");
/// graph.add_edge(SimpleEdge::new("Hello", "World"));
///
/// let renderer = Renderer::new(AppConfig::default());
/// let runner = renderer.runner();
/// let output = renderer.render_svg(&graph, runner.as_ref())
///     .expect("Failed to render");
/// println!("{}", output.svg);
/// ```
#[derive(Debug, Default)]
pub struct Renderer {
    config: AppConfig,
}

impl Renderer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The runner described by the engine configuration.
    pub fn runner(&self) -> Box<dyn DotRunner> {
        self.config.engine().runner()
    }

    /// Runs one layout pass of `graph` into `builder`.
    ///
    /// Returns the raw engine output.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] of the pass.
    pub fn layout<G, B, R>(&self, graph: &G, builder: &mut B, runner: &R) -> Result<String, LayoutError>
    where
        G: Graph,
        B: LayoutBuilder<G> + ?Sized,
        R: DotRunner + ?Sized,
    {
        let mut director = LayoutDirector::new().with_engine(self.config.engine().layout());
        director.layout(graph, builder, runner)?;
        Ok(director.engine_output().unwrap_or_default().to_owned())
    }

    /// Renders `graph` to SVG, labelling vertices with their `Display` text.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Config`] for unusable style settings, and any
    /// error of the layout pass.
    pub fn render_svg<G, R>(&self, graph: &G, runner: &R) -> Result<SvgOutput, LayoutError>
    where
        G: Graph,
        G::Vertex: fmt::Display,
        R: DotRunner + ?Sized,
    {
        self.render_svg_with_labels(graph, runner, |vertex: &G::Vertex| vertex.to_string())
    }

    /// Renders `graph` to SVG with labels from `labels`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Config`] for unusable style settings, and any
    /// error of the layout pass.
    pub fn render_svg_with_labels<G, R>(
        &self,
        graph: &G,
        runner: &R,
        labels: impl Fn(&G::Vertex) -> String,
    ) -> Result<SvgOutput, LayoutError>
    where
        G: Graph,
        R: DotRunner + ?Sized,
    {
        info!(engine = self.config.engine().layout().name(); "Rendering graph to SVG");
        let mut builder =
            SvgBuilder::with_labels(self.config.style(), labels).map_err(LayoutError::Config)?;
        let engine_output = self.layout(graph, &mut builder, runner)?;
        let svg = builder.into_svg_string();
        debug!(bytes = svg.len(); "SVG rendered");
        Ok(SvgOutput { svg, engine_output })
    }
}
