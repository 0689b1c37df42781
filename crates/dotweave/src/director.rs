//! The layout pass state machine.
//!
//! A [`LayoutDirector`] drives one pass through its stages:
//!
//! ```text
//! Idle -> Starting -> WaitingForEngine -> Building -> Done
//!                     (any stage may end in Failed)
//! ```
//!
//! Each stage is a separate method taking `&mut self`, so a caller can keep
//! the blocking engine call wherever it likes. [`LayoutDirector::layout`] runs
//! all three in sequence.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use log::{debug, info, warn};

use dotweave_core::{
    engine::LayoutEngine,
    graph::{Graph, SubGraph},
    notify::{ChangeNotifier, SubscriptionId},
};
use dotweave_parser::DotGraph;

use crate::{
    builder::LayoutBuilder, error::LayoutError, matcher, runner::DotRunner, writer::DotWriter,
};

/// Stage of a [`LayoutDirector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectorState {
    Idle,
    Starting,
    WaitingForEngine,
    Building,
    Done,
    Failed,
}

impl fmt::Display for DirectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::WaitingForEngine => "waiting for the engine",
            Self::Building => "building",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one layout pass of a graph into a [`LayoutBuilder`].
///
/// The graph is borrowed for the whole pass and enumerated once at
/// [`start`](Self::start). Change notifications received afterwards are
/// logged but do not affect the pass. A finished or failed director must be
/// [`reset`](Self::reset) before it serves another pass.
///
/// # Example
///
/// ```no_run
/// # use dotweave::{LayoutDirector, runner::ProcessRunner};
/// # fn run<G: dotweave_core::graph::Graph, B: dotweave::LayoutBuilder<G>>(graph: &G, builder: &mut B)
/// # -> Result<(), dotweave::LayoutError> {
/// let mut director = LayoutDirector::new();
/// director.start(graph, builder)?;
/// director.run_engine(builder, &ProcessRunner::new())?;
/// director.build_graph(builder)?;
/// # Ok(())
/// # }
/// ```
pub struct LayoutDirector<'g, G: Graph> {
    state: DirectorState,
    engine: LayoutEngine,
    writer: Option<DotWriter<'g, G>>,
    output: Option<String>,
    dot: Option<DotGraph>,
    changed: Arc<AtomicBool>,
    subscriptions: Vec<(&'g ChangeNotifier, SubscriptionId)>,
}

impl<G: Graph> Default for LayoutDirector<'_, G> {
    fn default() -> Self {
        Self {
            state: DirectorState::Idle,
            engine: LayoutEngine::default(),
            writer: None,
            output: None,
            dot: None,
            changed: Arc::new(AtomicBool::new(false)),
            subscriptions: Vec::new(),
        }
    }
}

impl<'g, G: Graph> LayoutDirector<'g, G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the layout algorithm passed to the runner.
    pub fn with_engine(mut self, engine: LayoutEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    pub fn state(&self) -> DirectorState {
        self.state
    }

    /// Whether the graph signalled a change since [`start`](Self::start).
    pub fn graph_changed(&self) -> bool {
        self.changed.load(Ordering::SeqCst)
    }

    /// Raw engine output of the current pass, once the engine has run.
    pub fn engine_output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Parsed engine output of a finished pass.
    pub fn engine_graph(&self) -> Option<&DotGraph> {
        self.dot.as_ref()
    }

    /// Begins a pass: lets the builder measure, then snapshots the graph.
    ///
    /// # Errors
    ///
    /// Fails with [`LayoutError::InvalidState`] unless the director is idle,
    /// and with [`LayoutError::Builder`] or [`LayoutError::Graph`] when the
    /// builder or the graph reject the pass.
    pub fn start<B>(&mut self, graph: &'g G, builder: &mut B) -> Result<(), LayoutError>
    where
        B: LayoutBuilder<G> + ?Sized,
    {
        self.expect_state(DirectorState::Idle, "start")?;
        self.state = DirectorState::Starting;
        info!(engine = self.engine.name(); "Layout pass started");

        if let Err(err) = builder.start(graph) {
            return Err(self.fail(LayoutError::Builder(err)));
        }
        let writer = match DotWriter::new(graph) {
            Ok(writer) => writer,
            Err(err) => return Err(self.fail(err)),
        };

        self.subscribe(graph.notifier());
        for entry in &writer.snapshot().sub_graphs {
            self.subscribe(entry.sub_graph.notifier());
        }
        self.writer = Some(writer);
        Ok(())
    }

    /// Serializes the snapshot with the builder's sizes and runs the engine.
    ///
    /// # Errors
    ///
    /// Fails with [`LayoutError::InvalidSize`] before the engine is invoked
    /// when the builder cannot size a vertex, and with [`LayoutError::Engine`]
    /// when the runner fails.
    pub fn run_engine<B, R>(&mut self, builder: &B, runner: &R) -> Result<(), LayoutError>
    where
        B: LayoutBuilder<G> + ?Sized,
        R: DotRunner + ?Sized,
    {
        self.expect_state(DirectorState::Starting, "run the engine")?;
        let input = match self.writer.as_ref().map(|writer| writer.write(|v| builder.size(v))) {
            Some(Ok(input)) => input,
            Some(Err(err)) => return Err(self.fail(err)),
            None => return Err(self.fail(self.invalid_state("run the engine"))),
        };

        self.state = DirectorState::WaitingForEngine;
        match runner.run(&input, self.engine) {
            Ok(output) => {
                info!(bytes = output.len(); "Layout engine finished");
                self.output = Some(output);
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Parses and matches the engine output, then replays it into `builder`.
    ///
    /// No build callback fires unless parsing and matching both succeed.
    ///
    /// # Errors
    ///
    /// Fails with [`LayoutError::Parse`] for malformed or inconsistent output,
    /// with an unmatched error when the output does not describe the
    /// snapshot, and with [`LayoutError::Builder`] when a callback fails.
    pub fn build_graph<B>(&mut self, builder: &mut B) -> Result<(), LayoutError>
    where
        B: LayoutBuilder<G> + ?Sized,
    {
        self.expect_state(DirectorState::WaitingForEngine, "build the graph")?;
        self.state = DirectorState::Building;

        let (Some(writer), Some(output)) = (self.writer.as_ref(), self.output.as_deref()) else {
            return Err(self.fail(self.invalid_state("build the graph")));
        };
        if self.changed.load(Ordering::SeqCst) {
            warn!("Graph changed during the layout pass, replaying the snapshot taken at start");
        }

        let result = dotweave_parser::parse(output)
            .map_err(|err| LayoutError::new_parse_error(err, output))
            .and_then(|dot| {
                replay(writer, &dot, builder)?;
                Ok(dot)
            });

        match result {
            Ok(dot) => {
                self.dot = Some(dot);
                self.state = DirectorState::Done;
                self.unsubscribe();
                builder.finish().map_err(|err| self.fail(LayoutError::Builder(err)))?;
                info!("Layout pass finished");
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Runs a whole pass.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub fn layout<B, R>(&mut self, graph: &'g G, builder: &mut B, runner: &R) -> Result<(), LayoutError>
    where
        B: LayoutBuilder<G> + ?Sized,
        R: DotRunner + ?Sized,
    {
        self.start(graph, builder)?;
        self.run_engine(builder, runner)?;
        self.build_graph(builder)
    }

    /// Returns to [`DirectorState::Idle`], dropping the state of the last pass.
    pub fn reset(&mut self) {
        self.unsubscribe();
        self.state = DirectorState::Idle;
        self.writer = None;
        self.output = None;
        self.dot = None;
        self.changed.store(false, Ordering::SeqCst);
    }

    fn expect_state(&self, expected: DirectorState, operation: &'static str) -> Result<(), LayoutError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> LayoutError {
        LayoutError::InvalidState {
            operation,
            state: self.state,
        }
    }

    fn fail(&mut self, err: LayoutError) -> LayoutError {
        debug!(state:% = self.state, err:%; "Layout pass failed");
        self.state = DirectorState::Failed;
        self.unsubscribe();
        err
    }

    fn subscribe(&mut self, notifier: Option<&'g ChangeNotifier>) {
        if let Some(notifier) = notifier {
            let changed = Arc::clone(&self.changed);
            let id = notifier.subscribe(move || changed.store(true, Ordering::SeqCst));
            self.subscriptions.push((notifier, id));
        }
    }

    fn unsubscribe(&mut self) {
        for (notifier, id) in self.subscriptions.drain(..) {
            notifier.unsubscribe(id);
        }
    }
}

impl<G: Graph> Drop for LayoutDirector<'_, G> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Issues every build callback for a matched engine graph.
fn replay<G, B>(writer: &DotWriter<'_, G>, dot: &DotGraph, builder: &mut B) -> Result<(), LayoutError>
where
    G: Graph,
    B: LayoutBuilder<G> + ?Sized,
{
    let matched = matcher::match_graph(writer.snapshot(), writer.ids(), dot)?;
    let graph = writer.graph();

    builder
        .build_graph(dot.bounds().to_size(), graph, dot)
        .map_err(LayoutError::Builder)?;
    for (sub_graph, cluster) in &matched.sub_graphs {
        builder
            .build_sub_graph(cluster.bounds(), sub_graph, cluster)
            .map_err(LayoutError::Builder)?;
    }
    for (vertex, dot_vertex) in &matched.vertices {
        builder
            .build_vertex(dot_vertex.position(), dot_vertex.size(), vertex, dot_vertex)
            .map_err(LayoutError::Builder)?;
    }
    for (edge, dot_edge) in &matched.edges {
        builder
            .build_edge(dot_edge.points(), edge, dot_edge)
            .map_err(LayoutError::Builder)?;
    }
    debug!(
        sub_graphs = matched.sub_graphs.len(),
        vertices = matched.vertices.len(),
        edges = matched.edges.len();
        "Layout replayed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(DirectorState::WaitingForEngine.to_string(), "waiting for the engine");
        assert_eq!(DirectorState::Failed.to_string(), "failed");
    }
}
