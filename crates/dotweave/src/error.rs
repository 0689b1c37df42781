//! Error types for layout passes.
//!
//! This module provides the main error type [`LayoutError`] which wraps
//! every way a layout pass can abort. Errors are returned synchronously from
//! the [`LayoutDirector`](crate::LayoutDirector) step that hit them, and no
//! replay callback fires after one.

use std::io;

use thiserror::Error;

use dotweave_core::geometry::Size;
use dotweave_parser::ParseError;

use crate::{builder::BuilderError, director::DirectorState, runner::EngineError};

/// The main error type for layout passes.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the engine output next to the structured
/// diagnostics, so callers can render source snippets.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    /// A vertex did not survive the round trip through the engine.
    #[error("vertex `{id}` does not match any vertex of the graph")]
    UnmatchedVertex { id: String },

    #[error("cluster `{name}` does not match any sub-graph of the graph")]
    UnmatchedSubGraph { name: String },

    #[error("edge `{from}` -> `{to}` does not match any edge of the graph")]
    UnmatchedEdge { from: String, to: String },

    #[error("layout engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("builder reported invalid size {size:?} for vertex {vertex}")]
    InvalidSize { vertex: String, size: Option<Size> },

    /// The graph breaks a serialization contract.
    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("cannot {operation} while the director is {state}")]
    InvalidState {
        operation: &'static str,
        state: DirectorState,
    },

    #[error("builder error: {0}")]
    Builder(#[source] BuilderError),
}

impl LayoutError {
    /// Create a new `Parse` error with the associated engine output.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
