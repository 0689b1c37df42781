//! Configuration types for dotweave layout passes.
//!
//! This module provides configuration structures that control which engine
//! lays a graph out and how the SVG builder styles it. All types implement
//! [`serde::Deserialize`] for loading from external sources, and every
//! section falls back to its defaults when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining engine and style settings.
//! - [`EngineConfig`] - Selects the [`LayoutEngine`] and how it is invoked.
//! - [`StyleConfig`] - Visual options for [`SvgBuilder`](crate::export::svg::SvgBuilder).
//!
//! # Example
//!
//! ```
//! # use dotweave::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! assert_eq!(config.engine().layout().name(), "dot");
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use dotweave_core::{color::Color, engine::LayoutEngine};

use crate::runner::{DotRunner, LoggingRunner, ProcessRunner};

const DEFAULT_FONT_FAMILY: &str = "Arial";
const DEFAULT_FONT_SIZE: f32 = 14.0;
const DEFAULT_NODE_PADDING: f32 = 8.0;

/// Top-level configuration combining engine and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Engine configuration section.
    #[serde(default)]
    engine: EngineConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified engine and style configurations.
    pub fn new(engine: EngineConfig, style: StyleConfig) -> Self {
        Self { engine, style }
    }

    /// Returns the engine configuration.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineConfig {
        &mut self.engine
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Layout engine selection and invocation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EngineConfig {
    /// [`LayoutEngine`] passed as `-K<name>`.
    #[serde(default)]
    layout: LayoutEngine,

    /// Path to the Graphviz executable. `dot` from the search path when unset.
    #[serde(default)]
    executable: Option<PathBuf>,

    /// Log engine input and output through [`LoggingRunner`].
    #[serde(default)]
    log_output: bool,
}

impl EngineConfig {
    pub fn new(layout: LayoutEngine) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> LayoutEngine {
        self.layout
    }

    pub fn set_layout(&mut self, layout: LayoutEngine) {
        self.layout = layout;
    }

    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    pub fn set_executable(&mut self, executable: impl Into<PathBuf>) {
        self.executable = Some(executable.into());
    }

    pub fn log_output(&self) -> bool {
        self.log_output
    }

    /// Builds the process runner described by this configuration.
    pub fn runner(&self) -> Box<dyn DotRunner> {
        let mut runner = ProcessRunner::new();
        if let Some(executable) = &self.executable {
            runner = runner.with_executable(executable);
        }
        if self.log_output {
            Box::new(LoggingRunner::new(runner))
        } else {
            Box::new(runner)
        }
    }
}

/// Visual styling configuration for rendered graphs.
///
/// Fields that are not set fall back to builder defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    background_color: Option<String>,

    #[serde(default)]
    node_fill_color: Option<String>,

    #[serde(default)]
    edge_color: Option<String>,

    #[serde(default)]
    cluster_fill_color: Option<String>,

    #[serde(default)]
    font_family: Option<String>,

    /// Label font size in points.
    #[serde(default)]
    font_size: Option<f32>,

    /// Space between a vertex label and its border, in points.
    #[serde(default)]
    node_padding: Option<f32>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.background_color.as_deref(), "background")
    }

    /// Vertex fill, white by default.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable color string.
    pub fn node_fill_color(&self) -> Result<Color, String> {
        Ok(parse_color(self.node_fill_color.as_deref(), "node fill")?.unwrap_or_else(white))
    }

    /// Stroke color of edges and vertex borders, black by default.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable color string.
    pub fn edge_color(&self) -> Result<Color, String> {
        Ok(parse_color(self.edge_color.as_deref(), "edge")?.unwrap_or_default())
    }

    /// Cluster background, a light gray by default.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable color string.
    pub fn cluster_fill_color(&self) -> Result<Color, String> {
        match parse_color(self.cluster_fill_color.as_deref(), "cluster fill")? {
            Some(color) => Ok(color),
            None => Color::new("#f2f2f2"),
        }
    }

    pub fn font_family(&self) -> &str {
        self.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY)
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
            .filter(|size| *size > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn node_padding(&self) -> f32 {
        self.node_padding
            .filter(|padding| *padding >= 0.0)
            .unwrap_or(DEFAULT_NODE_PADDING)
    }
}

fn parse_color(value: Option<&str>, what: &str) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {what} color in config: {err}"))
}

fn white() -> Color {
    Color::new("white").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.engine().layout(), LayoutEngine::Dot);
        assert!(config.engine().executable().is_none());
        assert_eq!(config.style().background_color(), Ok(None));
        assert_eq!(config.style().font_family(), "Arial");
        assert_eq!(config.style().font_size(), 14.0);
    }

    #[test]
    fn test_style_colors() {
        let style = StyleConfig {
            node_fill_color: Some("lightblue".to_owned()),
            edge_color: Some("not a color".to_owned()),
            ..StyleConfig::default()
        };
        assert_eq!(style.node_fill_color(), Color::new("lightblue"));
        assert!(style.edge_color().unwrap_err().contains("edge"));
    }

    #[test]
    fn test_non_positive_font_size_falls_back() {
        let style = StyleConfig {
            font_size: Some(0.0),
            node_padding: Some(-1.0),
            ..StyleConfig::default()
        };
        assert_eq!(style.font_size(), 14.0);
        assert_eq!(style.node_padding(), 8.0);
    }
}
