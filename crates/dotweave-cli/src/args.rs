//! Command-line argument definitions for the dotweave CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, engine selection,
//! configuration file selection, captured layouts and logging verbosity.

use std::path::PathBuf;

use clap::Parser;

use dotweave::engine::LayoutEngine;

/// Command-line arguments for the dotweave layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input graph description (TOML)
    #[arg(help = "Path to the input graph file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Layout engine (dot, neato, fdp, sfdp, twopi, circo)
    #[arg(short, long)]
    pub engine: Option<LayoutEngine>,

    /// Path to the Graphviz executable
    #[arg(long)]
    pub dot_path: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write the engine output here for later `--replay-layout` runs
    #[arg(long)]
    pub save_layout: Option<PathBuf>,

    /// Replay engine output captured by `--save-layout` instead of running Graphviz
    #[arg(long)]
    pub replay_layout: Option<PathBuf>,
}
