//! CLI logic for the dotweave layout tool.
//!
//! Reads a TOML graph description, lays it out with Graphviz (or replays a
//! captured layout) and writes the SVG drawing.

pub mod error_adapter;
pub mod graph_file;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use dotweave::{LayoutError, Renderer, SvgOutput, runner::StaticRunner};

use graph_file::GraphFile;

/// Run the dotweave CLI application
///
/// # Errors
///
/// Returns `LayoutError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid graph files
/// - Engine failures and unusable engine output
pub fn run(args: &Args) -> Result<(), LayoutError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing graph"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(engine) = args.engine {
        app_config.engine_mut().set_layout(engine);
    }
    if let Some(dot_path) = &args.dot_path {
        app_config.engine_mut().set_executable(dot_path);
    }

    let source = fs::read_to_string(&args.input)?;
    let loaded = GraphFile::parse(&source)?.into_graph()?;

    let renderer = Renderer::new(app_config);
    let labels = |vertex: &String| loaded.label(vertex);
    let SvgOutput { svg, engine_output } = match &args.replay_layout {
        Some(path) => {
            info!(path = path.display().to_string(); "Replaying captured layout");
            let captured = fs::read_to_string(path)?;
            renderer.render_svg_with_labels(loaded.graph(), &StaticRunner::new(captured), labels)?
        }
        None => {
            let runner = renderer.runner();
            renderer.render_svg_with_labels(loaded.graph(), runner.as_ref(), labels)?
        }
    };

    if let Some(path) = &args.save_layout {
        fs::write(path, engine_output)?;
        info!(path = path.display().to_string(); "Layout saved");
    }

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
