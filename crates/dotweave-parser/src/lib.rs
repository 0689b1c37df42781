//! # dotweave Parser
//!
//! Reader for the annotated DOT text a Graphviz layout engine writes after
//! laying out a graph. The result is a [`DotGraph`] with positions, sizes,
//! edge splines and cluster bounding boxes.
//!
//! ## Usage
//!
//! ```
//! # use dotweave_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let layout = r#"
//!         digraph {
//!             graph [bb="0,0,74,112"];
//!             Hello [pos="37,93", width="0.91667", height="0.52778"];
//!             World [pos="37,19", width="1.0278", height="0.52778"];
//!             Hello -> World [pos="e,37,38.249 37,73.943 37,66.149 37,56.954 37,48.338"];
//!         }
//!     "#;
//!
//!     let graph = parse(layout)?;
//!     assert_eq!(graph.vertex_count(), 2);
//!     assert_eq!(graph.edges()[0].destination(), "World");
//!     Ok(())
//! }
//! ```

mod build;
mod dot;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
pub mod record;
mod span;
mod tokens;
pub mod values;

pub use dot::{DotEdge, DotGraph, DotSubGraph, DotVertex};
pub use error::ParseError;
pub use span::{Location, Span, Spanned};

use log::{debug, info};

/// Parse layout engine output into a [`DotGraph`].
///
/// The pipeline runs in three steps:
///
/// 1. **Tokenize** - split the text into DOT tokens
/// 2. **Parse** - build a syntax tree from the tokens
/// 3. **Build** - apply attribute scoping, expand edges and read geometry
///
/// Each step reports every problem it finds. The returned [`ParseError`]
/// carries diagnostics resolved to line and column in `source`.
///
/// # Errors
///
/// Returns a syntax error for malformed text or attribute values, and a
/// semantic error when the text is well formed but an edge names an
/// undeclared vertex, a bounding box is missing, or an element has no
/// position.
pub fn parse(source: &str) -> Result<DotGraph, ParseError> {
    info!(bytes = source.len(); "Parsing layout output");

    let tokens = lexer::tokenize(source).map_err(|e| e.locate(source))?;
    debug!(tokens = tokens.len(); "Tokenized layout output");

    let document = parser::build_document(&tokens)
        .map_err(|diagnostic| ParseError::from(diagnostic).locate(source))?;

    build::build(document).map_err(|e| e.locate(source))
}
