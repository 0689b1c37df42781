//! Error and diagnostic system for the DOT parser.
//!
//! This module provides:
//! - Error codes for documentation and searchability
//! - A [`Diagnostic`] type carrying a message, source span, line/column and help
//! - A diagnostic collector for accumulating multiple errors in one pass
//!
//! # Overview
//!
//! Every failure while reading layout output is a [`Diagnostic`]. Diagnostics
//! fall into two kinds, reported by [`Diagnostic::kind`]:
//!
//! - [`DiagnosticKind::Syntax`] - the text is malformed (`E0xx`, `E1xx`)
//! - [`DiagnosticKind::Semantic`] - the text is well formed but inconsistent,
//!   e.g. an edge names an undeclared vertex (`E2xx`)
//!
//! One or more diagnostics are wrapped in [`ParseError`] when returned from
//! [`parse`](crate::parse).
//!
//! # Example
//!
//! ```
//! # use dotweave_parser::error::{Diagnostic, DiagnosticKind, ErrorCode};
//! # use dotweave_parser::Span;
//! let diag = Diagnostic::new(ErrorCode::E200, "edge references undeclared vertex `x`")
//!     .with_label(Span::new(40..41), "not declared")
//!     .with_help("declare the vertex before the layout engine output is parsed");
//!
//! assert_eq!(diag.kind(), DiagnosticKind::Semantic);
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error_code::ErrorCode;
pub use parse_error::ParseError;
