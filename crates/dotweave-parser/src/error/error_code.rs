//! Error codes for DOT diagnostics.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser and value errors
//! - `E2xx` - Semantic errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A quoted string was opened but never closed.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that does not start any DOT token.
    E002,

    /// Unterminated HTML string.
    ///
    /// An HTML-like label `<...>` has unbalanced angle brackets.
    E003,

    /// Unterminated block comment.
    ///
    /// A `/*` comment was never closed with `*/`.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before the graph body was closed.
    E101,

    /// Invalid attribute value.
    ///
    /// A position, size, bounding box or spline value could not be read.
    E102,

    /// Edge operator does not match the graph kind.
    ///
    /// `->` is only valid in a `digraph` and `--` only in a `graph`.
    E103,

    /// Invalid record label.
    ///
    /// A record-shaped vertex has a label with unbalanced braces or ports.
    E104,

    // =========================================================================
    // Semantic Errors (E2xx)
    // =========================================================================
    /// Undeclared vertex.
    ///
    /// An edge references a vertex id that no node statement declares.
    E200,

    /// Missing bounding box.
    ///
    /// The graph or a cluster has no `bb` attribute, so positions cannot be
    /// converted between coordinate systems.
    E201,

    /// Missing layout position.
    ///
    /// A vertex or edge has no `pos` attribute. The input was probably not
    /// produced by a layout engine.
    E202,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "unterminated HTML string",
            ErrorCode::E004 => "unterminated block comment",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "invalid attribute value",
            ErrorCode::E103 => "mismatched edge operator",
            ErrorCode::E104 => "invalid record label",
            ErrorCode::E200 => "undeclared vertex",
            ErrorCode::E201 => "missing bounding box",
            ErrorCode::E202 => "missing layout position",
        }
    }

    /// Returns true for codes reporting inconsistent but well-formed input.
    pub fn is_semantic(&self) -> bool {
        matches!(self, ErrorCode::E200 | ErrorCode::E201 | ErrorCode::E202)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
