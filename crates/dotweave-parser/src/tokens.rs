//! Token definitions for DOT text.

use std::fmt;

use crate::span::Span;

/// A lexical token.
///
/// Keywords are case-insensitive in DOT, so `Digraph` and `DIGRAPH` both
/// produce [`Token::Digraph`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    // Keywords
    Strict,
    Graph,
    Digraph,
    Node,
    Edge,
    Subgraph,

    // IDs
    /// Unquoted alphanumeric identifier.
    Identifier(&'a str),
    /// Numeral such as `-1.5` or `.25`, kept as written.
    Numeral(&'a str),
    /// Double-quoted string with `\"`, `\\` and line continuations resolved.
    QuotedString(String),
    /// HTML-like string, without the outermost angle brackets.
    HtmlString(&'a str),

    // Operators
    DirectedEdge,
    UndirectedEdge,
    Equals,
    Colon,
    Plus,

    // Punctuation
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,

    // Trivia
    LineComment(&'a str),
    BlockComment(&'a str),
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Returns true for tokens the parser skips between meaningful tokens.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_) | Token::BlockComment(_)
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Strict => write!(f, "strict"),
            Token::Graph => write!(f, "graph"),
            Token::Digraph => write!(f, "digraph"),
            Token::Node => write!(f, "node"),
            Token::Edge => write!(f, "edge"),
            Token::Subgraph => write!(f, "subgraph"),
            Token::Identifier(id) => write!(f, "{id}"),
            Token::Numeral(n) => write!(f, "{n}"),
            Token::QuotedString(s) => write!(f, "\"{s}\""),
            Token::HtmlString(s) => write!(f, "<{s}>"),
            Token::DirectedEdge => write!(f, "->"),
            Token::UndirectedEdge => write!(f, "--"),
            Token::Equals => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::Plus => write!(f, "+"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::LineComment(_) | Token::BlockComment(_) => write!(f, "comment"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::Newline => write!(f, "newline"),
        }
    }
}

/// A token together with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'a> {
    pub token: Token<'a>,
    pub span: Span,
}

impl<'a> PositionedToken<'a> {
    pub fn new(token: Token<'a>, span: Span) -> Self {
        Self { token, span }
    }
}
