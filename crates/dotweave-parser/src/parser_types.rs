//! Syntax tree produced by the parser.
//!
//! The tree mirrors the DOT grammar closely. Attribute scoping, edge
//! expansion and value interpretation happen later in
//! [`build`](super::build).

use crate::span::{Span, Spanned};

/// A complete DOT document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub strict: bool,
    pub directed: bool,
    /// Span of the `graph` or `digraph` keyword.
    pub keyword: Span,
    pub id: Option<Spanned<String>>,
    pub stmts: Vec<Stmt>,
}

/// One statement inside a graph or subgraph body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `graph [...]`, `node [...]` or `edge [...]`
    Attr(AttrStmt),
    /// `id [...]`
    Node(NodeStmt),
    /// `a -> b -> {c d} [...]`
    Edge(EdgeStmt),
    /// `id = id`, a graph attribute
    Assign(Attribute),
    Subgraph(Subgraph),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTarget {
    Graph,
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrStmt {
    pub target: AttrTarget,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStmt {
    pub node: NodeRef,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStmt {
    /// At least two operands.
    pub operands: Vec<EdgeOperand>,
    /// Operator spans, one per operand pair, with `true` for `->`.
    pub operators: Vec<Spanned<bool>>,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeOperand {
    Node(NodeRef),
    Subgraph(Subgraph),
}

/// A node id with an optional `:port` and `:compass` suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    pub id: Spanned<String>,
    pub port: Option<Spanned<String>>,
    pub compass: Option<Spanned<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subgraph {
    pub name: Option<Spanned<String>>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `name = value`; both sides are DOT IDs.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Spanned<String>,
    pub value: Spanned<String>,
}
