//! Parser for DOT tokens.
//!
//! This module transforms the token stream from the [`lexer`](super::lexer)
//! into the syntax tree defined in [`parser_types`](super::parser_types). The
//! public entry point is [`build_document`].
//!
//! Trivia tokens (whitespace, newlines, comments) stay in the stream and are
//! skipped explicitly with [`ws0`] between meaningful tokens.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, preceded, repeat},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
    values,
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
}

type Input<'src> = DotTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type DotTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Skip a single trivia token
fn trivia<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.token.is_trivia())
        .void()
        .parse_next(input)
}

/// Skip zero or more trivia tokens
fn ws0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., trivia).parse_next(input)
}

/// Match one specific punctuation or keyword token and return its span
fn punct<'src>(input: &mut Input<'src>, expected: Token<'static>) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| (token.token == expected).then_some(token.span))
        .parse_next(input)
}

/// Try to match `expected` after optional trivia, rewinding on failure
fn peek_punct<'src>(input: &mut Input<'src>, expected: Token<'static>) -> bool {
    let checkpoint = input.checkpoint();
    let matched = ws0(input).and_then(|()| punct(input, expected)).is_ok();
    if !matched {
        input.reset(&checkpoint);
    }
    matched
}

/// Parse a single DOT ID token (identifier, numeral, quoted or HTML string)
fn id_atom<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(s) | Token::Numeral(s) | Token::HtmlString(s) => {
            Some(Spanned::new(s.to_string(), token.span))
        }
        Token::QuotedString(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse a quoted string token
fn quoted<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::QuotedString(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .parse_next(input)
}

/// Parse an ID, joining `"a" + "b"` concatenations of quoted strings
fn id<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    let first = id_atom.parse_next(input)?;
    let mut value = first.inner().clone();
    let mut span = first.span();

    loop {
        let checkpoint = input.checkpoint();
        let next = (ws0, |i: &mut Input<'src>| punct(i, Token::Plus), ws0, quoted)
            .map(|(_, _, _, part)| part)
            .parse_next(input);
        match next {
            Ok(part) => {
                value.push_str(part.inner());
                span = span.union(part.span());
            }
            Err(_) => {
                input.reset(&checkpoint);
                break;
            }
        }
    }

    Ok(Spanned::new(value, span))
}

/// Parse an ID naming a graph, subgraph, vertex or port
fn name_id<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    id.map(|spanned| spanned.map(|text| values::unescape_name(&text)))
        .parse_next(input)
}

/// Parse `name = value`, or a bare `name` meaning `name = true`
fn attribute<'src>(input: &mut Input<'src>) -> IResult<types::Attribute> {
    let name = id.parse_next(input)?;

    if !peek_punct(input, Token::Equals) {
        let value = Spanned::new("true".to_string(), name.span());
        return Ok(types::Attribute { name, value });
    }

    ws0.parse_next(input)?;
    let value = cut_err(id)
        .context(Context::Label("attribute value"))
        .parse_next(input)?;

    Ok(types::Attribute { name, value })
}

/// Parse attributes separated by optional `,` or `;`
fn a_list<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attribute>> {
    repeat(
        0..,
        (
            attribute,
            ws0,
            opt(alt((
                |i: &mut Input<'src>| punct(i, Token::Comma),
                |i: &mut Input<'src>| punct(i, Token::Semicolon),
            ))),
            ws0,
        )
            .map(|(attr, _, _, _)| attr),
    )
    .parse_next(input)
}

/// Parse one `[ ... ]` block
fn bracketed_attributes<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attribute>> {
    punct(input, Token::LeftBracket)?;
    cut_err((
        ws0,
        a_list,
        ws0,
        (|i: &mut Input<'src>| punct(i, Token::RightBracket))
            .context(Context::Label("`]` closing the attribute list")),
    ))
    .map(|(_, attrs, _, _)| attrs)
    .parse_next(input)
}

/// Parse one or more consecutive `[ ... ]` blocks into a flat list
fn attr_list<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attribute>> {
    let blocks: Vec<Vec<types::Attribute>> =
        repeat(1.., preceded(ws0, bracketed_attributes)).parse_next(input)?;
    Ok(blocks.into_iter().flatten().collect())
}

/// Parse an optional attribute list, rewinding trailing trivia when absent
fn opt_attr_list<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attribute>> {
    let checkpoint = input.checkpoint();
    match attr_list.parse_next(input) {
        Ok(attrs) => Ok(attrs),
        Err(ErrMode::Backtrack(_)) => {
            input.reset(&checkpoint);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Parse `id`, `id:port` or `id:port:compass`
fn node_ref<'src>(input: &mut Input<'src>) -> IResult<types::NodeRef> {
    let id = name_id.parse_next(input)?;

    let mut suffixes = Vec::with_capacity(2);
    while suffixes.len() < 2 && peek_punct(input, Token::Colon) {
        ws0.parse_next(input)?;
        let part = cut_err(id_atom)
            .context(Context::Label("port name"))
            .parse_next(input)?;
        suffixes.push(part.map(|text| values::unescape_name(&text)));
    }

    let mut suffixes = suffixes.into_iter();
    Ok(types::NodeRef {
        id,
        port: suffixes.next(),
        compass: suffixes.next(),
    })
}

/// Parse `subgraph [name] { ... }` or an anonymous `{ ... }`
fn subgraph<'src>(input: &mut Input<'src>) -> IResult<types::Subgraph> {
    let start = input.checkpoint();
    let keyword = opt(|i: &mut Input<'src>| punct(i, Token::Subgraph)).parse_next(input)?;

    let name = match keyword {
        Some(_) => {
            ws0.parse_next(input)?;
            opt(name_id).parse_next(input)?
        }
        None => None,
    };

    let open = if keyword.is_some() {
        ws0.parse_next(input)?;
        cut_err(|i: &mut Input<'src>| punct(i, Token::LeftBrace))
            .context(Context::Label("`{` opening the subgraph body"))
            .parse_next(input)?
    } else {
        match punct(input, Token::LeftBrace) {
            Ok(span) => span,
            Err(e) => {
                input.reset(&start);
                return Err(e);
            }
        }
    };

    let (stmts, close) = cut_err((
        stmt_list,
        (|i: &mut Input<'src>| punct(i, Token::RightBrace))
            .context(Context::Label("`}` closing the subgraph")),
    ))
    .parse_next(input)?;

    let span = keyword.or(name.as_ref().map(Spanned::span)).unwrap_or(open);
    Ok(types::Subgraph {
        name,
        stmts,
        span: span.union(close),
    })
}

/// Parse an edge operator, returning `true` for `->`
fn edge_op<'src>(input: &mut Input<'src>) -> IResult<Spanned<bool>> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::DirectedEdge => Some(Spanned::new(true, token.span)),
        Token::UndirectedEdge => Some(Spanned::new(false, token.span)),
        _ => None,
    })
    .parse_next(input)
}

fn edge_operand<'src>(input: &mut Input<'src>) -> IResult<types::EdgeOperand> {
    alt((
        subgraph.map(types::EdgeOperand::Subgraph),
        node_ref.map(types::EdgeOperand::Node),
    ))
    .context(Context::Label("edge target"))
    .parse_next(input)
}

/// Parse the `-> b -> c` tail of an edge statement and its attributes
fn edge_rest<'src>(
    input: &mut Input<'src>,
    first: types::EdgeOperand,
) -> IResult<types::EdgeStmt> {
    let mut operands = vec![first];
    let mut operators = Vec::new();

    loop {
        let checkpoint = input.checkpoint();
        ws0.parse_next(input)?;
        match edge_op.parse_next(input) {
            Ok(op) => {
                operators.push(op);
                ws0.parse_next(input)?;
                operands.push(cut_err(edge_operand).parse_next(input)?);
            }
            Err(_) => {
                input.reset(&checkpoint);
                break;
            }
        }
    }

    let attrs = opt_attr_list.parse_next(input)?;
    Ok(types::EdgeStmt {
        operands,
        operators,
        attrs,
    })
}

/// Parse `graph [...]`, `node [...]` or `edge [...]`
fn attr_stmt<'src>(input: &mut Input<'src>) -> IResult<types::Stmt> {
    let target = any
        .verify_map(|token: &PositionedToken<'_>| match token.token {
            Token::Graph => Some(types::AttrTarget::Graph),
            Token::Node => Some(types::AttrTarget::Node),
            Token::Edge => Some(types::AttrTarget::Edge),
            _ => None,
        })
        .parse_next(input)?;

    let attrs = cut_err(attr_list)
        .context(Context::Label("attribute list"))
        .parse_next(input)?;

    Ok(types::Stmt::Attr(types::AttrStmt { target, attrs }))
}

/// Parse a subgraph statement or an edge statement starting with a subgraph
fn subgraph_stmt<'src>(input: &mut Input<'src>) -> IResult<types::Stmt> {
    let subgraph = subgraph.parse_next(input)?;

    let checkpoint = input.checkpoint();
    ws0.parse_next(input)?;
    let has_edge = edge_op.parse_next(input).is_ok();
    input.reset(&checkpoint);

    if has_edge {
        edge_rest(input, types::EdgeOperand::Subgraph(subgraph)).map(types::Stmt::Edge)
    } else {
        Ok(types::Stmt::Subgraph(subgraph))
    }
}

/// Parse a node statement, an edge statement or a graph attribute assignment
fn node_stmt<'src>(input: &mut Input<'src>) -> IResult<types::Stmt> {
    let node = node_ref.parse_next(input)?;

    if node.port.is_none() && peek_punct(input, Token::Equals) {
        ws0.parse_next(input)?;
        let value = cut_err(id)
            .context(Context::Label("attribute value"))
            .parse_next(input)?;
        return Ok(types::Stmt::Assign(types::Attribute {
            name: node.id,
            value,
        }));
    }

    let checkpoint = input.checkpoint();
    ws0.parse_next(input)?;
    let has_edge = edge_op.parse_next(input).is_ok();
    input.reset(&checkpoint);

    if has_edge {
        return edge_rest(input, types::EdgeOperand::Node(node)).map(types::Stmt::Edge);
    }

    let attrs = opt_attr_list.parse_next(input)?;
    Ok(types::Stmt::Node(types::NodeStmt { node, attrs }))
}

fn stmt<'src>(input: &mut Input<'src>) -> IResult<types::Stmt> {
    alt((attr_stmt, subgraph_stmt, node_stmt))
        .context(Context::Label("statement"))
        .parse_next(input)
}

/// Parse statements separated by optional semicolons, up to the closing brace
fn stmt_list<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Stmt>> {
    let stmts = repeat(
        0..,
        (
            ws0,
            stmt,
            ws0,
            opt(|i: &mut Input<'src>| punct(i, Token::Semicolon)),
        )
            .map(|(_, stmt, _, _)| stmt),
    )
    .parse_next(input)?;
    ws0.parse_next(input)?;
    Ok(stmts)
}

/// Parse a complete document: `[strict] (graph|digraph) [id] { ... }`
fn document<'src>(input: &mut Input<'src>) -> IResult<types::Document> {
    ws0.parse_next(input)?;
    let strict = opt(|i: &mut Input<'src>| punct(i, Token::Strict))
        .parse_next(input)?
        .is_some();
    ws0.parse_next(input)?;

    let (directed, keyword) = any
        .verify_map(|token: &PositionedToken<'_>| match token.token {
            Token::Digraph => Some((true, token.span)),
            Token::Graph => Some((false, token.span)),
            _ => None,
        })
        .context(Context::Label("`graph` or `digraph`"))
        .parse_next(input)?;

    ws0.parse_next(input)?;
    let id = opt(name_id).parse_next(input)?;
    ws0.parse_next(input)?;

    let stmts = preceded(
        (|i: &mut Input<'src>| punct(i, Token::LeftBrace)).context(Context::Label("`{`")),
        cut_err((
            stmt_list,
            (|i: &mut Input<'src>| punct(i, Token::RightBrace))
                .context(Context::Label("`}` closing the graph")),
        ))
        .map(|(stmts, _)| stmts),
    )
    .parse_next(input)?;

    ws0.parse_next(input)?;
    if !input.is_empty() {
        let mut e = ContextError::new();
        e.push(Context::Label("end of input"));
        return Err(ErrMode::Cut(e));
    }

    Ok(types::Document {
        strict,
        directed,
        keyword,
        id,
        stmts,
    })
}

/// Convert a winnow error to a diagnostic pointing at the offending token.
///
/// The innermost context label becomes the "expected" part of the message.
/// Running out of tokens is reported as incomplete input.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let expected = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
        }),
        ErrMode::Incomplete(_) => None,
    };

    let position = tokens.len().saturating_sub(current_remaining);
    let offending = tokens[position.min(tokens.len())..]
        .iter()
        .find(|t| !t.token.is_trivia());

    match offending {
        Some(token) => {
            let message = match expected {
                Some(label) => format!("unexpected `{}`, expected {label}", token.token),
                None => format!("unexpected `{}`", token.token),
            };
            Diagnostic::new(ErrorCode::E100, message)
                .with_label(token.span, ErrorCode::E100.description())
                .with_help("check the statement syntax near this token")
        }
        None => {
            let end = tokens.last().map(|t| t.span.end()).unwrap_or_default();
            let message = match expected {
                Some(label) => format!("unexpected end of input, expected {label}"),
                None => "unexpected end of input".to_string(),
            };
            Diagnostic::new(ErrorCode::E101, message)
                .with_label(Span::new(end..end), ErrorCode::E101.description())
                .with_help("ensure the graph body is closed with `}`")
        }
    }
}

/// Build a syntax tree from tokens.
///
/// # Errors
///
/// Returns an `E100` diagnostic for an unexpected token and `E101` when the
/// tokens end before the graph is complete.
pub fn build_document<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::Document, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    document
        .parse_next(&mut token_slice)
        .map_err(|e| convert_error(e, tokens, token_slice.eof_offset()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(input: &str) -> types::Document {
        let tokens = tokenize(input).expect("Failed to tokenize input");
        build_document(&tokens).unwrap_or_else(|d| panic!("failed to parse {input:?}: {d}"))
    }

    fn parse_err(input: &str) -> Diagnostic {
        let tokens = tokenize(input).expect("Failed to tokenize input");
        build_document(&tokens).expect_err("expected a parse error")
    }

    fn only_stmt(input: &str) -> types::Stmt {
        let mut doc = parse(input);
        assert_eq!(doc.stmts.len(), 1, "expected one statement in {input:?}");
        doc.stmts.remove(0)
    }

    #[test]
    fn test_header() {
        let doc = parse("strict digraph G {}");
        assert!(doc.strict);
        assert!(doc.directed);
        assert_eq!(doc.id.unwrap().inner(), "G");

        let doc = parse("graph { }");
        assert!(!doc.strict);
        assert!(!doc.directed);
        assert!(doc.id.is_none());
    }

    #[test]
    fn test_attr_stmt() {
        let types::Stmt::Attr(stmt) = only_stmt(r#"digraph { node [label="\N", shape=record]; }"#)
        else {
            panic!("expected attribute statement");
        };
        assert_eq!(stmt.target, types::AttrTarget::Node);
        let pairs: Vec<_> = stmt
            .attrs
            .iter()
            .map(|a| (a.name.inner().as_str(), a.value.inner().as_str()))
            .collect();
        assert_eq!(pairs, [("label", r"\N"), ("shape", "record")]);
    }

    #[test]
    fn test_multiple_attribute_blocks() {
        let types::Stmt::Node(stmt) = only_stmt("digraph { a [x=1; y=2] [z=3 w] }") else {
            panic!("expected node statement");
        };
        let names: Vec<_> = stmt.attrs.iter().map(|a| a.name.inner().as_str()).collect();
        assert_eq!(names, ["x", "y", "z", "w"]);
        assert_eq!(stmt.attrs[3].value.inner(), "true");
    }

    #[test]
    fn test_node_with_port_and_compass() {
        let types::Stmt::Edge(stmt) = only_stmt("digraph { 14:left:s -> 7:n }") else {
            panic!("expected edge statement");
        };
        let types::EdgeOperand::Node(source) = &stmt.operands[0] else {
            panic!("expected node operand");
        };
        assert_eq!(source.id.inner(), "14");
        assert_eq!(source.port.as_ref().unwrap().inner(), "left");
        assert_eq!(source.compass.as_ref().unwrap().inner(), "s");

        let types::EdgeOperand::Node(target) = &stmt.operands[1] else {
            panic!("expected node operand");
        };
        assert_eq!(target.port.as_ref().unwrap().inner(), "n");
        assert!(target.compass.is_none());
    }

    #[test]
    fn test_edge_chain_with_subgraph() {
        let types::Stmt::Edge(stmt) = only_stmt("digraph { a -> {b c} -> d [color=red] }") else {
            panic!("expected edge statement");
        };
        assert_eq!(stmt.operands.len(), 3);
        assert_eq!(stmt.operators.len(), 2);
        assert!(stmt.operators.iter().all(|op| *op.inner()));
        assert!(matches!(stmt.operands[1], types::EdgeOperand::Subgraph(_)));
        assert_eq!(stmt.attrs.len(), 1);
    }

    #[test]
    fn test_edge_starting_with_subgraph() {
        let types::Stmt::Edge(stmt) = only_stmt("graph { subgraph s { a b } -- c }") else {
            panic!("expected edge statement");
        };
        assert!(!*stmt.operators[0].inner());
        let types::EdgeOperand::Subgraph(sub) = &stmt.operands[0] else {
            panic!("expected subgraph operand");
        };
        assert_eq!(sub.name.as_ref().unwrap().inner(), "s");
        assert_eq!(sub.stmts.len(), 2);
    }

    #[test]
    fn test_assignment() {
        let types::Stmt::Assign(attr) = only_stmt("digraph { rankdir = LR }") else {
            panic!("expected assignment");
        };
        assert_eq!(attr.name.inner(), "rankdir");
        assert_eq!(attr.value.inner(), "LR");
    }

    #[test]
    fn test_nested_subgraph() {
        let types::Stmt::Subgraph(outer) = only_stmt(
            "digraph { subgraph cluster_0 { graph [bb=\"1,2,3,4\"]; subgraph inner { x } } }",
        ) else {
            panic!("expected subgraph");
        };
        assert_eq!(outer.name.as_ref().unwrap().inner(), "cluster_0");
        assert_eq!(outer.stmts.len(), 2);
        assert!(matches!(outer.stmts[1], types::Stmt::Subgraph(_)));
    }

    #[test]
    fn test_string_concatenation() {
        let types::Stmt::Node(stmt) = only_stmt(r#"digraph { a [label="left" + " right"] }"#)
        else {
            panic!("expected node statement");
        };
        assert_eq!(stmt.attrs[0].value.inner(), "left right");
    }

    #[test]
    fn test_statements_without_semicolons() {
        let doc = parse("digraph {\n a\n b -> c\n graph [bb=\"0,0,1,1\"]\n}");
        assert_eq!(doc.stmts.len(), 3);
    }

    #[test]
    fn test_missing_closing_brace() {
        let diag = parse_err("digraph { a -> b;");
        assert_eq!(diag.code(), ErrorCode::E101);
    }

    #[test]
    fn test_unexpected_token_in_attributes() {
        let diag = parse_err("digraph { a [label=] }");
        assert_eq!(diag.code(), ErrorCode::E100);
        assert!(diag.message().contains("`]`"), "{}", diag.message());
        assert_eq!(diag.span(), Span::new(19..20));
    }

    #[test]
    fn test_dangling_edge_operator() {
        let diag = parse_err("digraph { a -> ; }");
        assert_eq!(diag.code(), ErrorCode::E100);
        assert!(diag.message().contains("`;`"), "{}", diag.message());
    }

    #[test]
    fn test_trailing_tokens() {
        let diag = parse_err("digraph { } extra");
        assert_eq!(diag.code(), ErrorCode::E100);
        assert!(diag.message().contains("extra"));
    }

    #[test]
    fn test_missing_header() {
        let diag = parse_err("{ a }");
        assert_eq!(diag.code(), ErrorCode::E100);
    }
}
