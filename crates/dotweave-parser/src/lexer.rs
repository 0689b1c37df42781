//! Lexical analyzer for DOT text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! It handles whitespace, the three DOT comment forms, quoted and HTML
//! strings, numerals, identifiers, keywords and punctuation.
//!
//! The public entry point is [`tokenize`], which recovers from errors and
//! collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, delimited, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide error messages with
/// codes, help text and the span start.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// A piece of quoted string content.
#[derive(Debug, Clone, Copy)]
enum Fragment<'a> {
    Literal(&'a str),
    Unescaped(char),
    /// An escape DOT leaves to attribute interpretation, such as `\N`, `\l` or `\\`.
    Kept(char),
    /// Backslash-newline, which joins lines and produces nothing.
    Continuation,
}

fn string_fragment<'a>(input: &mut Input<'a>) -> IResult<Fragment<'a>> {
    alt((
        take_while(1.., |c: char| c != '"' && c != '\\').map(Fragment::Literal),
        preceded(
            '\\',
            alt((
                '"'.value(Fragment::Unescaped('"')),
                literal("\r\n").value(Fragment::Continuation),
                '\n'.value(Fragment::Continuation),
                any.map(Fragment::Kept),
            )),
        ),
    ))
    .parse_next(input)
}

/// Parse a double-quoted string.
///
/// Only `\"` and line continuations are resolved here. Every other escape,
/// `\\` included, is kept verbatim because its meaning depends on the
/// attribute.
fn quoted_string<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    let content = repeat(0.., string_fragment).fold(String::new, |mut acc, fragment| {
        match fragment {
            Fragment::Literal(s) => acc.push_str(s),
            Fragment::Unescaped(c) => acc.push(c),
            Fragment::Kept(c) => {
                acc.push('\\');
                acc.push(c);
            }
            Fragment::Continuation => {}
        }
        acc
    });

    preceded(
        '"',
        cut_err(terminated(content, '"')).context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        }),
    )
    .map(Token::QuotedString)
    .parse_next(input)
}

/// Balanced content of an HTML string.
fn html_body(input: &mut Input<'_>) -> IResult<()> {
    repeat(
        0..,
        alt((
            take_while(1.., |c: char| c != '<' && c != '>').void(),
            delimited('<', html_body, '>').void(),
        )),
    )
    .parse_next(input)
}

/// Parse an HTML-like string `<...>` with nested angle brackets.
fn html_string<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    preceded(
        '<',
        cut_err(terminated(html_body.take(), '>')).context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated HTML string",
            help: Some("balance every `<` with a `>`"),
            start,
        }),
    )
    .map(Token::HtmlString)
    .parse_next(input)
}

/// Parse a numeral: `[-]?(.[0-9]+|[0-9]+(.[0-9]*)?)`
fn numeral<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        opt('-'),
        alt((('.', digit1).void(), (digit1, opt(('.', digit0))).void())),
    )
        .take()
        .map(Token::Numeral)
        .parse_next(input)
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

/// Parse identifiers and keywords. Keywords are case-insensitive.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (take_while(1, is_id_start), take_while(0.., is_id_continue))
        .take()
        .map(|word: &str| match word.to_ascii_lowercase().as_str() {
            "strict" => Token::Strict,
            "graph" => Token::Graph,
            "digraph" => Token::Digraph,
            "node" => Token::Node,
            "edge" => Token::Edge,
            "subgraph" => Token::Subgraph,
            _ => Token::Identifier(word),
        })
        .parse_next(input)
}

/// Parse `//` and `#` line comments.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded(alt(("//", "#")), take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse a `/* ... */` comment.
fn block_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    preceded(
        "/*",
        cut_err(terminated(take_until(0.., "*/"), "*/")).context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated block comment",
            help: Some("close the comment with `*/`"),
            start,
        }),
    )
    .map(Token::BlockComment)
    .parse_next(input)
}

/// Parse edge operators.
fn edge_operator<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        literal("->").value(Token::DirectedEdge),
        literal("--").value(Token::UndirectedEdge),
    ))
    .parse_next(input)
}

/// Parse single character tokens
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '='.value(Token::Equals),
        ':'.value(Token::Colon),
        '+'.value(Token::Plus),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ';'.value(Token::Semicolon),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        alt((
            block_comment, // Must come before line comments
            line_comment,
            quoted_string,
            html_string,
            edge_operator, // Must come before numerals (`-`)
            numeral,
        )),
        identifier,
        single_char_token,
        newline, // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let cut = matches!(e, ErrMode::Cut(_));
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    // Unterminated constructs run to the end of input.
                    if cut {
                        break;
                    }
                    input.next_token();
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) when no lexer context is
    /// attached.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::new(*code, *message)
                .with_label(Span::new(*start..error_pos), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        Diagnostic::new(ErrorCode::E002, "unexpected character").with_label(
            Span::new(error_pos..error_pos.saturating_add(1)),
            ErrorCode::E002.description(),
        )
    }
}

/// Split DOT text into tokens, collecting every lexical error.
///
/// # Errors
///
/// Returns a [`ParseError`] holding one diagnostic per unexpected character,
/// plus one for an unterminated string or comment.
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
