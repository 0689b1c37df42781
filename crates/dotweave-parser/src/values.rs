//! Typed readers for layout attribute values.
//!
//! Layout output encodes geometry inside attribute strings:
//!
//! - `pos="37,93"` - a [`Point`], optionally followed by `!` or a z coordinate
//! - `bb="0,0,74,112"` - [`Bounds`] as left, bottom, right, top
//! - `width="0.91667"` - decimal inches
//! - `pos="e,37,38.249 37,73.943 ..."` - a [`Spline`] with optional arrow endpoints
//! - `rects="x0,y0,x1,y1 ..."` - record field rectangles
//!
//! Each reader consumes the whole value and returns a message describing the
//! expected format on failure.

use winnow::{
    Parser as _,
    ascii::{float, multispace0, multispace1},
    combinator::{alt, delimited, opt, preceded, repeat, separated, terminated},
    error::ModalResult,
};

use dotweave_core::geometry::{Bounds, Point};

/// A piecewise cubic Bézier path with optional arrow endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spline {
    /// Tip of the arrow at the source end (`s,x,y`).
    pub start: Option<Point>,
    /// Tip of the arrow at the destination end (`e,x,y`).
    pub end: Option<Point>,
    /// Control points in file order.
    pub points: Vec<Point>,
}

enum Endpoint {
    Start(Point),
    End(Point),
}

fn number(input: &mut &str) -> ModalResult<f32> {
    float.parse_next(input)
}

fn comma(input: &mut &str) -> ModalResult<()> {
    delimited(multispace0, ',', multispace0).void().parse_next(input)
}

fn point(input: &mut &str) -> ModalResult<Point> {
    (number, preceded(comma, number))
        .map(|(x, y)| Point::new(x, y))
        .parse_next(input)
}

/// A node position: `x,y`, `x,y!` or `x,y,z`.
fn position(input: &mut &str) -> ModalResult<Point> {
    terminated(point, (opt(preceded(comma, number)), opt('!'))).parse_next(input)
}

fn bounds(input: &mut &str) -> ModalResult<Bounds> {
    (
        number,
        preceded(comma, number),
        preceded(comma, number),
        preceded(comma, number),
    )
        .map(|(x0, y0, x1, y1)| Bounds::new(x0, y0, x1, y1))
        .parse_next(input)
}

fn endpoint(input: &mut &str) -> ModalResult<Endpoint> {
    alt((
        preceded(('s', comma), point).map(Endpoint::Start),
        preceded(('e', comma), point).map(Endpoint::End),
    ))
    .parse_next(input)
}

fn spline(input: &mut &str) -> ModalResult<Spline> {
    let endpoints: Vec<Endpoint> =
        repeat(0..=2, terminated(endpoint, multispace1)).parse_next(input)?;
    let points: Vec<Point> = separated(1.., point, multispace1).parse_next(input)?;

    let mut spline = Spline {
        points,
        ..Spline::default()
    };
    for endpoint in endpoints {
        match endpoint {
            Endpoint::Start(p) => spline.start = Some(p),
            Endpoint::End(p) => spline.end = Some(p),
        }
    }
    Ok(spline)
}

/// Runs `parser` over the trimmed value, requiring it to consume everything.
fn parse_all<O>(
    mut parser: impl FnMut(&mut &str) -> ModalResult<O>,
    text: &str,
    expected: &str,
) -> Result<O, String> {
    (&mut parser)
        .parse(text.trim())
        .map_err(|_| format!("invalid value `{text}`, expected {expected}"))
}

/// Parses a node position such as `37,93`.
///
/// # Errors
///
/// Returns a message when the value is not two comma-separated numbers.
///
/// ```
/// # use dotweave_parser::values::parse_point;
/// let p = parse_point("37,93!").unwrap();
/// assert_eq!((p.x(), p.y()), (37.0, 93.0));
/// assert!(parse_point("37").is_err());
/// ```
pub fn parse_point(text: &str) -> Result<Point, String> {
    parse_all(position, text, "`x,y`")
}

/// Parses a bounding box `x0,y0,x1,y1`.
///
/// # Errors
///
/// Returns a message when the value is not four comma-separated numbers.
pub fn parse_bounds(text: &str) -> Result<Bounds, String> {
    parse_all(bounds, text, "`x0,y0,x1,y1`")
}

/// Parses a decimal number such as a width in inches.
///
/// # Errors
///
/// Returns a message when the value is not a number.
pub fn parse_number(text: &str) -> Result<f32, String> {
    parse_all(number, text, "a number")
}

/// Parses a spline value.
///
/// Multiple splines separated by `;` are produced for concentrated edges;
/// only the first one is returned.
///
/// # Errors
///
/// Returns a message when a point is malformed or fewer than two control
/// points are present.
///
/// ```
/// # use dotweave_parser::values::parse_spline;
/// let spline = parse_spline("e,37,38.249 37,73.943 37,66.149 37,56.954 37,48.338").unwrap();
/// assert!(spline.start.is_none());
/// assert_eq!(spline.end.unwrap().y(), 38.249);
/// assert_eq!(spline.points.len(), 4);
/// ```
pub fn parse_spline(text: &str) -> Result<Spline, String> {
    let first = text.split(';').next().unwrap_or_default();
    let spline = parse_all(spline, first, "`[e,x,y] [s,x,y] x,y x,y ...`")?;
    if spline.points.len() < 2 {
        return Err(format!(
            "invalid value `{text}`, expected at least two control points"
        ));
    }
    Ok(spline)
}

/// Parses record field rectangles, one `x0,y0,x1,y1` group per field.
///
/// # Errors
///
/// Returns a message when any rectangle is malformed.
pub fn parse_rects(text: &str) -> Result<Vec<Bounds>, String> {
    parse_all(
        |input: &mut &str| separated(1.., bounds, multispace1).parse_next(input),
        text,
        "space-separated `x0,y0,x1,y1` groups",
    )
}

/// Names substituted into label escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelContext<'a> {
    /// Replaces `\N`.
    pub node: Option<&'a str>,
    /// Replaces `\G`.
    pub graph: Option<&'a str>,
    /// Replaces `\T`.
    pub tail: Option<&'a str>,
    /// Replaces `\H`.
    pub head: Option<&'a str>,
}

/// Expands DOT label escapes.
///
/// `\N`, `\G`, `\T` and `\H` become the names from `context`, `\E` becomes
/// `tail->head`, and the line-break escapes `\n`, `\l` and `\r` become
/// newlines. `\\` is a literal backslash. Unknown escapes keep the escaped
/// character.
///
/// ```
/// # use dotweave_parser::values::{expand_label, LabelContext};
/// let context = LabelContext { node: Some("Hello"), ..Default::default() };
/// assert_eq!(expand_label(r"\N", context), "Hello");
/// assert_eq!(expand_label(r"line 1\lline 2", context), "line 1\nline 2");
/// ```
pub fn expand_label(text: &str, context: LabelContext<'_>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('N') => out.push_str(context.node.unwrap_or_default()),
            Some('G') => out.push_str(context.graph.unwrap_or_default()),
            Some('T') => out.push_str(context.tail.unwrap_or_default()),
            Some('H') => out.push_str(context.head.unwrap_or_default()),
            Some('E') => {
                out.push_str(context.tail.unwrap_or_default());
                out.push_str("->");
                out.push_str(context.head.unwrap_or_default());
            }
            Some('n' | 'l' | 'r') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Decodes `\\` in a vertex, port or graph name.
///
/// Names carry no other escapes, so anything else is returned unchanged.
pub fn unescape_name(text: &str) -> String {
    text.replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_parse_point_forms() {
        assert_eq!(parse_point("37,93").unwrap(), Point::new(37.0, 93.0));
        assert_eq!(parse_point(" 1.5 , -2 ").unwrap(), Point::new(1.5, -2.0));
        assert_eq!(parse_point("4,5,6").unwrap(), Point::new(4.0, 5.0));
        assert_eq!(parse_point("4,5!").unwrap(), Point::new(4.0, 5.0));
    }

    #[test]
    fn test_parse_point_rejects_garbage() {
        let err = parse_point("37,abc").unwrap_err();
        assert!(err.contains("37,abc"));
        assert!(err.contains("`x,y`"));
        assert!(parse_point("").is_err());
        assert!(parse_point("1,2 3").is_err());
    }

    #[test]
    fn test_parse_bounds() {
        let bb = parse_bounds("0,0,264,260").unwrap();
        assert_eq!(bb.width(), 264.0);
        assert_eq!(bb.height(), 260.0);
        assert!(parse_bounds("0,0,264").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert!(approx_eq!(f32, parse_number("0.91667").unwrap(), 0.91667, epsilon = 1e-6));
        assert!(parse_number("wide").is_err());
    }

    #[test]
    fn test_parse_spline_with_both_endpoints() {
        let spline = parse_spline("s,1,2 e,7,8 1,3 2,4 3,5 4,6").unwrap();
        assert_eq!(spline.start, Some(Point::new(1.0, 2.0)));
        assert_eq!(spline.end, Some(Point::new(7.0, 8.0)));
        assert_eq!(spline.points.first(), Some(&Point::new(1.0, 3.0)));
        assert_eq!(spline.points.last(), Some(&Point::new(4.0, 6.0)));
    }

    #[test]
    fn test_parse_spline_without_endpoints() {
        let spline = parse_spline("0,0 1,1 2,2 3,3").unwrap();
        assert!(spline.start.is_none());
        assert!(spline.end.is_none());
        assert_eq!(spline.points.len(), 4);
    }

    #[test]
    fn test_parse_spline_multiline_value() {
        let spline = parse_spline("e,1,1 0,0 1,1\n2,2 3,3").unwrap();
        assert_eq!(spline.points.len(), 4);
    }

    #[test]
    fn test_parse_spline_keeps_first_of_many() {
        let spline = parse_spline("0,0 1,1 2,2 3,3;9,9 8,8 7,7 6,6").unwrap();
        assert_eq!(spline.points[0], Point::new(0.0, 0.0));
        assert_eq!(spline.points.len(), 4);
    }

    #[test]
    fn test_parse_spline_requires_two_points() {
        assert!(parse_spline("e,1,1 0,0").is_err());
        assert!(parse_spline("").is_err());
    }

    #[test]
    fn test_parse_rects() {
        let rects = parse_rects("62.5,223,83.5,259 83.5,223,118.5,259 118.5,223,139.5,259").unwrap();
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[1], Bounds::new(83.5, 223.0, 118.5, 259.0));
    }

    #[test]
    fn test_unescape_name() {
        assert_eq!(unescape_name(r"C:\\Graphs"), r"C:\Graphs");
        assert_eq!(unescape_name(r"a\\\\b"), r"a\\b");
        assert_eq!(unescape_name("plain"), "plain");
    }

    #[test]
    fn test_expand_label_escapes() {
        let context = LabelContext {
            node: Some("n"),
            graph: Some("G"),
            tail: Some("a"),
            head: Some("b"),
        };
        assert_eq!(expand_label(r"\G: \E", context), "G: a->b");
        assert_eq!(expand_label(r"\T to \H", context), "a to b");
        assert_eq!(expand_label(r"50\% \x", context), "50% x");
        assert_eq!(expand_label("trailing\\", context), "trailing\\");
        assert_eq!(expand_label(r"dir\\Node", context), r"dir\Node");
        assert_eq!(expand_label(r"C:\\Graphs \\\N", context), r"C:\Graphs \n");
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn coordinate_strategy() -> impl Strategy<Value = f32> {
        -100_000.0f32..100_000.0
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (coordinate_strategy(), coordinate_strategy()).prop_map(|(x, y)| Point::new(x, y))
    }

    fn spline_strategy() -> impl Strategy<Value = Spline> {
        (
            prop::option::of(point_strategy()),
            prop::option::of(point_strategy()),
            prop::collection::vec(point_strategy(), 2..10),
        )
            .prop_map(|(start, end, points)| Spline { start, end, points })
    }

    fn format_point(point: Point) -> String {
        format!("{},{}", point.x(), point.y())
    }

    fn format_spline(spline: &Spline) -> String {
        let mut parts = Vec::new();
        if let Some(end) = spline.end {
            parts.push(format!("e,{}", format_point(end)));
        }
        if let Some(start) = spline.start {
            parts.push(format!("s,{}", format_point(start)));
        }
        parts.extend(spline.points.iter().copied().map(format_point));
        parts.join(" ")
    }

    fn same_point(a: Point, b: Point) -> bool {
        approx_eq!(f32, a.x(), b.x(), ulps = 2) && approx_eq!(f32, a.y(), b.y(), ulps = 2)
    }

    // ===================
    // Property Test Functions
    // ===================

    /// A formatted position parses back to the same point.
    fn check_point_round_trip(point: Point) -> Result<(), TestCaseError> {
        let text = format_point(point);
        let parsed = parse_point(&text).map_err(TestCaseError::fail)?;
        prop_assert!(same_point(parsed, point), "`{text}` parsed as {parsed:?}");
        Ok(())
    }

    /// A formatted spline keeps its endpoints and control points.
    fn check_spline_round_trip(spline: &Spline) -> Result<(), TestCaseError> {
        let text = format_spline(spline);
        let parsed = parse_spline(&text).map_err(TestCaseError::fail)?;

        prop_assert_eq!(parsed.start.is_some(), spline.start.is_some());
        prop_assert_eq!(parsed.end.is_some(), spline.end.is_some());
        if let (Some(a), Some(b)) = (parsed.start, spline.start) {
            prop_assert!(same_point(a, b), "start of `{text}`");
        }
        if let (Some(a), Some(b)) = (parsed.end, spline.end) {
            prop_assert!(same_point(a, b), "end of `{text}`");
        }
        prop_assert_eq!(parsed.points.len(), spline.points.len());
        for (a, b) in parsed.points.iter().zip(&spline.points) {
            prop_assert!(same_point(*a, *b), "control point of `{text}`");
        }
        Ok(())
    }

    /// Text with every backslash doubled decodes to the original, both as a
    /// name and as a label without other escapes.
    fn check_doubled_backslashes_decode(text: &str) -> Result<(), TestCaseError> {
        let escaped = text.replace('\\', r"\\");
        prop_assert_eq!(unescape_name(&escaped), text);
        prop_assert_eq!(expand_label(&escaped, LabelContext::default()), text);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn point_round_trip(point in point_strategy()) {
            check_point_round_trip(point)?;
        }

        #[test]
        fn spline_round_trip(spline in spline_strategy()) {
            check_spline_round_trip(&spline)?;
        }

        #[test]
        fn doubled_backslashes_decode(text in r"[a-zA-Z:\\ ]{0,16}") {
            check_doubled_backslashes_decode(&text)?;
        }
    }
}
