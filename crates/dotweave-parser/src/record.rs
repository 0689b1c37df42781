//! Record label structure.
//!
//! Vertices with `shape=record` or `shape=Mrecord` carry labels such as
//! `<left> | 14 | {<a> a | b}`. Fields are separated by `|`, braces nest a
//! group with flipped orientation, and `<name>` declares a port. The layout
//! engine emits one rectangle per leaf field in depth-first order, which
//! [`RecordLabel::leaf_index`] maps ports onto.

use winnow::{
    Parser as _,
    ascii::multispace0,
    combinator::{alt, delimited, opt, preceded, repeat, separated},
    error::ModalResult,
    token::{any, take_till},
};

/// One field of a record label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordField {
    /// A leaf with optional port name and display text.
    Text { port: Option<String>, text: String },
    /// A nested `{ ... }` group.
    Group(Vec<RecordField>),
}

impl RecordField {
    fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(Option<&'a str>, &'a str)) {
        match self {
            RecordField::Text { port, text } => f(port.as_deref(), text),
            RecordField::Group(fields) => {
                for field in fields {
                    field.for_each_leaf(&mut *f);
                }
            }
        }
    }

    fn map_text(self, f: &impl Fn(&str) -> String) -> Self {
        match self {
            RecordField::Text { port, text } => RecordField::Text {
                port,
                text: f(&text),
            },
            RecordField::Group(fields) => {
                RecordField::Group(fields.into_iter().map(|field| field.map_text(f)).collect())
            }
        }
    }
}

/// A parsed record label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLabel {
    fields: Vec<RecordField>,
}

impl RecordLabel {
    /// Parses a record label.
    ///
    /// # Errors
    ///
    /// Returns a message when braces or port brackets are unbalanced.
    ///
    /// ```
    /// # use dotweave_parser::record::RecordLabel;
    /// let label = RecordLabel::parse("<left> | 14 | <right>").unwrap();
    /// assert_eq!(label.ports(), vec!["left", "right"]);
    /// assert!(RecordLabel::parse("{a | b").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, String> {
        fields
            .parse(text)
            .map(|fields| Self { fields })
            .map_err(|e| format!("invalid record label `{text}` at offset {}", e.offset()))
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Port names in declaration order.
    pub fn ports(&self) -> Vec<&str> {
        let mut ports = Vec::new();
        self.for_each_leaf(|port, _| ports.extend(port));
        ports
    }

    /// Display text of every leaf field, in depth-first order.
    pub fn texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        self.for_each_leaf(|_, text| texts.push(text));
        texts
    }

    /// Depth-first index of the leaf field declaring `port`.
    pub fn leaf_index(&self, port: &str) -> Option<usize> {
        let mut index = 0;
        let mut found = None;
        self.for_each_leaf(|leaf_port, _| {
            if found.is_none() && leaf_port == Some(port) {
                found = Some(index);
            }
            index += 1;
        });
        found
    }

    /// Rewrites the text of every leaf field.
    pub fn map_text(self, f: impl Fn(&str) -> String) -> Self {
        Self {
            fields: self.fields.into_iter().map(|field| field.map_text(&f)).collect(),
        }
    }

    fn for_each_leaf<'a>(&'a self, mut f: impl FnMut(Option<&'a str>, &'a str)) {
        for field in &self.fields {
            field.for_each_leaf(&mut f);
        }
    }
}

const SPECIAL: [char; 6] = ['\\', '{', '}', '|', '<', '>'];

/// A run of field text. Escaped specials lose their backslash; other escapes
/// such as `\N` and `\\` are kept for label expansion.
fn text_run(input: &mut &str) -> ModalResult<String> {
    repeat(
        0..,
        alt((
            take_till(1.., SPECIAL).map(str::to_owned),
            preceded('\\', any).map(|ch: char| {
                if ch != '\\' && (SPECIAL.contains(&ch) || ch == ' ') {
                    ch.to_string()
                } else {
                    format!("\\{ch}")
                }
            }),
        )),
    )
    .fold(String::new, |mut acc, piece| {
        acc.push_str(&piece);
        acc
    })
    .parse_next(input)
}

fn port(input: &mut &str) -> ModalResult<String> {
    delimited('<', take_till(0.., ['>', '<', '{', '}', '|']), '>')
        .map(|name: &str| name.trim().to_owned())
        .parse_next(input)
}

fn text_field(input: &mut &str) -> ModalResult<RecordField> {
    let before = text_run(input)?;
    let port = opt(port).parse_next(input)?;
    let after = text_run(input)?;
    let text = format!("{before}{after}").trim().to_owned();
    Ok(RecordField::Text {
        port: port.filter(|name| !name.is_empty()),
        text,
    })
}

fn group(input: &mut &str) -> ModalResult<RecordField> {
    delimited((multispace0, '{'), fields, ('}', multispace0))
        .map(RecordField::Group)
        .parse_next(input)
}

fn field(input: &mut &str) -> ModalResult<RecordField> {
    alt((group, text_field)).parse_next(input)
}

fn fields(input: &mut &str) -> ModalResult<Vec<RecordField>> {
    separated(1.., field, '|').parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(port: Option<&str>, text: &str) -> RecordField {
        RecordField::Text {
            port: port.map(str::to_owned),
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_flat_record_with_ports() {
        let label = RecordLabel::parse("<left> | 14 | <right>").unwrap();
        assert_eq!(
            label.fields(),
            &[text(Some("left"), ""), text(None, "14"), text(Some("right"), "")]
        );
        assert_eq!(label.leaf_index("right"), Some(2));
        assert_eq!(label.leaf_index("middle"), None);
    }

    #[test]
    fn test_nested_groups() {
        let label = RecordLabel::parse("a | {<b> b | {c | <d> d}} | e").unwrap();
        assert_eq!(label.ports(), vec!["b", "d"]);
        assert_eq!(label.texts(), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(label.leaf_index("d"), Some(3));
        assert!(matches!(label.fields()[1], RecordField::Group(ref inner) if inner.len() == 2));
    }

    #[test]
    fn test_escapes() {
        let label = RecordLabel::parse(r"a \| b | \{x\} | \N").unwrap();
        assert_eq!(label.texts(), vec!["a | b", "{x}", r"\N"]);

        let label = RecordLabel::parse(r"C:\\Graphs | x").unwrap();
        assert_eq!(label.texts(), vec![r"C:\\Graphs", "x"]);
    }

    #[test]
    fn test_port_with_trailing_text() {
        let label = RecordLabel::parse("<f0> left|<f1> mid\\ dle |<f2> right").unwrap();
        assert_eq!(label.ports(), vec!["f0", "f1", "f2"]);
        assert_eq!(label.texts(), vec!["left", "mid dle", "right"]);
    }

    #[test]
    fn test_map_text() {
        let label = RecordLabel::parse(r"<l> | \N | <r>")
            .unwrap()
            .map_text(|t| t.replace(r"\N", "14"));
        assert_eq!(label.texts(), vec!["", "14", ""]);
    }

    #[test]
    fn test_unbalanced_labels() {
        assert!(RecordLabel::parse("{a | b").is_err());
        assert!(RecordLabel::parse("a } b").is_err());
        assert!(RecordLabel::parse("<a b").is_err());
        assert!(RecordLabel::parse("{a} trailing").is_err());
    }

    #[test]
    fn test_plain_text_is_single_field() {
        let label = RecordLabel::parse("Hello").unwrap();
        assert_eq!(label.fields(), &[text(None, "Hello")]);
        assert!(label.ports().is_empty());
    }
}
