//! Splits DSL source into declaration lines and classifies each one.

use crate::{
    error::{Error, ErrorKind, Result},
    ident,
    parser::RAW_TOKEN,
    span::Span,
};

/// One non-blank, non-comment line of the DSL source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub offset: u32,
}

impl<'a> Line<'a> {
    pub fn error(&self, kind: ErrorKind, span: Span) -> Error {
        Error::new(kind, self.number, self.text, span)
    }

    pub fn malformed(&self, reason: impl Into<std::borrow::Cow<'static, str>>, span: Span) -> Error {
        self.error(ErrorKind::Malformed(reason.into()), span)
    }

    /// Span of the whole line.
    pub fn span(&self) -> Span {
        Span::from(0..self.text.len()).shift(self.offset)
    }
}

pub fn lines(src: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (i, text) in src.split('\n').enumerate() {
        let line_offset = offset;
        offset += text.len() + 1;

        let text = text.strip_suffix('\r').unwrap_or(text);
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        lines.push(Line {
            number: i + 1,
            text,
            offset: line_offset as u32,
        });
    }

    log::debug!("read {} declaration lines", lines.len());

    lines
}

/// Names imported by the default prelude or defined by the runtime.
const PRELUDE_NAMES: &[&str] = &["Node", "NodeChild", "NodeKind", "Tag", "AstNode", "AstToken"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Enum,
    Struct,
    TokenLeaf,
}

/// A line split into its declaration name and member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclLine<'a> {
    pub line: Line<'a>,
    pub kind: LineKind,
    pub name: &'a str,
    pub name_span: Span,
    /// Text from the opening delimiter to the end of the line.
    /// Empty for token leaves.
    pub body: &'a str,
    /// Byte offset of `body` in the source.
    pub body_offset: u32,
}

/// The first `<` or `{` decides whether the line is an enum or a struct,
/// and everything before it is the name. A line with neither is a token
/// leaf named by the whole line.
pub fn read_line(line: Line<'_>) -> Result<DeclLine<'_>> {
    let text = line.text;

    let (kind, name_end) = match text.find(['<', '{']) {
        Some(i) if text.as_bytes()[i] == b'<' => (LineKind::Enum, i),
        Some(i) => (LineKind::Struct, i),
        None => (LineKind::TokenLeaf, text.len()),
    };

    let raw_name = &text[..name_end];
    let name = raw_name.trim();
    let name_start = raw_name.len() - raw_name.trim_start().len();
    let name_span = Span::from(name_start..name_start + name.len()).shift(line.offset);

    if name.is_empty() {
        return line
            .malformed("missing declaration name", Span::from(name_end..name_end).shift(line.offset))
            .into();
    }
    if !ident::is_ident(name) {
        return line
            .malformed(format!("invalid declaration name `{name}`"), name_span)
            .into();
    }
    if ident::is_keyword(name) {
        return line
            .malformed(format!("`{name}` is a reserved word"), name_span)
            .into();
    }
    if PRELUDE_NAMES.contains(&name) {
        return line
            .malformed(
                format!("`{name}` is reserved for the tree and runtime types"),
                name_span,
            )
            .into();
    }
    if name == RAW_TOKEN {
        return line
            .malformed(
                format!("`{RAW_TOKEN}` is reserved for raw token fields"),
                name_span,
            )
            .into();
    }

    Ok(DeclLine {
        line,
        kind,
        name,
        name_span,
        body: &text[name_end..],
        body_offset: line.offset + name_end as u32,
    })
}

#[cfg(test)]
mod tests;
