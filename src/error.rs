use std::borrow::Cow;
use std::fmt::{Display, Write as _};

use crate::span::Span;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Malformed(Cow<'static, str>),

    #[error("unknown type `{name}`{}", rejected_note(.rejected))]
    UnknownType { name: String, rejected: bool },

    #[error("duplicate declaration `{name}` (also declared on {})", LineList(.other_lines))]
    Duplicate {
        name: String,
        other_lines: Vec<usize>,
    },

    #[error("`{name}` is already registered as {class}")]
    RegistryConflict { name: String, class: &'static str },

    #[error(
        "ambiguous dispatch: `{discriminant}` is reachable through both `{first}` and `{second}`"
    )]
    AmbiguousDispatch {
        discriminant: String,
        first: String,
        second: String,
    },

    #[error("`{name}` is registered as a polymorphic enum, but its variants only hold {holds}")]
    NotPolymorphic { name: String, holds: &'static str },

    #[error("enum `{name}` contains itself")]
    Cycle { name: String },

    #[error("`{name}` is an external polymorphic type and cannot be an enum variant")]
    OpaqueVariant { name: String },

    #[error("no declarations to emit")]
    Empty,
}

fn rejected_note(rejected: &bool) -> &'static str {
    if *rejected {
        " (its declaration was rejected)"
    } else {
        ""
    }
}

struct LineList<'a>(&'a [usize]);

impl Display for LineList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            [line] => write!(f, "line {line}"),
            lines => {
                f.write_str("lines ")?;
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{line}")?;
                }
                Ok(())
            }
        }
    }
}

/// An error attached to one declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// 1-based line number, `0` for errors about the input as a whole.
    pub line: usize,
    /// Raw text of the offending line.
    pub text: String,
    /// Span into the whole DSL source.
    pub span: Span,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind, line: usize, text: impl Into<String>, span: Span) -> Self {
        Self {
            line,
            text: text.into(),
            span,
            kind,
        }
    }

    pub fn empty() -> Self {
        Self::new(ErrorKind::Empty, 0, "", Span::empty())
    }

    pub fn render<'a>(&'a self, src: &'a str) -> impl Display + 'a {
        RenderedError { error: self, src }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "line {}: {}", self.line, self.kind)
        }
    }
}

impl std::error::Error for Error {}

impl<T> From<Error> for Result<T, Error> {
    #[inline]
    fn from(value: Error) -> Self {
        Err(value)
    }
}

struct RenderedError<'a> {
    error: &'a Error,
    src: &'a str,
}

impl Display for RenderedError<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Error {
            line,
            text,
            span,
            kind,
        } = self.error;

        write!(f, "error: {kind}")?;
        if *line == 0 {
            return Ok(());
        }
        writeln!(f)?;

        let line_start = self.src[..span.start().min(self.src.len())]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let col = self
            .src
            .get(line_start..span.start())
            .map_or(0, |s| s.chars().count());
        let len = self
            .src
            .get(span.start()..span.end())
            .map_or(0, |s| s.chars().count())
            .max(1);

        let gutter = line.to_string().len();
        writeln!(f, "{:gutter$} |", "")?;
        writeln!(f, "{line} | {text}")?;
        write!(f, "{:gutter$} | {:col$}{}", "", "", "^".repeat(len))
    }
}

/// Every error collected over one generation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    errors: Vec<Error>,
}

impl Report {
    pub fn push(&mut self, error: Error) {
        log::trace!("{error}");
        self.errors.push(error);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Orders errors by line, keeping insertion order within a line.
    pub fn sort(&mut self) {
        self.errors.sort_by_key(|error| error.line);
    }

    pub fn render<'a>(&'a self, src: &'a str) -> impl Display + 'a {
        RenderedReport { report: self, src }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Report {}

struct RenderedReport<'a> {
    report: &'a Report,
    src: &'a str,
}

impl Display for RenderedReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for error in &self.report.errors {
            writeln!(f, "{}", error.render(self.src))?;
        }
        let n = self.report.errors.len();
        write!(f, "{n} error{} reported", if n == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests;
