//! Parses the member list of a declaration line.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::{
    error::{Error, Result},
    ident,
    reader::{DeclLine, Line, LineKind},
    span::Span,
    token::{Token, TokenCursor, TokenKind, Tokens, tokenize},
};

/// Field type denoting an untyped token reference.
pub const RAW_TOKEN: &str = "Token";

/// Field names which would shadow the methods of the wrapper traits.
const RESERVED_FIELDS: &[&str] = &["node", "token", "cast"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl<'a> {
    pub name: &'a str,
    pub line: Line<'a>,
    pub span: Span,
    pub kind: DeclKind<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind<'a> {
    TokenLeaf,
    Struct(Vec<Field<'a>>),
    Enum(Vec<Variant<'a>>),
}

impl DeclKind<'_> {
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::TokenLeaf => "token leaf",
            DeclKind::Struct(_) => "struct",
            DeclKind::Enum(_) => "enum",
        }
    }
}

/// A struct member. Its position in the member list is its child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub ty: TypeRef<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRef<'a> {
    /// Type name with `?` and `[]` stripped.
    pub inner: &'a str,
    pub cardinality: Cardinality,
    pub optionality: Optionality,
    pub span: Span,
}

impl TypeRef<'_> {
    #[inline]
    pub fn is_raw_token(&self) -> bool {
        self.inner == RAW_TOKEN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optionality {
    Required,
    Optional,
}

/// An enum member. `ty` defaults to `name` when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant<'a> {
    pub name: &'a str,
    pub ty: &'a str,
    pub span: Span,
}

pub fn parse_decl(decl: DeclLine<'_>) -> Result<Decl<'_>> {
    let kind = match decl.kind {
        LineKind::TokenLeaf => DeclKind::TokenLeaf,
        LineKind::Struct => {
            let tokens = tokenize(decl.body, decl.body_offset);
            let fields = State::new(&decl, &tokens).parse_struct_body()?;
            DeclKind::Struct(fields)
        }
        LineKind::Enum => {
            let tokens = tokenize(decl.body, decl.body_offset);
            let variants = State::new(&decl, &tokens).parse_enum_body()?;
            DeclKind::Enum(variants)
        }
    };

    Ok(Decl {
        name: decl.name,
        line: decl.line,
        span: decl.name_span,
        kind,
    })
}

struct State<'d, 't, 'src> {
    decl: &'d DeclLine<'src>,
    cursor: TokenCursor<'src, 't>,
}

impl<'d, 't, 'src> State<'d, 't, 'src> {
    fn new(decl: &'d DeclLine<'src>, tokens: &'t Tokens<'src>) -> Self {
        Self {
            decl,
            cursor: tokens.cursor(),
        }
    }

    #[inline]
    fn kind(&self) -> TokenKind {
        let token = self.cursor.current();
        self.cursor.kind(token)
    }

    #[inline]
    fn lexeme(&self) -> &'src str {
        self.cursor.lexeme(self.cursor.current())
    }

    #[inline]
    fn span(&self) -> Span {
        self.cursor.span(self.cursor.current())
    }

    #[inline]
    fn advance(&mut self) {
        self.cursor.advance();
    }

    #[inline]
    fn end(&self) -> bool {
        self.at(t![EOF])
    }

    /// Iff current token is `kind`, returns `true`.
    ///
    /// Does not advance.
    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Iff current token is `kind` advances and returns `true`,
    /// otherwise returns `false` without advancing.
    #[inline]
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Iff current token is `kind`, returns `Ok(token)` and advances,
    /// otherwise returns `Err` without advancing.
    #[inline]
    fn must(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.cursor.current();
        if self.eat(kind) {
            Ok(tok)
        } else {
            self.error(format!(
                "expected `{}`, found {}",
                kind.bare_lexeme(),
                self.found()
            ))
            .into()
        }
    }

    fn ident(&mut self, what: &str) -> Result<(&'src str, Span)> {
        if !self.at(t![ident]) {
            return self
                .error(format!("expected {what}, found {}", self.found()))
                .into();
        }
        let name = self.lexeme();
        let span = self.span();
        self.advance();
        Ok((name, span))
    }

    fn found(&self) -> String {
        match self.kind() {
            t![EOF] => "end of line".into(),
            _ => format!("`{}`", self.lexeme()),
        }
    }

    fn error(&self, reason: String) -> Error {
        self.decl.line.malformed(reason, self.span())
    }

    /// Requires `closer` to be the last token on the line.
    fn finish(&mut self, closer: TokenKind) -> Result<()> {
        self.must(closer)?;
        if !self.end() {
            return self
                .error(format!(
                    "unexpected {} after `{}`",
                    self.found(),
                    closer.bare_lexeme()
                ))
                .into();
        }
        Ok(())
    }

    fn parse_struct_body(&mut self) -> Result<Vec<Field<'src>>> {
        self.must(t!["{"])?;

        let mut fields = Vec::new();
        let mut methods = HashMap::with_hasher(FxBuildHasher);
        loop {
            if self.at(t!["}"]) {
                break;
            }

            let field = self.parse_field()?;
            let method = ident::method_name(field.name);
            if let Some(previous) = methods.insert(method, field.name) {
                return self
                    .decl
                    .line
                    .malformed(
                        format!(
                            "field `{}` has the same accessor as field `{previous}`",
                            field.name
                        ),
                        field.span,
                    )
                    .into();
            }
            fields.push(field);

            if !self.eat(t![,]) {
                break;
            }
        }

        self.finish(t!["}"])?;

        // a list reads every child from its index onward
        let tail = fields.len().saturating_sub(1);
        if let Some(list) = fields[..tail]
            .iter()
            .find(|field| field.ty.cardinality == Cardinality::List)
        {
            return self
                .decl
                .line
                .malformed(
                    format!("list field `{}` must be the last field", list.name),
                    list.span,
                )
                .into();
        }

        Ok(fields)
    }

    fn parse_field(&mut self) -> Result<Field<'src>> {
        let (name, span) = self.ident("field name")?;
        let line = self.decl.line;

        // checked on the accessor name
        let method = ident::method_name(name);
        let method = method.trim_start_matches("r#");
        if method.is_empty() || !ident::can_be_raw(method) {
            return line
                .malformed(format!("`{name}` is not a valid field name"), span)
                .into();
        }
        if RESERVED_FIELDS.contains(&method) {
            return line
                .malformed(format!("field name `{name}` is reserved"), span)
                .into();
        }

        if !self.eat(t![:]) {
            return line
                .malformed(format!("field `{name}` is missing a type"), span)
                .into();
        }

        let ty = self.parse_type()?;
        Ok(Field { name, ty, span })
    }

    // X | X? | [X]
    fn parse_type(&mut self) -> Result<TypeRef<'src>> {
        let start = self.span();

        if self.eat(t!["["]) {
            let (inner, _) = self.ident("type")?;
            if self.at(t![?]) {
                return self
                    .error("list elements cannot be optional".into())
                    .into();
            }
            let end = self.span();
            self.must(t!["]"])?;
            if self.at(t![?]) {
                return self.error("optional lists are not supported".into()).into();
            }

            return Ok(TypeRef {
                inner,
                cardinality: Cardinality::List,
                optionality: Optionality::Required,
                span: start.to(end),
            });
        }

        let (inner, mut span) = self.ident("type")?;
        let optionality = if self.at(t![?]) {
            span = span.to(self.span());
            self.advance();
            Optionality::Optional
        } else {
            Optionality::Required
        };

        Ok(TypeRef {
            inner,
            cardinality: Cardinality::Single,
            optionality,
            span,
        })
    }

    fn parse_enum_body(&mut self) -> Result<Vec<Variant<'src>>> {
        let open = self.span();
        self.must(t![<])?;

        let mut variants: Vec<Variant<'src>> = Vec::new();
        loop {
            if self.at(t![>]) {
                break;
            }

            let variant = self.parse_variant()?;
            if variants.iter().any(|v| v.name == variant.name) {
                return self
                    .decl
                    .line
                    .malformed(format!("duplicate variant `{}`", variant.name), variant.span)
                    .into();
            }
            variants.push(variant);

            if !self.eat(t![,]) {
                break;
            }
        }

        let close = self.span();
        self.finish(t![>])?;

        if variants.is_empty() {
            return self
                .decl
                .line
                .malformed(
                    format!("enum `{}` has no variants", self.decl.name),
                    open.to(close),
                )
                .into();
        }

        Ok(variants)
    }

    // Name | Name:Type
    fn parse_variant(&mut self) -> Result<Variant<'src>> {
        let (name, name_span) = self.ident("variant name")?;
        let line = self.decl.line;

        if ident::is_keyword(name) {
            return line
                .malformed(format!("`{name}` is not a valid variant name"), name_span)
                .into();
        }

        let (ty, span) = if self.eat(t![:]) {
            self.ident("variant type")?
        } else {
            (name, name_span)
        };

        if ty == RAW_TOKEN {
            return line
                .malformed(
                    format!("variant `{name}` cannot wrap a raw `{RAW_TOKEN}`"),
                    span,
                )
                .into();
        }

        Ok(Variant { name, ty, span })
    }
}
