use logos::Logos as _;

use crate::span::Span;

/// Tokenizes a single declaration line.
///
/// `base` is the byte offset of `src` in the whole DSL source, so that
/// spans stored in the token list can be used for error reporting
/// without any further adjustment.
pub fn tokenize(src: &str, base: u32) -> Tokens<'_> {
    let mut tokens = Tokens::new(src, base);

    for (kind, span) in TokenKind::lexer(src).spanned() {
        let kind = kind.unwrap_or(TokenKind::Error);
        tokens.append(kind, Span::from(span));
    }

    tokens
}

pub struct Tokens<'src> {
    src: &'src str,
    base: u32,
    kind: Vec<TokenKind>,
    span: Vec<Span>,
}

impl<'src> Tokens<'src> {
    fn new(src: &'src str, base: u32) -> Self {
        // most lines are short declarations
        let capacity = src.len() / 3;
        Self {
            src,
            base,
            kind: Vec::with_capacity(capacity),
            span: Vec::with_capacity(capacity),
        }
    }

    fn append(&mut self, kind: TokenKind, span: Span) {
        self.kind.push(kind);
        self.span.push(span);
    }

    #[inline]
    fn len(&self) -> usize {
        self.kind.len()
    }

    #[inline]
    pub fn cursor<'tokens>(&'tokens self) -> TokenCursor<'src, 'tokens> {
        TokenCursor {
            tokens: self,
            index: 0,
        }
    }

    #[inline]
    pub fn kind(&self, token: Token) -> TokenKind {
        if token.index() >= self.kind.len() {
            return TokenKind::Eof;
        }

        self.kind[token.index()]
    }

    /// Span relative to the start of the tokenized line.
    #[inline]
    fn local_span(&self, token: Token) -> Span {
        if token.index() >= self.kind.len() {
            let end = self.src.len();
            return Span::from(end..end);
        }

        self.span[token.index()]
    }

    /// Span in the whole DSL source.
    #[inline]
    pub fn span(&self, token: Token) -> Span {
        self.local_span(token).shift(self.base)
    }

    #[inline]
    pub fn lexeme(&self, token: Token) -> &'src str {
        &self.src[self.local_span(token)]
    }

    #[inline]
    pub fn debug<'tokens>(&'tokens self, token: Token) -> DebugToken<'src, 'tokens> {
        DebugToken {
            tokens: self,
            token,
        }
    }
}

impl<'src> std::fmt::Debug for Tokens<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for token in self.cursor() {
            list.entry(&self.debug(token));
        }
        list.finish()
    }
}

pub struct DebugToken<'src, 'tokens> {
    tokens: &'tokens Tokens<'src>,
    token: Token,
}

impl<'src, 'tokens> std::fmt::Debug for DebugToken<'src, 'tokens> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.tokens.kind(self.token);
        let span = self.tokens.span(self.token);
        let lexeme = self.tokens.lexeme(self.token);

        write!(f, "{kind:?}({lexeme:?}, {span})")
    }
}

#[rustfmt::skip]
macro_rules! t {
    ("{") => ($crate::token::TokenKind::BraceL);
    ("}") => ($crate::token::TokenKind::BraceR);
    (<) => ($crate::token::TokenKind::AngleL);
    (>) => ($crate::token::TokenKind::AngleR);
    ("[") => ($crate::token::TokenKind::BracketL);
    ("]") => ($crate::token::TokenKind::BracketR);
    (:) => ($crate::token::TokenKind::Colon);
    (,) => ($crate::token::TokenKind::Comma);
    (?) => ($crate::token::TokenKind::Question);

    (ident) => ($crate::token::TokenKind::Ident);

    (EOF) => ($crate::token::TokenKind::Eof);
}

pub struct TokenCursor<'src, 'tokens> {
    tokens: &'tokens Tokens<'src>,
    index: usize,
}

impl<'src, 'tokens> TokenCursor<'src, 'tokens> {
    #[inline]
    pub fn kind(&self, token: Token) -> TokenKind {
        self.tokens.kind(token)
    }

    #[inline]
    pub fn lexeme(&self, token: Token) -> &'src str {
        self.tokens.lexeme(token)
    }

    #[inline]
    pub fn span(&self, token: Token) -> Span {
        self.tokens.span(token)
    }

    #[inline]
    pub fn advance(&mut self) {
        let _ = self.next();
    }

    #[inline]
    pub fn current(&self) -> Token {
        Token(self.index as u32)
    }
}

impl<'src, 'tokens> Iterator for TokenCursor<'src, 'tokens> {
    type Item = Token;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index == self.tokens.len() {
            return None;
        }

        let token = self.current();
        self.index += 1;
        Some(token)
    }
}

#[derive(Clone, Copy)]
pub struct Token(u32);

impl Token {
    #[inline]
    fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, logos::Logos)]
pub enum TokenKind {
    #[token("{")]
    BraceL,
    #[token("}")]
    BraceR,
    #[token("<")]
    AngleL,
    #[token(">")]
    AngleR,
    #[token("[")]
    BracketL,
    #[token("]")]
    BracketR,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("?")]
    Question,

    #[regex(r"[a-zA-Z_][a-zA-Z_0-9]*")]
    Ident,

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    Error,
    Eof,
}

impl TokenKind {
    /// Lexeme used in "expected X" messages.
    pub fn bare_lexeme(self) -> &'static str {
        match self {
            TokenKind::BraceL => "{",
            TokenKind::BraceR => "}",
            TokenKind::AngleL => "<",
            TokenKind::AngleR => ">",
            TokenKind::BracketL => "[",
            TokenKind::BracketR => "]",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Question => "?",
            TokenKind::Ident => "identifier",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Error => "<error>",
            TokenKind::Eof => "end of line",
        }
    }
}
