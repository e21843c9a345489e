#![allow(dead_code)]

struct Node<'s, 'b>(&'b &'s ());
struct Token<'s>(&'s ());

// code before this marker is not included in the generated output
//file-start

/// Typed view of a node with a known kind.
pub trait AstNode<'s, 'b>: Sized {
    /// Wraps `node`.
    ///
    /// The node's kind must be one this type was generated for.
    /// This is only checked in debug builds.
    fn cast(node: &'b Node<'s, 'b>) -> Self;

    fn node(&self) -> &'b Node<'s, 'b>;
}

/// Typed view of a token with a known tag.
pub trait AstToken<'s, 'b>: Sized {
    /// Wraps `token`.
    ///
    /// The token's tag must be one this type was generated for.
    /// This is only checked in debug builds.
    fn cast(token: &'b Token<'s>) -> Self;

    fn token(&self) -> &'b Token<'s>;
}
