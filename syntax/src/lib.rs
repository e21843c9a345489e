//! A generic syntax tree, viewed through typed wrappers generated
//! from `nodes.ast` at build time.
//!
//! Nodes own no data beyond a kind and a slice of children, which
//! live in a [`Bump`] arena. Absent optional children are stored as
//! [`Node::null`] or [`Token::empty`].

use bumpalo::{Bump, collections::Vec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Ident,
    String,
    Bool,
    Number,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    tag: Tag,
    lexeme: &'s str,
}

impl<'s> Token<'s> {
    #[inline]
    pub const fn new(tag: Tag, lexeme: &'s str) -> Self {
        Self { tag, lexeme }
    }

    #[inline]
    pub const fn empty() -> Self {
        Self {
            tag: Tag::None,
            lexeme: "",
        }
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    pub fn lexeme(&self) -> &'s str {
        self.lexeme
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tag == Tag::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Infix,
    Prefix,
    CallExpr,
    Block,
    IfExpr,
    VarDecl,
    ExprStmt,
    ArrayType,
    Attr,
    FnDef,
    ParamList,
    Param,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct Node<'s, 'b> {
    kind: NodeKind,
    children: Option<&'b [NodeChild<'s, 'b>]>,
}

impl<'s, 'b> Node<'s, 'b> {
    #[inline]
    pub const fn null() -> Self {
        Self {
            kind: NodeKind::None,
            children: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.kind == NodeKind::None
    }

    #[inline]
    pub fn children(&self) -> &'b [NodeChild<'s, 'b>] {
        self.children.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum NodeChild<'s, 'b> {
    Node(Node<'s, 'b>),
    Token(Token<'s>),
}

impl<'s, 'b> From<Node<'s, 'b>> for NodeChild<'s, 'b> {
    fn from(node: Node<'s, 'b>) -> Self {
        Self::Node(node)
    }
}

impl<'s, 'b> From<Token<'s>> for NodeChild<'s, 'b> {
    fn from(token: Token<'s>) -> Self {
        Self::Token(token)
    }
}

/// Collects the children of one node into the arena.
pub struct NodeBuilder<'s, 'b> {
    kind: NodeKind,
    children: Vec<'b, NodeChild<'s, 'b>>,
}

impl<'s, 'b> NodeBuilder<'s, 'b> {
    pub fn new(kind: NodeKind, buf: &'b Bump) -> Self {
        Self {
            kind,
            children: Vec::new_in(buf),
        }
    }

    pub fn child(mut self, child: impl Into<NodeChild<'s, 'b>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn finish(self) -> Node<'s, 'b> {
        Node {
            kind: self.kind,
            children: Some(self.children.into_bump_slice()),
        }
    }
}

pub mod ast {
    include!(concat!(env!("OUT_DIR"), "/nodes.rs"));
}
