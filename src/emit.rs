//! Turns resolved declarations into binding items.
//!
//! Items are plain data describing the generated wrappers, so that the
//! decisions made here can be checked without going through the printer.

use crate::{
    ident,
    parser::{Cardinality, Optionality, RAW_TOKEN},
    schema::{Resolved, ResolvedField, ResolvedKind, ResolvedVariant, Shape},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Token(TokenWrapper),
    Node(NodeWrapper),
    Union(Union),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Token(item) => &item.name,
            Item::Node(item) => &item.name,
            Item::Union(item) => &item.name,
        }
    }
}

/// Wrapper over a token whose tag is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWrapper {
    pub name: String,
    pub tag: String,
    /// The cast also accepts the empty token.
    pub nullable: bool,
}

/// Wrapper over a node whose kind is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeWrapper {
    pub name: String,
    pub accessors: Vec<Accessor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub method: String,
    pub index_const: String,
    /// Child index. Lists read from here to the last child.
    pub index: usize,
    /// Field name as declared.
    pub field: String,
    pub ty: String,
    pub shape: Shape,
    pub access: Access,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Required,
    Optional,
    List,
}

/// Tagged union over the variants of an enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub name: String,
    pub variants: Vec<UnionVariant>,
    /// Dispatch on `node.kind()`. Empty if no variant holds a node.
    pub node_arms: Vec<Arm>,
    /// Dispatch on `token.tag()`. Empty if no variant holds a token.
    pub token_arms: Vec<Arm>,
}

impl Union {
    #[inline]
    pub fn has_node(&self) -> bool {
        !self.node_arms.is_empty()
    }

    #[inline]
    pub fn has_token(&self) -> bool {
        !self.token_arms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionVariant {
    pub name: String,
    pub ty: String,
    pub node: bool,
    pub token: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arm {
    /// `NodeKind` or `Tag` variants matched by this arm.
    pub patterns: Vec<String>,
    pub variant: String,
    pub ty: String,
}

pub fn emit(resolved: &[Resolved<'_>]) -> Vec<Item> {
    resolved.iter().map(emit_item).collect()
}

fn emit_item(decl: &Resolved<'_>) -> Item {
    match &decl.kind {
        ResolvedKind::TokenLeaf { tag, nullable } => Item::Token(TokenWrapper {
            name: decl.name.into(),
            tag: (*tag).into(),
            nullable: *nullable,
        }),
        ResolvedKind::Struct(fields) => Item::Node(NodeWrapper {
            name: decl.name.into(),
            accessors: fields.iter().enumerate().map(accessor).collect(),
        }),
        ResolvedKind::Enum(variants) => Item::Union(union(decl.name, variants)),
    }
}

fn accessor((index, field): (usize, &ResolvedField<'_>)) -> Accessor {
    let access = match (field.cardinality, field.optionality) {
        (Cardinality::List, _) => Access::List,
        (Cardinality::Single, Optionality::Optional) => Access::Optional,
        (Cardinality::Single, Optionality::Required) => Access::Required,
    };
    let ty = match field.shape {
        Shape::Raw => RAW_TOKEN,
        _ => field.ty,
    };

    Accessor {
        method: ident::method_name(field.name),
        index_const: ident::index_const(field.name),
        index,
        field: field.name.into(),
        ty: ty.into(),
        shape: field.shape,
        access,
    }
}

fn union(name: &str, variants: &[ResolvedVariant<'_>]) -> Union {
    Union {
        name: name.into(),
        variants: variants
            .iter()
            .map(|variant| UnionVariant {
                name: variant.name.into(),
                ty: variant.ty.into(),
                node: variant.has_node(),
                token: variant.has_token(),
            })
            .collect(),
        node_arms: arms(variants, |variant| variant.kinds.as_slice()),
        token_arms: arms(variants, |variant| variant.tags.as_slice()),
    }
}

/// One arm per variant with at least one key, in declaration order.
fn arms<'v, 'a: 'v>(
    variants: &'v [ResolvedVariant<'a>],
    keys: impl Fn(&'v ResolvedVariant<'a>) -> &'v [&'a str],
) -> Vec<Arm> {
    variants
        .iter()
        .filter(|variant| !keys(*variant).is_empty())
        .map(|variant| Arm {
            patterns: keys(variant).iter().map(|key| key.to_string()).collect(),
            variant: variant.name.into(),
            ty: variant.ty.into(),
        })
        .collect()
}
