//! Formats binding items as Rust source.

use std::fmt::Write as _;

use crate::{
    emit::{Access, Accessor, Arm, Item, NodeWrapper, TokenWrapper, Union},
    output::Options,
    schema::Shape,
};

pub const HEADER: &str = "// @generated by treegen. Do not edit by hand.";

macro_rules! ln {
    ($f:ident, $($tt:tt)*) => (writeln!($f, $($tt)*).unwrap());
    ($f:ident) => (writeln!($f).unwrap());
}

macro_rules! ml {
    ($f:ident, $($tt:tt)*) => (indoc::writedoc!($f, $($tt)*).unwrap());
}

pub fn print(items: &[Item], options: &Options) -> String {
    let mut out = String::new();

    ln!(out, "{HEADER}");
    print_prelude(&options.prelude, &mut out);
    if options.runtime {
        print_runtime(&mut out);
    }

    for item in items {
        ln!(out);
        match item {
            Item::Token(item) => print_token_wrapper(item, &mut out),
            Item::Node(item) => print_node_wrapper(item, &mut out),
            Item::Union(item) => print_union(item, &mut out),
        }
    }

    out
}

fn print_prelude(prelude: &str, out: &mut String) {
    let prelude = prelude.trim();
    if prelude.is_empty() {
        return;
    }

    ln!(out);
    ln!(out, "{prelude}");
}

fn print_runtime(out: &mut String) {
    let runtime = include_str!("./runtime.rs");

    let file_start_marker = "//file-start";
    let runtime = runtime
        .find(file_start_marker)
        .map(|i| &runtime[i + file_start_marker.len()..])
        .unwrap_or(runtime);

    out.push_str(runtime);
}

fn print_token_wrapper(item: &TokenWrapper, out: &mut String) {
    let TokenWrapper {
        name,
        tag,
        nullable,
    } = item;

    let check = if *nullable {
        format!("debug_assert!(token.tag() == Tag::{tag} || token.is_empty());")
    } else {
        format!("debug_assert_eq!(token.tag(), Tag::{tag});")
    };

    ml!(
        out,
        "
        #[derive(Debug, Clone, Copy)]
        pub struct {name}<'s, 'b> {{
            token: &'b Token<'s>,
        }}

        impl<'s, 'b> AstToken<'s, 'b> for {name}<'s, 'b> {{
            #[inline]
            fn cast(token: &'b Token<'s>) -> Self {{
                {check}
                Self {{ token }}
            }}

            #[inline]
            fn token(&self) -> &'b Token<'s> {{
                self.token
            }}
        }}
        "
    );
}

fn print_node_wrapper(item: &NodeWrapper, out: &mut String) {
    let NodeWrapper { name, accessors } = item;

    ml!(
        out,
        "
        #[derive(Debug, Clone, Copy)]
        pub struct {name}<'s, 'b> {{
            node: &'b Node<'s, 'b>,
        }}

        impl<'s, 'b> AstNode<'s, 'b> for {name}<'s, 'b> {{
            #[inline]
            fn cast(node: &'b Node<'s, 'b>) -> Self {{
                debug_assert_eq!(node.kind(), NodeKind::{name});
                Self {{ node }}
            }}

            #[inline]
            fn node(&self) -> &'b Node<'s, 'b> {{
                self.node
            }}
        }}
        "
    );

    if accessors.is_empty() {
        return;
    }

    ln!(out);
    ln!(out, "impl<'s, 'b> {name}<'s, 'b> {{");
    for accessor in accessors {
        ln!(
            out,
            "    pub const {}: usize = {};",
            accessor.index_const,
            accessor.index
        );
    }
    for accessor in accessors {
        ln!(out);
        print_accessor(name, accessor, out);
    }
    ln!(out, "}}");
}

fn value_type(accessor: &Accessor) -> String {
    match accessor.shape {
        Shape::Raw => "&'b Token<'s>".into(),
        _ => format!("{}<'s, 'b>", accessor.ty),
    }
}

/// Expressions for the `NodeChild::Node` and `NodeChild::Token` arms,
/// each with the binding it needs.
fn child_arms(owner: &str, accessor: &Accessor) -> [(&'static str, String); 2] {
    let ty = &accessor.ty;
    let optional = accessor.access == Access::Optional;
    let mismatch = |expected: &str| {
        (
            "_",
            format!(
                "unreachable!(\"`{owner}::{}` expects a {expected}\")",
                accessor.field
            ),
        )
    };

    let node_cast = format!("<{ty}<'s, 'b> as AstNode<'s, 'b>>::cast(node)");
    let token_cast = format!("<{ty}<'s, 'b> as AstToken<'s, 'b>>::cast(token)");
    let node = |cast: String| {
        if optional {
            ("node", format!("(!node.is_null()).then(|| {cast})"))
        } else {
            ("node", cast)
        }
    };
    let token = |cast: String| {
        if optional {
            ("token", format!("(!token.is_empty()).then(|| {cast})"))
        } else {
            ("token", cast)
        }
    };

    match accessor.shape {
        Shape::Node => [node(node_cast), mismatch("node")],
        Shape::Token => [mismatch("token"), token(token_cast)],
        Shape::Polymorphic => [node(node_cast), token(token_cast)],
        Shape::Raw if optional => [
            mismatch("token"),
            ("token", "(!token.is_empty()).then_some(token)".into()),
        ],
        Shape::Raw => [mismatch("token"), ("token", "token".into())],
    }
}

fn print_accessor(owner: &str, accessor: &Accessor, out: &mut String) {
    let method = &accessor.method;
    let index = &accessor.index_const;
    let value = value_type(accessor);
    let [(node, node_expr), (token, token_expr)] = child_arms(owner, accessor);

    match accessor.access {
        Access::Required | Access::Optional => {
            let ret = match accessor.access {
                Access::Optional => format!("Option<{value}>"),
                _ => value,
            };
            ln!(out, "    pub fn {method}(&self) -> {ret} {{");
            ln!(out, "        match &self.node.children()[Self::{index}] {{");
            ln!(out, "            NodeChild::Node({node}) => {node_expr},");
            ln!(out, "            NodeChild::Token({token}) => {token_expr},");
            ln!(out, "        }}");
            ln!(out, "    }}");
        }
        Access::List => {
            ln!(
                out,
                "    pub fn {method}(&self) -> impl Iterator<Item = {value}> + use<'s, 'b> {{"
            );
            ln!(out, "        self.node.children()[Self::{index}..]");
            ln!(out, "            .iter()");
            ln!(out, "            .map(|child| match child {{");
            ln!(out, "                NodeChild::Node({node}) => {node_expr},");
            ln!(out, "                NodeChild::Token({token}) => {token_expr},");
            ln!(out, "            }})");
            ln!(out, "    }}");
        }
    }
}

fn print_union(item: &Union, out: &mut String) {
    let name = &item.name;

    ln!(out, "#[derive(Debug, Clone, Copy)]");
    ln!(out, "pub enum {name}<'s, 'b> {{");
    for variant in &item.variants {
        ln!(out, "    {}({}<'s, 'b>),", variant.name, variant.ty);
    }
    ln!(out, "}}");

    if item.has_node() {
        let holds_all = item.variants.iter().all(|v| v.node);
        let delegates = item.variants.iter().filter(|v| v.node).map(|v| v.name.as_str());
        ln!(out);
        ln!(out, "impl<'s, 'b> AstNode<'s, 'b> for {name}<'s, 'b> {{");
        ln!(out, "    #[inline]");
        ln!(out, "    fn cast(node: &'b Node<'s, 'b>) -> Self {{");
        ln!(out, "        match node.kind() {{");
        print_dispatch_arms(&item.node_arms, "NodeKind", "AstNode", "node", out);
        ln!(
            out,
            "            kind => unreachable!(\"node kind {{kind:?}} is not a `{name}`\"),"
        );
        ln!(out, "        }}");
        ln!(out, "    }}");
        ln!(out);
        ln!(out, "    #[inline]");
        ln!(out, "    fn node(&self) -> &'b Node<'s, 'b> {{");
        print_delegation(name, delegates, holds_all, "AstNode::node", "node", out);
        ln!(out, "    }}");
        ln!(out, "}}");
    }

    if item.has_token() {
        let holds_all = item.variants.iter().all(|v| v.token);
        let delegates = item.variants.iter().filter(|v| v.token).map(|v| v.name.as_str());
        ln!(out);
        ln!(out, "impl<'s, 'b> AstToken<'s, 'b> for {name}<'s, 'b> {{");
        ln!(out, "    #[inline]");
        ln!(out, "    fn cast(token: &'b Token<'s>) -> Self {{");
        ln!(out, "        match token.tag() {{");
        print_dispatch_arms(&item.token_arms, "Tag", "AstToken", "token", out);
        ln!(
            out,
            "            tag => unreachable!(\"token tag {{tag:?}} is not a `{name}`\"),"
        );
        ln!(out, "        }}");
        ln!(out, "    }}");
        ln!(out);
        ln!(out, "    #[inline]");
        ln!(out, "    fn token(&self) -> &'b Token<'s> {{");
        print_delegation(name, delegates, holds_all, "AstToken::token", "token", out);
        ln!(out, "    }}");
        ln!(out, "}}");
    }
}

fn print_dispatch_arms(arms: &[Arm], discriminant: &str, cast: &str, arg: &str, out: &mut String) {
    for arm in arms {
        let patterns = arm
            .patterns
            .iter()
            .map(|pattern| format!("{discriminant}::{pattern}"))
            .collect::<Vec<_>>()
            .join(" | ");
        let Arm { variant, ty, .. } = arm;
        ln!(
            out,
            "            {patterns} => Self::{variant}(<{ty}<'s, 'b> as {cast}<'s, 'b>>::cast({arg})),"
        );
    }
}

fn print_delegation<'v>(
    name: &str,
    variants: impl Iterator<Item = &'v str>,
    holds_all: bool,
    method: &str,
    payload: &str,
    out: &mut String,
) {
    ln!(out, "        match self {{");
    for variant in variants {
        ln!(out, "            Self::{variant}(inner) => {method}(inner),");
    }
    if !holds_all {
        ln!(
            out,
            "            _ => unreachable!(\"`{name}` does not hold a {payload}\"),"
        );
    }
    ln!(out, "        }}");
}
