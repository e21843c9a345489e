use std::ptr;

use bumpalo::Bump;
use syntax::ast::{self, AstNode, AstToken};
use syntax::{Node, NodeBuilder, NodeKind, Tag, Token};

fn ident(name: &str) -> Token<'_> {
    Token::new(Tag::Ident, name)
}

fn int(lexeme: &str) -> Token<'_> {
    Token::new(Tag::Number, lexeme)
}

#[test]
fn list_children_in_order() {
    let buf = Bump::new();
    let expr_stmt = NodeBuilder::new(NodeKind::ExprStmt, &buf)
        .child(int("1"))
        .finish();
    let var = NodeBuilder::new(NodeKind::VarDecl, &buf)
        .child(ident("x"))
        .child(Node::null())
        .child(int("2"))
        .finish();
    let block = NodeBuilder::new(NodeKind::Block, &buf)
        .child(Token::new(Tag::Semicolon, ";"))
        .child(expr_stmt)
        .child(var)
        .finish();
    let block = ast::Block::cast(buf.alloc(block));

    let stmts: Vec<_> = block.stmts().collect();
    assert_eq!(stmts.len(), 3);
    assert!(matches!(stmts[0], ast::Stmt::Empty(_)));

    let ast::Stmt::Expr(stmt) = stmts[1] else {
        panic!("expected expression statement, got {:?}", stmts[1]);
    };
    let ast::Expr::Lit(ast::Literal::Int(value)) = stmt.expr() else {
        panic!("expected integer literal, got {:?}", stmt.expr());
    };
    assert_eq!(value.token().lexeme(), "1");

    let ast::Stmt::Var(var) = stmts[2] else {
        panic!("expected variable declaration, got {:?}", stmts[2]);
    };
    assert_eq!(var.name().token().lexeme(), "x");
    assert!(var.ty().is_none());
    assert!(matches!(var.value(), Some(ast::Expr::Lit(ast::Literal::Int(_)))));

    // iteration can be restarted
    assert_eq!(block.stmts().count(), 3);
    assert_eq!(block.stmts().count(), 3);
}

#[test]
fn empty_list() {
    let buf = Bump::new();
    let params = NodeBuilder::new(NodeKind::ParamList, &buf).finish();
    let params = ast::ParamList::cast(buf.alloc(params));
    assert_eq!(params.params().count(), 0);
}

#[test]
fn list_after_fixed_children() {
    let buf = Bump::new();
    let neg = NodeBuilder::new(NodeKind::Prefix, &buf)
        .child(Token::new(Tag::Minus, "-"))
        .child(int("2"))
        .finish();
    let call = NodeBuilder::new(NodeKind::CallExpr, &buf)
        .child(ident("f"))
        .child(int("1"))
        .child(neg)
        .finish();
    let call = ast::CallExpr::cast(buf.alloc(call));

    assert!(matches!(call.callee(), ast::Expr::Ident(_)));
    let args: Vec<_> = call.args().collect();
    assert_eq!(args.len(), 2);
    assert!(matches!(args[0], ast::Expr::Lit(ast::Literal::Int(_))));
    let ast::Expr::Prefix(prefix) = args[1] else {
        panic!("expected prefix expression, got {:?}", args[1]);
    };
    assert_eq!(prefix.op().tag(), Tag::Minus);
}

#[test]
fn absent_optional_children() {
    let buf = Bump::new();
    let var = NodeBuilder::new(NodeKind::VarDecl, &buf)
        .child(ident("x"))
        .child(Node::null())
        .child(Token::empty())
        .finish();
    let var = ast::VarDecl::cast(buf.alloc(var));
    assert!(var.ty().is_none());
    assert!(var.value().is_none());

    let block = NodeBuilder::new(NodeKind::Block, &buf).finish();
    let cond = Token::new(Tag::Bool, "true");
    let if_expr = NodeBuilder::new(NodeKind::IfExpr, &buf)
        .child(cond)
        .child(block)
        .child(Node::null())
        .finish();
    let if_expr = ast::IfExpr::cast(buf.alloc(if_expr));
    assert!(if_expr.alt().is_none());
    assert!(matches!(if_expr.cond(), ast::Expr::Lit(ast::Literal::Bool(_))));
    assert_eq!(if_expr.then().stmts().count(), 0);
}

#[test]
fn present_optional_children() {
    let buf = Bump::new();
    let inner = NodeBuilder::new(NodeKind::IfExpr, &buf)
        .child(ident("b"))
        .child(NodeBuilder::new(NodeKind::Block, &buf).finish())
        .child(Node::null())
        .finish();
    let outer = NodeBuilder::new(NodeKind::IfExpr, &buf)
        .child(ident("a"))
        .child(NodeBuilder::new(NodeKind::Block, &buf).finish())
        .child(inner)
        .finish();
    let outer = ast::IfExpr::cast(buf.alloc(outer));

    let Some(ast::IfAlt::ElseIf(inner)) = outer.alt() else {
        panic!("expected `else if`, got {:?}", outer.alt());
    };
    let ast::Expr::Ident(cond) = inner.cond() else {
        panic!("expected identifier, got {:?}", inner.cond());
    };
    assert_eq!(cond.token().lexeme(), "b");
    assert!(inner.alt().is_none());
}

#[test]
fn nullable_token_leaf() {
    let buf = Bump::new();
    let attr = NodeBuilder::new(NodeKind::Attr, &buf)
        .child(Token::empty())
        .child(Token::new(Tag::String, "\"x\""))
        .finish();
    let attr = ast::Attr::cast(buf.alloc(attr));

    assert!(attr.name().token().is_empty());
    let Some(ast::Literal::Str(value)) = attr.value() else {
        panic!("expected string literal, got {:?}", attr.value());
    };
    assert_eq!(value.token().lexeme(), "\"x\"");
}

#[test]
fn polymorphic_dispatch() {
    let buf = Bump::new();
    let group = NodeBuilder::new(NodeKind::Group, &buf)
        .child(int("1"))
        .finish();
    let infix = NodeBuilder::new(NodeKind::Infix, &buf)
        .child(ident("a"))
        .child(Token::new(Tag::Plus, "+"))
        .child(group)
        .finish();
    let node: &Node = buf.alloc(infix);

    let ast::Expr::Infix(infix) = <ast::Expr as AstNode>::cast(node) else {
        panic!("expected infix expression");
    };
    assert!(matches!(infix.left(), ast::Expr::Ident(_)));
    assert_eq!(infix.op().tag(), Tag::Plus);
    assert_eq!(infix.op().lexeme(), "+");

    let ast::Expr::Group(group) = infix.right() else {
        panic!("expected group, got {:?}", infix.right());
    };
    let ast::Expr::Lit(ast::Literal::Int(value)) = group.expr() else {
        panic!("expected integer literal, got {:?}", group.expr());
    };
    assert_eq!(value.token().lexeme(), "1");

    let token: &Token = buf.alloc(Token::new(Tag::String, "\"s\""));
    let expr = <ast::Expr as AstToken>::cast(token);
    assert!(matches!(expr, ast::Expr::Lit(ast::Literal::Str(_))));
    assert!(ptr::eq(AstToken::token(&expr), token));
}

#[test]
fn keyword_field() {
    let buf = Bump::new();
    let array = NodeBuilder::new(NodeKind::ArrayType, &buf)
        .child(ident("u8"))
        .child(int("4"))
        .finish();
    let param = NodeBuilder::new(NodeKind::Param, &buf)
        .child(ident("xs"))
        .child(array)
        .finish();
    let param = ast::Param::cast(buf.alloc(param));

    let ast::TypeExpr::Array(array) = param.r#type() else {
        panic!("expected array type, got {:?}", param.r#type());
    };
    let ast::TypeExpr::Name(elem) = array.elem() else {
        panic!("expected type name, got {:?}", array.elem());
    };
    assert_eq!(elem.token().lexeme(), "u8");
    assert_eq!(array.len().map(|len| len.token().lexeme()), Some("4"));
}

#[test]
fn index_constants() {
    assert_eq!(ast::IfExpr::COND, 0);
    assert_eq!(ast::IfExpr::THEN, 1);
    assert_eq!(ast::IfExpr::ALT, 2);
    assert_eq!(ast::Param::TYPE, 1);
    assert_eq!(ast::FnDef::ATTRS, 4);
}

#[test]
fn function_definition() {
    let buf = Bump::new();
    let param = NodeBuilder::new(NodeKind::Param, &buf)
        .child(ident("n"))
        .child(ident("int"))
        .finish();
    let params = NodeBuilder::new(NodeKind::ParamList, &buf)
        .child(param)
        .finish();
    let attr = NodeBuilder::new(NodeKind::Attr, &buf)
        .child(ident("inline"))
        .child(Token::empty())
        .finish();
    let body = NodeBuilder::new(NodeKind::Block, &buf).finish();
    let def = NodeBuilder::new(NodeKind::FnDef, &buf)
        .child(ident("f"))
        .child(params)
        .child(Node::null())
        .child(body)
        .child(attr)
        .finish();
    let def: &Node = buf.alloc(def);

    let ast::Stmt::Fn(f) = <ast::Stmt as AstNode>::cast(def) else {
        panic!("expected function definition");
    };
    assert_eq!(f.name().token().lexeme(), "f");
    assert!(f.ret().is_none());
    assert_eq!(f.params().params().count(), 1);

    let attrs: Vec<_> = f.attrs().collect();
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs[0].name().token().lexeme(), "inline");
    assert!(attrs[0].value().is_none());
}

#[test]
fn wrappers_return_the_underlying_node() {
    let buf = Bump::new();
    let block = NodeBuilder::new(NodeKind::Block, &buf).finish();
    let node: &Node = buf.alloc(block);

    let block = ast::Block::cast(node);
    assert!(ptr::eq(block.node(), node));

    let expr = <ast::Expr as AstNode>::cast(node);
    assert!(matches!(expr, ast::Expr::Block(_)));
    assert!(ptr::eq(AstNode::node(&expr), node));
}

#[test]
#[should_panic(expected = "is not a `Expr`")]
fn dispatch_rejects_unknown_kind() {
    let buf = Bump::new();
    let node: &Node = buf.alloc(NodeBuilder::new(NodeKind::ParamList, &buf).finish());
    let _ = <ast::Expr as AstNode>::cast(node);
}

#[test]
#[should_panic(expected = "does not hold a token")]
fn node_variant_has_no_token() {
    let buf = Bump::new();
    let node: &Node = buf.alloc(NodeBuilder::new(NodeKind::Block, &buf).finish());
    let expr = <ast::Expr as AstNode>::cast(node);
    let _ = AstToken::token(&expr);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "assertion")]
fn cast_checks_node_kind() {
    let buf = Bump::new();
    let node: &Node = buf.alloc(NodeBuilder::new(NodeKind::Block, &buf).finish());
    let _ = ast::Group::cast(node);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "assertion")]
fn cast_checks_token_tag() {
    let token = Token::new(Tag::String, "\"s\"");
    let _ = ast::Int::cast(&token);
}
