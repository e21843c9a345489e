use super::{LineKind, lines, read_line};
use crate::error::ErrorKind;

#[test]
fn blank_and_comment_lines_are_dropped() {
    let src = "Ident\n\n   \n// terminals end here\nBlock{stmts:[Stmt]}\r\n";
    let lines = lines(src);

    let numbers: Vec<usize> = lines.iter().map(|l| l.number).collect();
    assert_eq!(numbers, vec![1, 5]);
    assert_eq!(lines[1].text, "Block{stmts:[Stmt]}");
    assert_eq!(&src[lines[1].offset as usize..][..5], "Block");
}

#[test]
fn three_way_classification() {
    let src = "Ident\nBlock{stmts:[Stmt]}\nExpr<Lit:Int,Bin:BinExpr>";
    let decls: Vec<_> = lines(src)
        .into_iter()
        .map(|line| read_line(line).unwrap())
        .collect();

    assert_eq!(decls[0].kind, LineKind::TokenLeaf);
    assert_eq!(decls[0].name, "Ident");
    assert_eq!(decls[0].body, "");

    assert_eq!(decls[1].kind, LineKind::Struct);
    assert_eq!(decls[1].name, "Block");
    assert_eq!(decls[1].body, "{stmts:[Stmt]}");

    assert_eq!(decls[2].kind, LineKind::Enum);
    assert_eq!(decls[2].name, "Expr");
    assert_eq!(decls[2].body, "<Lit:Int,Bin:BinExpr>");
    assert_eq!(&src[decls[2].name_span], "Expr");
}

#[test]
fn first_delimiter_wins() {
    // `{` comes before `<`, so this is a struct with a malformed body
    let src = "Weird{a:B}<C>";
    let decl = read_line(lines(src)[0]).unwrap();
    assert_eq!(decl.kind, LineKind::Struct);
    assert_eq!(decl.body, "{a:B}<C>");
}

#[test]
fn name_is_trimmed() {
    let src = "  IfExpr  { cond : Expr }";
    let decl = read_line(lines(src)[0]).unwrap();
    assert_eq!(decl.name, "IfExpr");
    assert_eq!(&src[decl.name_span], "IfExpr");
    assert_eq!(&src[decl.body_offset as usize..], "{ cond : Expr }");
}

#[test]
fn invalid_names() {
    let cases = [
        ("Foo Bar", "invalid declaration name `Foo Bar`"),
        ("{a:B}", "missing declaration name"),
        ("type{a:B}", "`type` is a reserved word"),
        ("Token", "`Token` is reserved for raw token fields"),
        ("9Lives", "invalid declaration name `9Lives`"),
        ("Tag", "`Tag` is reserved for the tree and runtime types"),
        ("NodeChild{a:Tag}", "`NodeChild` is reserved for the tree and runtime types"),
        ("AstNode", "`AstNode` is reserved for the tree and runtime types"),
        ("AstToken<A>", "`AstToken` is reserved for the tree and runtime types"),
        ("Node", "`Node` is reserved for the tree and runtime types"),
        ("NodeKind{}", "`NodeKind` is reserved for the tree and runtime types"),
    ];

    for (src, message) in cases {
        let err = read_line(lines(src)[0]).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.text, src);
        assert!(matches!(err.kind, ErrorKind::Malformed(_)));
        assert_eq!(err.kind.to_string(), message, "{src}");
    }
}
