use super::{Error, ErrorKind, Report};
use crate::span::Span;

fn unknown_foo() -> Error {
    Error::new(
        ErrorKind::UnknownType {
            name: "Foo".into(),
            rejected: false,
        },
        2,
        "A{x:Foo}",
        Span::from(10..13u32),
    )
}

#[test]
fn messages() {
    assert_eq!(
        ErrorKind::Duplicate {
            name: "Block".into(),
            other_lines: vec![3],
        }
        .to_string(),
        "duplicate declaration `Block` (also declared on line 3)"
    );
    assert_eq!(
        ErrorKind::Duplicate {
            name: "Block".into(),
            other_lines: vec![1, 4],
        }
        .to_string(),
        "duplicate declaration `Block` (also declared on lines 1, 4)"
    );
    assert_eq!(
        ErrorKind::UnknownType {
            name: "Stmt".into(),
            rejected: true,
        }
        .to_string(),
        "unknown type `Stmt` (its declaration was rejected)"
    );
    assert_eq!(unknown_foo().to_string(), "line 2: unknown type `Foo`");
}

#[test]
fn render_points_at_span() {
    let src = "Ident\nA{x:Foo}\n";
    let rendered = unknown_foo().render(src).to_string();
    insta::assert_snapshot!(rendered, @r"
    error: unknown type `Foo`
      |
    2 | A{x:Foo}
      |     ^^^
    ");
}

#[test]
fn render_without_line() {
    assert_eq!(
        Error::empty().render("").to_string(),
        "error: no declarations to emit"
    );
}

#[test]
fn report_is_sorted_by_line() {
    let mut report = Report::default();
    report.push(unknown_foo());
    report.push(Error::new(
        ErrorKind::Malformed("bad".into()),
        1,
        "??",
        Span::from(0..2u32),
    ));
    report.sort();

    let lines: Vec<usize> = report.errors().iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert_eq!(report.len(), 2);
    assert!(
        report
            .render("??\nA{x:Foo}\n")
            .to_string()
            .ends_with("2 errors reported")
    );
}
