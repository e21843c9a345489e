use heck::{AsShoutySnakeCase, AsSnakeCase};

#[rustfmt::skip]
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
    "enum", "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop",
    "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static",
    "struct", "super", "trait", "true", "try", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
    "typeof", "unsized", "virtual", "yield",
];

/// Keywords which can't be used even as raw identifiers.
const NOT_RAW: &[&str] = &["self", "Self", "super", "crate", "_"];

pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

pub fn can_be_raw(s: &str) -> bool {
    !NOT_RAW.contains(&s)
}

pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accessor method name for a field, escaped if it collides with a keyword.
pub fn method_name(field: &str) -> String {
    let name = AsSnakeCase(field).to_string();
    if is_keyword(&name) {
        format!("r#{name}")
    } else {
        name
    }
}

/// Name of the associated constant holding a field's child index.
pub fn index_const(field: &str) -> String {
    AsShoutySnakeCase(field).to_string()
}
