//! Identifier quoting shared by the renderer and the differ's system-object
//! guard: both need to know whether two spellings of a name are the "same"
//! identifier (quote-insensitive) independent of whether that name needs
//! backticks to round-trip through the lexer.

/// ClickHouse keywords that collide with a bare identifier if unquoted.
/// Not exhaustive against the full grammar; covers the words this crate's
/// own statement grammar reserves.
const RESERVED: &[&str] = &[
    "select", "from", "where", "group", "order", "by", "having", "limit", "offset", "settings",
    "as", "on", "join", "table", "database", "view", "dictionary", "create", "alter", "drop",
    "rename", "attach", "detach", "grant", "revoke", "to", "role", "function", "default", "null",
    "array", "map", "tuple", "nested", "engine", "final",
];

fn needs_quoting(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        return true;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return true;
    }
    RESERVED.iter().any(|k| k.eq_ignore_ascii_case(name))
}

/// Renders an identifier, backtick-quoting it only when required so plain
/// names stay readable (spec.md §4.2 canonical form).
pub fn quote_ident(name: &str) -> String {
    if needs_quoting(name) {
        format!("`{}`", name.replace('`', "\\`"))
    } else {
        name.to_string()
    }
}

pub fn quote_qualified(database: Option<&str>, name: &str) -> String {
    match database {
        Some(db) => format!("{}.{}", quote_ident(db), quote_ident(name)),
        None => quote_ident(name),
    }
}
