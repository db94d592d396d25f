//! Naming transforms shared by every generator component.
//!
//! Model class names, table names, route prefixes, and test filenames are all
//! derived through these functions so they stay mutually consistent.

use convert_case::{Case, Casing};

/// Convert a string to snake_case.
///
/// Every uppercase letter starts a new word, so `to_pascal_case` is an
/// exact inverse even for single-letter segments (`XYZ` -> `x_y_z`, not
/// the acronym collapse `xyz`).
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a snake_case string to PascalCase. Word boundaries are the
/// underscores, nothing else.
pub fn to_pascal_case(s: &str) -> String {
    s.from_case(Case::Snake).to_case(Case::Pascal)
}

/// Pluralize an English word.
///
/// The rule table is fixed: file paths and route prefixes depend on it, so it
/// must not change between releases. No singularization inverse exists.
pub fn pluralize(word: &str) -> String {
    if word.ends_with("ch") || word.ends_with("sh") || word.ends_with('s') {
        format!("{}es", word)
    } else if word.ends_with('y') {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{}s", word)
    }
}

/// Check that a name is a valid Python identifier (the generated artifacts
/// are Python source, so host-identifier syntax means Python's).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
