//! Identifier and literal helpers for emitted declarations.

use std::collections::BTreeSet;

/// PascalCase identifier for an on-wire name.
///
/// Splits on `-` and `_`, drops empty segments, and upper-cases the first
/// character of each segment. Unicode letters and digits are kept; any other
/// character is dropped. Results that are empty or start with a digit get a
/// `Model` prefix.
pub fn pascal_case(wire_name: &str) -> String {
    let mut out = String::with_capacity(wire_name.len());
    for segment in wire_name.split(['-', '_']).filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    let needs_prefix = out
        .chars()
        .next()
        .map_or(true, |c| c.is_ascii_digit() || !is_identifier_start(c));
    if needs_prefix {
        out.insert_str(0, "Model");
    }
    out.retain(is_identifier_part);
    out
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// True if `name` can appear unquoted as an identifier or property key
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_part),
        _ => false,
    }
}

/// Double-quoted string literal with JSON escaping
pub fn string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Property key: bare when it is an identifier, quoted otherwise
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// Hands out type names, suffixing collisions deterministically.
///
/// The first claimant of a name keeps it; later ones get `2`, `3`, ...
/// A claim also reserves the derived names (`{name}{suffix}`) so that an
/// entity's helper types can never shadow another entity's types.
#[derive(Debug, Default)]
pub struct TypeNamer {
    taken: BTreeSet<String>,
}

impl TypeNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name so no entity is given it
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Unique base identifier for an entity's wire name
    pub fn claim(&mut self, wire_name: &str, suffixes: &[&str]) -> String {
        let base = pascal_case(wire_name);
        let mut n = 1;
        loop {
            let candidate = if n == 1 {
                base.clone()
            } else {
                format!("{}{}", base, n)
            };
            let free = !self.taken.contains(&candidate)
                && suffixes
                    .iter()
                    .all(|s| !self.taken.contains(&format!("{}{}", candidate, s)));
            if free {
                for suffix in suffixes {
                    self.taken.insert(format!("{}{}", candidate, suffix));
                }
                self.taken.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }
}
