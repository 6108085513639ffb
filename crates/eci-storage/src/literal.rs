//! Parsing of list and mapping cells.
//!
//! Cells hold JSON (`[1.0, 2.5]`) or Python literals (`{'logic': True}`,
//! `(1, 2)`, `None`). Python literals are rewritten to JSON before decoding.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

/// Decode a list cell; an empty cell is an empty list.
pub fn parse_list<T: DeserializeOwned>(cell: &str) -> Result<Vec<T>, String> {
    parse_cell(cell).map(Option::unwrap_or_default)
}

/// Decode a mapping cell; an empty cell is an empty map.
pub fn parse_map<T: DeserializeOwned>(cell: &str) -> Result<BTreeMap<String, T>, String> {
    parse_cell(cell).map(Option::unwrap_or_default)
}

fn parse_cell<T: DeserializeOwned>(cell: &str) -> Result<Option<T>, String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(cell) {
        Ok(value) => Ok(Some(value)),
        Err(_) => serde_json::from_str(&python_to_json(cell))
            .map(Some)
            .map_err(|e| format!("cannot parse {cell:?}: {e}")),
    }
}

/// Boolean cell: `True`/`False`, `true`/`false`, `1`/`0`.
pub fn parse_bool(cell: &str) -> Result<bool, String> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Ok(true),
        "false" | "0" | "0.0" | "no" => Ok(false),
        other => Err(format!("not a boolean: {other:?}")),
    }
}

/// Rewrite a Python literal into JSON text. Quoting, tuples, and the
/// `True`/`False`/`None`/`nan` keywords are translated; everything else is
/// copied through.
fn python_to_json(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                while let Some(s) = chars.next() {
                    match s {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => {}
                        },
                        s if s == c => break,
                        '"' => out.push_str("\\\""),
                        s => out.push(s),
                    }
                }
                out.push('"');
            }
            '(' => out.push('['),
            ')' => out.push(']'),
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" | "nan" | "NaN" => "null",
                    other => other,
                });
            }
            c => out.push(c),
        }
    }
    out
}
