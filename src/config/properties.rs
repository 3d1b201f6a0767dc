//! Key/value text format.
//!
//! ```text
//! # comment
//! ! also a comment
//! db.url = jdbc:postgresql://localhost/app
//! db.pool : 10
//! greeting = hello \
//!            world
//! flag
//! ```
//!
//! Lines are trimmed; blank and comment lines are skipped. The key ends at the
//! first unescaped `=`, `:` or whitespace. A trailing backslash joins the next
//! line. A key without a separator gets an empty value.

use std::collections::BTreeMap;

/// Entries of one source, ordered by key.
pub type Properties = BTreeMap<String, String>;

/// Parse key/value text. Later duplicates of a key replace earlier ones.
pub fn parse_properties(text: &str) -> Properties {
    let mut props = Properties::new();
    for line in logical_lines(text) {
        let (key, value) = split_entry(&line);
        props.insert(unescape(key), unescape(value));
    }
    props
}

/// Join continuation lines and drop blanks and comments.
fn logical_lines(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        let mut current = match pending.take() {
            Some(mut acc) => {
                acc.push_str(line);
                acc
            }
            None => {
                if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                    continue;
                }
                line.to_string()
            }
        };

        if ends_with_continuation(&current) {
            current.pop();
            pending = Some(current);
        } else {
            out.push(current);
        }
    }

    // Continuation on the last line: keep what we have.
    if let Some(rest) = pending
        && !rest.trim().is_empty()
    {
        out.push(rest);
    }
    out
}

/// True if the line ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'=' | b':' => {
                return (line[..i].trim(), line[i + 1..].trim());
            }
            b if b.is_ascii_whitespace() => {
                let key = &line[..i];
                let rest = line[i..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (key, rest.trim());
            }
            _ => i += 1,
        }
    }
    (line, "")
}

/// Decode `\t`, `\n`, `\r`, `\f`, `\uXXXX` and identity escapes.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    _ => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Escape a key or value so [`parse_properties`] reads it back unchanged.
///
/// Lines are trimmed on reading, so whitespace at either end is always
/// escaped: a leading space as `\ `, anything trailing as `\uXXXX`.
pub fn escape(raw: &str, is_key: bool) -> String {
    let body_start = raw.len() - raw.trim_start().len();
    let body_end = raw.trim_end().len();
    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.char_indices() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{000C}' => out.push_str("\\f"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            // A trailing `\ ` would lose its space to trimming
            c if i >= body_end && c.is_whitespace() => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            ' ' if is_key || i < body_start => out.push_str("\\ "),
            c if i < body_start && c.is_whitespace() => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            '#' | '!' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
