//! Plugin markers inside selectors and conditions.
//!
//! A style rule invokes a plugin with an attribute-like marker anywhere in its selector:
//!
//! ```text
//! .card [--grid="3, true"]     prefix ".card ", name "grid", value "3, true"
//! [--reset]                    prefix "",       name "reset", no value
//! ```
//!
//! A grouping rule invokes one with a call in its condition: `--grid(3, "auto")`.

use crate::token::unescape;

/// A marker found in a style rule's selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorMarker<'a> {
    /// Selector text before the marker's `[`.
    pub prefix: &'a str,
    /// Dash-case name after the leading `--`.
    pub name: &'a str,
    /// Attribute value with quotes removed and escapes resolved.
    pub value: Option<String>,
}

/// A plugin call found in a grouping rule's condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionCall<'a> {
    pub name: &'a str,
    /// Text between the call's parentheses.
    pub args: &'a str,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Find the first `[--name]`, `[--name="..."]` or `[--name='...']` marker in a selector.
///
/// Quoted attribute values are skipped, so `a[title="[--x]"]` has no marker.
pub fn find_selector_marker(selector: &str) -> Option<SelectorMarker<'_>> {
    let bytes = selector.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            // Escaped selector character, e.g. `.w-1\/2`
            b'\\' => i += 1,
            b'[' => {
                if let Some(marker) = marker_at(selector, i) {
                    return Some(marker);
                }
            }
            quote @ (b'"' | b'\'') => i = closing_quote(bytes, i + 1, quote),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `quote` closing a string whose body starts at `from`, or the end of input.
fn closing_quote(bytes: &[u8], from: usize, quote: u8) -> usize {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b if b == quote => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Try to read a marker whose `[` is at byte `open`.
fn marker_at(selector: &str, open: usize) -> Option<SelectorMarker<'_>> {
    let inner = &selector[open + 1..];
    let body = inner.trim_start();
    let rest = body.strip_prefix("--")?;

    let name_len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
    let name = &rest[..name_len];
    if name.is_empty() {
        return None;
    }

    let after = rest[name_len..].trim_start();
    let value = if after.starts_with(']') {
        None
    } else {
        let raw = after.strip_prefix('=')?.trim_start();
        let (value, tail) = attribute_value(raw)?;
        if !tail.trim_start().starts_with(']') {
            return None;
        }
        Some(value)
    };

    Some(SelectorMarker {
        prefix: &selector[..open],
        name,
        value,
    })
}

/// Split an attribute value off the front of `raw`, returning it and the rest.
fn attribute_value(raw: &str) -> Option<(String, &str)> {
    match raw.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &raw[1..];
            let mut escaped = false;
            for (i, c) in body.char_indices() {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    c if c == quote => return Some((unescape(&body[..i]), &body[i + 1..])),
                    _ => {}
                }
            }
            None
        }
        _ => {
            let end = raw.find(']')?;
            Some((unescape(raw[..end].trim_end()), &raw[end..]))
        }
    }
}

/// Find `--name(args)` in a grouping rule's condition.
///
/// The call may sit inside extra parentheses, `(--grid(2))`, and need not be the first
/// custom property in the condition: `(--x: 1) and --grid(2)`. Quoted text is skipped.
pub fn find_condition_call(condition: &str) -> Option<ConditionCall<'_>> {
    let bytes = condition.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            quote @ (b'"' | b'\'') => i = closing_quote(bytes, i + 1, quote),
            b'-' if bytes.get(i + 1) == Some(&b'-') => match call_at(condition, i + 2) {
                Ok(call) => return Some(call),
                // Resume after the name so `--a--b(` is not read as `b(`.
                Err(name_end) => i = name_end.max(i + 2) - 1,
            },
            _ => {}
        }
        i += 1;
    }
    None
}

/// Read `name(args)` starting right after a `--`. On failure returns where the name ends.
fn call_at(condition: &str, start: usize) -> Result<ConditionCall<'_>, usize> {
    let rest = &condition[start..];
    let name_len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
    let name = &rest[..name_len];
    let name_end = start + name_len;
    if name.is_empty() {
        return Err(name_end);
    }

    let call = rest[name_len..].strip_prefix('(').ok_or(name_end)?;
    let close = closing_paren(call).ok_or(name_end)?;
    Ok(ConditionCall {
        name,
        args: &call[..close],
    })
}

/// Byte offset of the `)` closing a call whose `(` was already consumed.
/// Quoted strings and nested parentheses are skipped.
fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Fold a dash-case marker name to the identifier-case registry key.
///
/// Every `-` followed by a lowercase ASCII letter becomes that letter uppercased:
/// `my-plugin` → `myPlugin`. Already identifier-cased names are unchanged.
pub fn plugin_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    key.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        key.push(c);
    }
    key
}

/// How the selector text before a marker ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixShape {
    /// Nothing but whitespace: the marker is the whole selector.
    Empty,
    /// Ends in a descendant, child or sibling combinator.
    Combinator,
    /// Ends in a compound selector the output can attach to directly.
    Compound,
}

fn prefix_shape(prefix: &str) -> PrefixShape {
    match prefix.trim_start().chars().last() {
        None => PrefixShape::Empty,
        Some(c) if c.is_whitespace() || matches!(c, '>' | '+' | '~') => PrefixShape::Combinator,
        Some(_) => PrefixShape::Compound,
    }
}

/// Target selector a rule plugin receives for the text before its marker.
pub fn target_selector(prefix: &str) -> String {
    let prefix = prefix.trim_start();
    match prefix_shape(prefix) {
        PrefixShape::Empty => "*".to_string(),
        PrefixShape::Combinator => format!("{prefix}*"),
        PrefixShape::Compound => prefix.to_string(),
    }
}
