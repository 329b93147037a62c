//! Event-binding extraction.
//!
//! A rule opts into re-rendering on events by declaring both custom properties:
//!
//! ```css
//! .menu[--sticky] {
//!   --selector: window;
//!   --events: ["scroll", "resize"];
//! }
//! ```
//!
//! Grouping rules carry them on a nested `[--options]` rule instead.

use crate::cssom::{CssRule, Declarations, GroupRule, StyleRule};
use crate::error::Result;
use crate::invocation::{EventBinding, EventTarget};
use crate::parser::parse_literal_list;
use crate::token::unescape;

pub const SELECTOR_PROPERTY: &str = "--selector";
pub const EVENTS_PROPERTY: &str = "--events";
pub const OPTIONS_SELECTOR: &str = "[--options]";

/// Read the binding declared directly in a declaration block.
///
/// Returns `Ok(None)` unless both properties are present, the target is non-empty and
/// the event list is non-empty. A malformed event list is an error.
pub fn extract_binding(style: &Declarations) -> Result<Option<EventBinding>> {
    let (Some(target), Some(events)) = (style.get(SELECTOR_PROPERTY), style.get(EVENTS_PROPERTY))
    else {
        return Ok(None);
    };

    let target = strip_quotes(target.trim());
    if target.is_empty() {
        return Ok(None);
    }

    let events = decode_events(events)?;
    if events.is_empty() {
        return Ok(None);
    }

    Ok(Some(EventBinding {
        target: EventTarget::parse(&target),
        events,
    }))
}

/// The last top-level `[--options]` rule among a grouping rule's children.
///
/// Position decides: a later options rule replaces an earlier one outright, with no
/// merging of their properties.
pub fn find_options_rule(rules: &[CssRule]) -> Option<&StyleRule> {
    rules.iter().fold(None, |last, rule| match rule {
        CssRule::Style(style) if style.selector_text.trim() == OPTIONS_SELECTOR => Some(style),
        _ => last,
    })
}

/// Read the binding of a grouping rule from its `[--options]` child.
pub fn extract_group_binding(group: &GroupRule) -> Result<Option<EventBinding>> {
    match find_options_rule(&group.rules) {
        Some(options) => extract_binding(&options.style),
        None => Ok(None),
    }
}

/// Event names of an `--events` value. Blank names are dropped.
fn decode_events(raw: &str) -> Result<Vec<String>> {
    let raw = raw.trim();
    let events = parse_literal_list(raw).map_err(|e| e.in_context(raw))?;
    Ok(events
        .iter()
        .map(|e| e.to_string())
        .filter(|name| !name.trim().is_empty())
        .collect())
}

/// Remove one pair of matching enclosing quotes.
fn strip_quotes(text: &str) -> String {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return unescape(&text[1..text.len() - 1]);
        }
    }
    text.to_string()
}
