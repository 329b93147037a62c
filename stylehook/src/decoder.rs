//! Invocation recognizer and decoder.
//!
//! Recognition is cheap and never fails: it only locates a marker. Decoding parses the
//! argument list and event binding, and is only attempted once the plugin is known to be
//! registered, so malformed arguments of unused plugins never abort a scan.

use crate::binding::{extract_binding, extract_group_binding};
use crate::cssom::{CssRule, GroupRule, StyleRule};
use crate::error::Result;
use crate::invocation::{Invocation, InvocationKind, Literal};
use crate::marker::{
    find_condition_call, find_selector_marker, plugin_key, target_selector, ConditionCall,
    SelectorMarker,
};
use crate::parser::parse_literal_list;

/// Indent added after every newline of a generic grouping-rule body.
const GENERIC_INDENT: &str = "  ";
/// Indent added after every newline of an event-bound grouping-rule body.
const EVENT_BOUND_INDENT: &str = "    ";

/// A rule that carries a plugin marker.
#[derive(Debug, Clone)]
pub enum Candidate<'r> {
    Style {
        rule: &'r StyleRule,
        marker: SelectorMarker<'r>,
    },
    Group {
        rule: &'r GroupRule,
        call: ConditionCall<'r>,
    },
}

/// Classify a rule as a plugin style rule, a plugin grouping rule, or neither.
pub fn recognize(rule: &CssRule) -> Option<Candidate<'_>> {
    match rule {
        CssRule::Style(style) => {
            find_selector_marker(&style.selector_text).map(|marker| Candidate::Style {
                rule: style,
                marker,
            })
        }
        CssRule::Group(group) => find_condition_call(&group.condition_text)
            .map(|call| Candidate::Group { rule: group, call }),
        CssRule::Other { .. } => None,
    }
}

impl<'r> Candidate<'r> {
    pub fn kind(&self) -> InvocationKind {
        match self {
            Candidate::Style { .. } => InvocationKind::Rule,
            Candidate::Group { .. } => InvocationKind::Stylesheet,
        }
    }

    /// Identifier-case registry key of the marker.
    pub fn plugin_key(&self) -> String {
        match self {
            Candidate::Style { marker, .. } => plugin_key(marker.name),
            Candidate::Group { call, .. } => plugin_key(call.name),
        }
    }

    /// Selector or condition text, for diagnostics.
    pub fn source_text(&self) -> &'r str {
        match *self {
            Candidate::Style { rule, .. } => &rule.selector_text,
            Candidate::Group { rule, .. } => &rule.condition_text,
        }
    }

    /// Decode arguments, body and event binding.
    pub fn decode(&self) -> Result<Invocation> {
        let context = self.source_text();
        match self {
            Candidate::Style { rule, marker } => decode_style(rule, marker),
            Candidate::Group { rule, call } => decode_group(rule, call),
        }
        .map_err(|e| e.in_context(context))
    }
}

fn decode_style(rule: &StyleRule, marker: &SelectorMarker<'_>) -> Result<Invocation> {
    let args = match &marker.value {
        Some(value) => decode_args(value)?,
        None => Vec::new(),
    };
    let binding = extract_binding(&rule.style)?;

    Ok(Invocation {
        kind: InvocationKind::Rule,
        plugin_key: plugin_key(marker.name),
        selector: Some(target_selector(marker.prefix)),
        args,
        body: rule.block_text.trim().to_string(),
        binding,
    })
}

fn decode_group(rule: &GroupRule, call: &ConditionCall<'_>) -> Result<Invocation> {
    let args = decode_args(call.args)?;
    let binding = extract_group_binding(rule)?;
    let indent = if binding.is_some() {
        EVENT_BOUND_INDENT
    } else {
        GENERIC_INDENT
    };

    Ok(Invocation {
        kind: InvocationKind::Stylesheet,
        plugin_key: plugin_key(call.name),
        selector: None,
        args,
        body: reindent(rule.block_text.trim(), indent),
        binding,
    })
}

fn decode_args(text: &str) -> Result<Vec<Literal>> {
    parse_literal_list(text.trim())
}

fn reindent(text: &str, indent: &str) -> String {
    text.replace('\n', &format!("\n{indent}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cssom::Declarations;
    use crate::error::ErrorKind;
    use crate::invocation::EventTarget;
    use pretty_assertions::assert_eq;

    fn style_rule(selector: &str, pairs: &[(&str, &str)]) -> CssRule {
        CssRule::Style(StyleRule::new(selector, pairs.iter().copied().collect()))
    }

    fn decode(rule: &CssRule) -> Invocation {
        recognize(rule)
            .expect("rule should be recognized")
            .decode()
            .expect("rule should decode")
    }

    #[test]
    fn style_rule_without_value() {
        let inv = decode(&style_rule(".card[--plugin]", &[("color", "red")]));
        assert_eq!(inv.kind, InvocationKind::Rule);
        assert_eq!(inv.plugin_key, "plugin");
        assert_eq!(inv.selector.as_deref(), Some(".card"));
        assert!(inv.args.is_empty());
        assert_eq!(inv.body, "color: red;");
        assert_eq!(inv.binding, None);
    }

    #[test]
    fn style_rule_marker_alone_targets_everything() {
        let inv = decode(&style_rule("[--plugin]", &[]));
        assert_eq!(inv.selector.as_deref(), Some("*"));
    }

    #[test]
    fn style_rule_trailing_combinator() {
        let inv = decode(&style_rule("ul > [--plugin]", &[]));
        assert_eq!(inv.selector.as_deref(), Some("ul > *"));
    }

    #[test]
    fn style_rule_args() {
        let inv = decode(&style_rule(r#"p[--plugin="a,1,true"]"#, &[]));
        assert_eq!(
            inv.args,
            vec![Literal::from("a"), Literal::from(1.0), Literal::from(true)]
        );
    }

    #[test]
    fn style_rule_dash_case_name() {
        let inv = decode(&style_rule("[--min-width=\"300\"]", &[]));
        assert_eq!(inv.plugin_key, "minWidth");
        assert_eq!(inv.args, vec![Literal::from(300.0)]);
    }

    #[test]
    fn style_rule_event_binding() {
        let inv = decode(&style_rule(
            "input[--echo]",
            &[("--selector", "\"input\""), ("--events", "[\"input\"]")],
        ));
        let binding = inv.binding.expect("binding");
        assert_eq!(binding.target, EventTarget::Selector("input".to_string()));
        assert_eq!(binding.events, vec!["input"]);
    }

    #[test]
    fn group_rule_args_and_body() {
        let group = GroupRule::new(
            r#"--plugin(1,"x")"#,
            vec![
                style_rule(".a", &[("color", "red")]),
                style_rule(".b", &[("color", "blue")]),
            ],
        );
        let inv = decode(&CssRule::Group(group));
        assert_eq!(inv.kind, InvocationKind::Stylesheet);
        assert_eq!(inv.plugin_key, "plugin");
        assert_eq!(inv.selector, None);
        assert_eq!(inv.args, vec![Literal::from(1.0), Literal::from("x")]);
        assert_eq!(inv.body, ".a { color: red; }\n  .b { color: blue; }");
    }

    #[test]
    fn group_rule_event_bound_body_indent() {
        let group = GroupRule::new(
            "--plugin()",
            vec![
                style_rule(".a", &[("color", "red")]),
                style_rule(
                    "[--options]",
                    &[("--selector", "window"), ("--events", "[\"resize\"]")],
                ),
            ],
        );
        let inv = decode(&CssRule::Group(group));
        assert!(inv.args.is_empty());
        assert!(inv.is_event_bound());
        assert!(inv.body.contains("\n    [--options]"));
    }

    #[test]
    fn unmarked_rules_are_ignored() {
        assert!(recognize(&style_rule(".a", &[])).is_none());
        assert!(recognize(&CssRule::Group(GroupRule::new("(display: grid)", vec![]))).is_none());
        assert!(recognize(&CssRule::Other {
            prelude: "@import url(x.css)".to_string()
        })
        .is_none());
    }

    #[test]
    fn malformed_args_carry_rule_context() {
        let rule = style_rule(r#"[--plugin="1 2"]"#, &[]);
        let err = recognize(&rule).unwrap().decode().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
        assert_eq!(err.context.as_deref(), Some(r#"[--plugin="1 2"]"#));
    }

    #[test]
    fn recognition_does_not_parse_arguments() {
        let rule = style_rule(r#"[--plugin="1 2"]"#, &[]);
        let candidate = recognize(&rule).expect("marker is recognized");
        assert_eq!(candidate.plugin_key(), "plugin");
        assert_eq!(candidate.kind(), InvocationKind::Rule);
    }

    #[test]
    fn empty_declarations_body() {
        let rule = CssRule::Style(StyleRule::new("[--x]", Declarations::new()));
        assert_eq!(decode(&rule).body, "");
    }
}
