//! Read-only snapshot of a stylesheet object model.
//!
//! The scan never mutates these types. They are built either by [`crate::reader`]
//! from stylesheet text or directly by a host that already has parsed rules.

/// One stylesheet: an ordered list of top-level rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    /// Where the stylesheet came from, for diagnostics.
    pub href: Option<String>,
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    pub fn new(rules: Vec<CssRule>) -> Self {
        Self { href: None, rules }
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssRule {
    /// `selector { declarations }`
    Style(StyleRule),
    /// `@supports condition { rules }`
    Group(GroupRule),
    /// Any other at-rule. Never scanned.
    Other { prelude: String },
}

impl CssRule {
    /// Serialized rule text.
    pub fn css_text(&self) -> String {
        match self {
            CssRule::Style(rule) => format!("{} {{ {} }}", rule.selector_text, rule.block_text.trim()),
            CssRule::Group(rule) => format!(
                "@supports {} {{\n{}\n}}",
                rule.condition_text,
                rule.block_text.trim_matches('\n')
            ),
            CssRule::Other { prelude } => format!("{prelude};"),
        }
    }
}

/// A simple selector rule.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector_text: String,
    pub style: Declarations,
    /// Raw text between the rule's braces.
    pub block_text: String,
}

impl StyleRule {
    /// Build a rule from declarations, serializing them as its block text.
    pub fn new(selector_text: &str, style: Declarations) -> Self {
        let block_text = style.css_text();
        Self {
            selector_text: selector_text.to_string(),
            style,
            block_text,
        }
    }
}

/// A conditional grouping rule with nested rules.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRule {
    pub condition_text: String,
    pub rules: Vec<CssRule>,
    /// Raw text between the rule's outer braces.
    pub block_text: String,
}

impl GroupRule {
    /// Build a grouping rule, serializing the nested rules one per line as its block text.
    pub fn new(condition_text: &str, rules: Vec<CssRule>) -> Self {
        let block_text = rules
            .iter()
            .map(CssRule::css_text)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            condition_text: condition_text.to_string(),
            rules,
            block_text: format!("\n{block_text}\n"),
        }
    }
}

/// An ordered declaration block. Re-declaring a property replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    /// Value of a property, as written.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Property names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn css_text(&self) -> String {
        self.entries
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Declarations {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut style = Declarations::new();
        for (name, value) in iter {
            style.set(name, value);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclared_property_keeps_position() {
        let style: Declarations = [("color", "red"), ("--x", "1"), ("color", "blue")]
            .into_iter()
            .collect();
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("color"), Some("blue"));
        assert_eq!(style.names().collect::<Vec<_>>(), vec!["color", "--x"]);
    }

    #[test]
    fn style_rule_block_text_from_declarations() {
        let rule = StyleRule::new(
            ".a[--x]",
            [("color", "red"), ("--events", "[\"click\"]")].into_iter().collect(),
        );
        assert_eq!(rule.block_text, "color: red; --events: [\"click\"];");
        assert_eq!(
            CssRule::Style(rule).css_text(),
            ".a[--x] { color: red; --events: [\"click\"]; }"
        );
    }

    #[test]
    fn group_rule_block_text_lists_children() {
        let group = GroupRule::new(
            "--grid(2)",
            vec![
                CssRule::Style(StyleRule::new(".a", [("gap", "1em")].into_iter().collect())),
                CssRule::Style(StyleRule::new(".b", Declarations::new())),
            ],
        );
        assert_eq!(group.block_text, "\n.a { gap: 1em; }\n.b {  }\n");
    }
}
