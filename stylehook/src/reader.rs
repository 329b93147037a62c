//! Stylesheet reader. Builds a [`Stylesheet`] snapshot from CSS text.
//!
//! This is a structural reader, not a validating CSS parser: it finds rule boundaries,
//! splits declarations and recurses into `@supports` blocks. Selector and value text is
//! kept as written so the decoder sees exactly what the author typed.

use crate::cssom::{CssRule, Declarations, GroupRule, StyleRule, Stylesheet};
use crate::error::{HookError, Result};
use crate::lexer;
use crate::token::{CssToken, Spanned};

/// Read stylesheet text into an object-model snapshot.
pub fn read_stylesheet(source: &str) -> Result<Stylesheet> {
    let tokens = lexer::lex_css(source)?;
    let mut reader = Reader {
        source,
        tokens,
        pos: 0,
    };
    let rules = reader.read_rules(false)?;
    Ok(Stylesheet::new(rules))
}

struct Reader<'s> {
    source: &'s str,
    tokens: Vec<Spanned<CssToken>>,
    pos: usize,
}

impl<'s> Reader<'s> {
    fn peek(&self) -> Option<&Spanned<CssToken>> {
        self.tokens.get(self.pos)
    }

    fn text(&self, tok: &Spanned<CssToken>) -> &'s str {
        &self.source[tok.span.clone()]
    }

    /// Skip whitespace runs, comments and stray semicolons between rules.
    fn skip_trivia(&mut self) {
        while let Some(tok) = self.peek() {
            let trivial = match tok.token {
                CssToken::Comment | CssToken::Semicolon => true,
                CssToken::Text => self.text(tok).trim().is_empty(),
                _ => false,
            };
            if !trivial {
                break;
            }
            self.pos += 1;
        }
    }

    /// Read rules until end of input (top level) or the closing `}` of a block (nested).
    /// The closing brace is left for the caller.
    fn read_rules(&mut self, nested: bool) -> Result<Vec<CssRule>> {
        let mut rules = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek().map(|tok| (tok.token, tok.span.clone())) {
                None if nested => return Err(HookError::unexpected_eof("'}'")),
                None => return Ok(rules),
                Some((CssToken::RBrace, _)) if nested => return Ok(rules),
                Some((CssToken::RBrace, span)) => return Err(HookError::unterminated_block(span)),
                Some(_) => rules.push(self.read_rule()?),
            }
        }
    }

    fn read_rule(&mut self) -> Result<CssRule> {
        let source = self.source;
        let start = match self.peek() {
            Some(tok) => tok.span.start,
            None => return Err(HookError::unexpected_eof("rule")),
        };

        // Prelude runs up to the block, or to `;` for statement at-rules.
        let open = loop {
            let Some((kind, span)) = self.peek().map(|tok| (tok.token, tok.span.clone())) else {
                return Err(HookError::unexpected_eof("'{'"));
            };
            match kind {
                CssToken::LBrace => break span,
                CssToken::Semicolon => {
                    self.pos += 1;
                    let prelude = source[start..span.start].trim().to_string();
                    return Ok(CssRule::Other { prelude });
                }
                CssToken::RBrace => {
                    return Err(HookError::unexpected_token("'{'", kind.describe(), span))
                }
                _ => self.pos += 1,
            }
        };
        self.pos += 1;

        let prelude = source[start..open.start].trim();

        if let Some(condition) = supports_condition(prelude) {
            let rules = self.read_rules(true)?;
            let close = self.expect_close()?;
            return Ok(CssRule::Group(GroupRule {
                condition_text: condition.to_string(),
                rules,
                block_text: source[open.end..close.start].to_string(),
            }));
        }

        if prelude.starts_with('@') {
            self.skip_block(&open)?;
            return Ok(CssRule::Other {
                prelude: prelude.to_string(),
            });
        }

        let (style, close) = self.read_declarations()?;
        Ok(CssRule::Style(StyleRule {
            selector_text: prelude.to_string(),
            style,
            block_text: source[open.end..close.start].to_string(),
        }))
    }

    fn expect_close(&mut self) -> Result<std::ops::Range<usize>> {
        match self.peek() {
            Some(tok) if tok.token == CssToken::RBrace => {
                let span = tok.span.clone();
                self.pos += 1;
                Ok(span)
            }
            Some(tok) => Err(HookError::unexpected_token(
                "'}'",
                tok.token.describe(),
                tok.span.clone(),
            )),
            None => Err(HookError::unexpected_eof("'}'")),
        }
    }

    /// Skip a block whose `{` was already consumed, including nested blocks.
    fn skip_block(&mut self, open: &std::ops::Range<usize>) -> Result<std::ops::Range<usize>> {
        let mut depth = 0usize;
        while let Some(tok) = self.tokens.get(self.pos) {
            self.pos += 1;
            match tok.token {
                CssToken::LBrace => depth += 1,
                CssToken::RBrace if depth == 0 => return Ok(tok.span.clone()),
                CssToken::RBrace => depth -= 1,
                _ => {}
            }
        }
        Err(HookError::unterminated_block(open.clone()))
    }

    /// Read `name: value` pairs up to the closing `}`.
    ///
    /// Nested blocks are dropped from the declarations, together with whatever
    /// prelude text preceded them.
    fn read_declarations(&mut self) -> Result<(Declarations, std::ops::Range<usize>)> {
        let mut style = Declarations::new();
        let mut segment = String::new();
        let mut depth = 0usize;

        loop {
            let Some(tok) = self.tokens.get(self.pos) else {
                return Err(HookError::unexpected_eof("'}'"));
            };
            self.pos += 1;
            match tok.token {
                CssToken::Comment => {}
                CssToken::LBrace => depth += 1,
                CssToken::RBrace if depth == 0 => {
                    push_declaration(&mut style, &segment);
                    return Ok((style, tok.span.clone()));
                }
                CssToken::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        segment.clear();
                    }
                }
                CssToken::Semicolon if depth == 0 => {
                    push_declaration(&mut style, &segment);
                    segment.clear();
                }
                _ if depth == 0 => segment.push_str(&self.source[tok.span.clone()]),
                _ => {}
            }
        }
    }
}

fn push_declaration(style: &mut Declarations, segment: &str) {
    if let Some((name, value)) = segment.split_once(':') {
        let name = name.trim();
        if !name.is_empty() {
            style.set(name, value.trim());
        }
    }
}

/// `@supports <condition>` → the condition text.
fn supports_condition(prelude: &str) -> Option<&str> {
    const KEYWORD: &str = "@supports";
    let head = prelude.get(..KEYWORD.len())?;
    if !head.eq_ignore_ascii_case(KEYWORD) {
        return None;
    }
    let rest = &prelude[KEYWORD.len()..];
    if rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
        Some(rest.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn style(rule: &CssRule) -> &StyleRule {
        match rule {
            CssRule::Style(s) => s,
            other => panic!("expected style rule, got {other:?}"),
        }
    }

    #[test]
    fn read_style_rule_with_custom_properties() {
        let sheet = read_stylesheet(
            r#".card[--grid="3, true"] {
                gap: 1em;
                --selector: ".card";
                --events: ["click"];
            }"#,
        )
        .expect("stylesheet should read");

        assert_eq!(sheet.rules.len(), 1);
        let rule = style(&sheet.rules[0]);
        assert_eq!(rule.selector_text, r#".card[--grid="3, true"]"#);
        assert_eq!(rule.style.get("gap"), Some("1em"));
        assert_eq!(rule.style.get("--selector"), Some("\".card\""));
        assert_eq!(rule.style.get("--events"), Some("[\"click\"]"));
        assert!(rule.block_text.contains("gap: 1em;"));
    }

    #[test]
    fn read_supports_group_with_children() {
        let sheet = read_stylesheet(
            "@supports --grid(1, \"x\") {\n  .a { color: red }\n  [--options] { --events: [\"resize\"]; }\n}",
        )
        .unwrap();

        let CssRule::Group(group) = &sheet.rules[0] else {
            panic!("expected group rule");
        };
        assert_eq!(group.condition_text, "--grid(1, \"x\")");
        assert_eq!(group.rules.len(), 2);
        assert_eq!(style(&group.rules[1]).selector_text, "[--options]");
        assert_eq!(style(&group.rules[0]).style.get("color"), Some("red"));
        assert_eq!(
            group.block_text.trim(),
            ".a { color: red }\n  [--options] { --events: [\"resize\"]; }"
        );
    }

    #[test]
    fn other_at_rules_are_opaque() {
        let sheet = read_stylesheet(
            "@import url(\"base.css\");\n@media (min-width: 10px) { .a { color: red } }\n.b { x: y }",
        )
        .unwrap();
        assert_eq!(sheet.rules.len(), 3);
        assert!(matches!(&sheet.rules[0], CssRule::Other { prelude } if prelude == "@import url(\"base.css\")"));
        assert!(matches!(&sheet.rules[1], CssRule::Other { prelude } if prelude.starts_with("@media")));
        assert_eq!(style(&sheet.rules[2]).selector_text, ".b");
    }

    #[test]
    fn comments_are_dropped_from_declarations() {
        let sheet = read_stylesheet("/* lead */ .a { /* c */ color: red; /* d */ }").unwrap();
        let rule = style(&sheet.rules[0]);
        assert_eq!(rule.selector_text, ".a");
        assert_eq!(rule.style.iter().collect::<Vec<_>>(), vec![("color", "red")]);
    }

    #[test]
    fn comments_inside_supports_bodies_are_not_rules() {
        let sheet = read_stylesheet(
            "@supports --grid(2) {\n  /* { not a block } */\n  .a { color: red }\n  /* tail */\n}\n/* after */",
        )
        .unwrap();
        assert_eq!(sheet.rules.len(), 1);
        let CssRule::Group(group) = &sheet.rules[0] else {
            panic!("expected group rule");
        };
        assert_eq!(group.rules.len(), 1);
        assert_eq!(style(&group.rules[0]).selector_text, ".a");
        assert!(group.block_text.contains("/* { not a block } */"));
    }

    #[test]
    fn nested_blocks_do_not_leak_declarations() {
        let sheet = read_stylesheet(".a { color: red; & .b { color: blue; } margin: 0 }").unwrap();
        let rule = style(&sheet.rules[0]);
        assert_eq!(rule.style.get("color"), Some("red"));
        assert_eq!(rule.style.get("margin"), Some("0"));
        assert_eq!(rule.style.len(), 2);
    }

    #[test]
    fn supports_keyword_needs_a_boundary() {
        assert_eq!(supports_condition("@supports --x(1)"), Some("--x(1)"));
        assert_eq!(supports_condition("@SUPPORTS (display: grid)"), Some("(display: grid)"));
        assert_eq!(supports_condition("@supportsx"), None);
        assert_eq!(supports_condition(".a"), None);
    }

    #[test]
    fn error_unclosed_rule() {
        let err = read_stylesheet(".a { color: red").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn error_stray_closing_brace() {
        let err = read_stylesheet(".a { } }").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnterminatedBlock));
    }

    #[test]
    fn error_unclosed_supports() {
        assert!(read_stylesheet("@supports --x() { .a { b: c }").is_err());
    }
}
