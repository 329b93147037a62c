use crate::error::{HookError, Result};
use crate::invocation::Literal;
use crate::lexer;
use crate::token::{Spanned, Token};

/// Parse a comma-separated literal list: `"a", 1, true`.
///
/// An optional pair of enclosing brackets is accepted (`["click", "resize"]`).
/// Empty input yields an empty list.
pub fn parse_literal_list(source: &str) -> Result<Vec<Literal>> {
    let tokens = lexer::lex(source)?;
    Parser::new(tokens).parse_list()
}

/// Recursive descent parser for argument lists.
///
/// Grammar:
///
/// ```text
/// list    := '[' items? ']' | items?
/// items   := literal (',' literal)*
/// literal := STRING | NUMBER | WORD
/// ```
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_spanned(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Spanned> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek_spanned() {
            None => Ok(()),
            Some(s) => Err(HookError::unexpected_token(
                "end of list",
                s.token.describe(),
                s.span.clone(),
            )),
        }
    }

    // ── Top-level ──────────────────────────────────────────────────────

    /// Parse the whole token stream as one list.
    pub fn parse_list(&mut self) -> Result<Vec<Literal>> {
        if self.peek().is_none() {
            return Ok(Vec::new());
        }

        let bracketed = self.at(&Token::LBracket);
        if bracketed {
            self.pos += 1;
            if self.at(&Token::RBracket) {
                self.pos += 1;
                self.expect_end()?;
                return Ok(Vec::new());
            }
        }

        let mut items = vec![self.parse_literal()?];
        loop {
            match self.peek_spanned() {
                Some(s) if s.token == Token::Comma => {
                    self.pos += 1;
                    items.push(self.parse_literal()?);
                }
                Some(s) if bracketed && s.token == Token::RBracket => {
                    self.pos += 1;
                    break;
                }
                Some(s) => {
                    let expected = if bracketed { "',' or ']'" } else { "','" };
                    return Err(HookError::unexpected_token(
                        expected,
                        s.token.describe(),
                        s.span.clone(),
                    ));
                }
                None if bracketed => return Err(HookError::unexpected_eof("']'")),
                None => break,
            }
        }

        self.expect_end()?;
        Ok(items)
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        match self.advance() {
            Some(Spanned {
                token: Token::String(s),
                ..
            }) => Ok(Literal::String(s.clone())),
            Some(Spanned {
                token: Token::Number(n),
                ..
            }) => Ok(Literal::Number(*n)),
            Some(Spanned {
                token: Token::Word(w),
                ..
            }) => Ok(match w.as_str() {
                "true" => Literal::Bool(true),
                "false" => Literal::Bool(false),
                _ => Literal::String(w.clone()),
            }),
            Some(s) => Err(HookError::unexpected_token(
                "literal",
                s.token.describe(),
                s.span.clone(),
            )),
            None => Err(HookError::unexpected_eof("literal")),
        }
    }
}
