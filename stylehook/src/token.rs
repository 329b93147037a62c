use logos::{Lexer, Logos};

/// Tokens of a plugin argument list: `"a", 1, true` or `["click", "resize"]`.
///
/// The grammar is fixed: quoted strings, numbers, bare words and the punctuation that
/// separates them. `true`/`false` arrive as words and the parser gives them meaning.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // ── Literals ───────────────────────────────────────────────────────
    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unquote(lex.slice()))]
    String(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string())]
    Word(String),

    // ── Punctuation ────────────────────────────────────────────────────
    #[token(",")]
    Comma,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

impl Token {
    /// Human-readable name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::Number(_) => "number",
            Token::String(_) => "string",
            Token::Word(_) => "word",
            Token::Comma => "','",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
        }
    }
}

/// Strip the surrounding quotes and resolve backslash escapes.
pub fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    unescape(inner)
}

/// Resolve backslash escapes: `\x` becomes `x`.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Structural tokens of stylesheet text.
///
/// Only what decides rule boundaries is a token; everything between is a `Text` run
/// sliced back out of the source by span.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssToken {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token("/*", block_comment)]
    Comment,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Quoted,
    #[token("/")]
    Slash,
    #[regex(r#"[^{};"'/]+"#)]
    Text,
}

impl CssToken {
    pub fn describe(&self) -> &'static str {
        match self {
            CssToken::LBrace => "'{'",
            CssToken::RBrace => "'}'",
            CssToken::Semicolon => "';'",
            CssToken::Comment => "comment",
            CssToken::Quoted => "string",
            CssToken::Slash => "'/'",
            CssToken::Text => "text",
        }
    }
}

/// Consume a block comment body through the closing `*/`. An unterminated comment runs
/// to the end of input.
fn block_comment(lex: &mut Lexer<CssToken>) {
    let rest = lex.remainder();
    let len = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
    lex.bump(len);
}

/// A token with its source location (byte offset span).
#[derive(Debug, Clone)]
pub struct Spanned<T = Token> {
    pub token: T,
    pub span: std::ops::Range<usize>,
}
