use std::fmt;
use std::ops::Range;

/// All errors produced while reading stylesheets and decoding plugin invocations.
#[derive(Debug)]
pub struct HookError {
    pub kind: ErrorKind,
    /// Byte range inside the text that was being decoded.
    pub span: Option<Range<usize>>,
    /// The rule, condition or template the failing text came from.
    pub context: Option<String>,
    /// The stylesheet or file holding that text.
    pub origin: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Lexer encountered an unrecognized character/sequence.
    #[error("unrecognized token: {0}")]
    UnrecognizedToken(String),
    /// Parser expected one thing, got another.
    #[error("expected {expected}, got {got}")]
    UnexpectedToken { expected: String, got: String },
    /// Parser reached end of input unexpectedly.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    /// A `{` block in a stylesheet was never closed, or a `}` had no opener.
    #[error("unbalanced block")]
    UnterminatedBlock,
    /// The plugin configuration could not be loaded.
    #[error("invalid plugin configuration: {0}")]
    Config(String),
    /// A plugin template failed to compile or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{origin}: ")?;
        }
        write!(f, "{}", self.kind)?;

        if let Some(span) = &self.span {
            write!(f, " (at byte {}..{})", span.start, span.end)?;
        }
        if let Some(context) = &self.context {
            write!(f, " in `{context}`")?;
        }

        Ok(())
    }
}

impl std::error::Error for HookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(e) => Some(e),
            ErrorKind::Template(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HookError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(e))
    }
}

impl From<minijinja::Error> for HookError {
    fn from(e: minijinja::Error) -> Self {
        Self::new(ErrorKind::Template(e))
    }
}

pub type Result<T> = std::result::Result<T, HookError>;

/// Shorthand constructors.
impl HookError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: None,
            context: None,
            origin: None,
        }
    }

    pub fn unrecognized_token(fragment: &str, span: Range<usize>) -> Self {
        Self {
            span: Some(span),
            ..Self::new(ErrorKind::UnrecognizedToken(fragment.to_string()))
        }
    }

    pub fn unexpected_token(expected: &str, got: &str, span: Range<usize>) -> Self {
        Self {
            span: Some(span),
            ..Self::new(ErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                got: got.to_string(),
            })
        }
    }

    pub fn unexpected_eof(expected: &str) -> Self {
        Self::new(ErrorKind::UnexpectedEof {
            expected: expected.to_string(),
        })
    }

    pub fn unterminated_block(span: Range<usize>) -> Self {
        Self {
            span: Some(span),
            ..Self::new(ErrorKind::UnterminatedBlock)
        }
    }

    pub fn config(msg: &str) -> Self {
        Self::new(ErrorKind::Config(msg.to_string()))
    }

    /// Attach the rule or file the error occurred in, keeping any context already set.
    pub fn in_context(mut self, context: &str) -> Self {
        if self.context.is_none() {
            self.context = Some(context.to_string());
        }
        self
    }

    /// Attach the stylesheet or file the error occurred in, keeping any origin already set.
    pub fn in_origin(mut self, origin: &str) -> Self {
        if self.origin.is_none() {
            self.origin = Some(origin.to_string());
        }
        self
    }
}
