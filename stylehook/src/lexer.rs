use logos::Logos;

use crate::error::{HookError, Result};
use crate::token::{CssToken, Spanned, Token};

/// Tokenize a plugin argument list into a vector of spanned tokens.
pub fn lex(source: &str) -> Result<Vec<Spanned>> {
    lex_with::<Token>(source)
}

/// Tokenize stylesheet text into structural tokens.
pub fn lex_css(source: &str) -> Result<Vec<Spanned<CssToken>>> {
    lex_with::<CssToken>(source)
}

fn lex_with<'s, T>(source: &'s str) -> Result<Vec<Spanned<T>>>
where
    T: Logos<'s, Source = str, Extras = (), Error = ()>,
{
    let mut tokens = Vec::new();
    let mut lexer = T::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => {
                tokens.push(Spanned { token, span });
            }
            Err(()) => {
                let fragment = &source[span.clone()];
                return Err(HookError::unrecognized_token(fragment, span));
            }
        }
    }

    Ok(tokens)
}
