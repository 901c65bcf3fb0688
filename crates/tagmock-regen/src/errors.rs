use regex_syntax::ast;
use thiserror::Error;

/// Errors raised while compiling a pattern. Generation itself cannot fail.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("invalid pattern: {0}")]
    Syntax(String),
    #[error("unsupported pattern construct: {0}")]
    Unsupported(&'static str),
    #[error("invalid character class: {0}")]
    Class(String),
}

impl From<ast::Error> for PatternError {
    fn from(err: ast::Error) -> Self {
        match err.kind() {
            ast::ErrorKind::UnsupportedLookAround => PatternError::Unsupported("look-around"),
            ast::ErrorKind::UnsupportedBackreference => PatternError::Unsupported("backreference"),
            _ => PatternError::Syntax(err.to_string()),
        }
    }
}
