//! Error types for the SBind engine
//!
//! All fallible operations return `Result<T, Error>`.
//! Syntax errors are fatal to the whole binding string; a failed data lookup
//! is never an error (it evaluates to `None`, see [`crate::Accessor`]).

use crate::parser::tokenizer::Span;

/// Failures while scanning a binding string into tokens
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    /// A `"` was opened but the input ended before it was closed
    #[error("Unterminated string starting at {span}")]
    UnterminatedString { span: Span },

    /// A character outside the binding grammar
    #[error("Unexpected character '{ch}' at {span}")]
    UnexpectedCharacter { ch: char, span: Span },
}

/// Failures while building the AST from a token stream
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// A token that does not fit the grammar at this point
    #[error("Unexpected token at {span}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// The token stream ran out in the middle of a construct
    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: String },

    /// The same binding name appeared twice (only under `DuplicatePolicy::Reject`)
    #[error("Duplicate binding name '{name}' at {span}")]
    DuplicateBindingName { name: String, span: Span },

    /// Arrays and objects nested deeper than the configured limit
    #[error("Nesting deeper than {limit} levels at {span}")]
    NestingTooDeep { limit: usize, span: Span },
}

impl LexError {
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnterminatedString { span } => span,
            LexError::UnexpectedCharacter { span, .. } => span,
        }
    }
}

impl ParseError {
    /// Source position of the error, if the input had not already ended
    pub fn span(&self) -> Option<&Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(span),
            ParseError::DuplicateBindingName { span, .. } => Some(span),
            ParseError::NestingTooDeep { span, .. } => Some(span),
            ParseError::UnexpectedEndOfInput { .. } => None,
        }
    }
}

/// SBind error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Tokenizer failure
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    /// Grammar failure
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid provider options
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for SBind operations
pub type Result<T> = std::result::Result<T, Error>;
