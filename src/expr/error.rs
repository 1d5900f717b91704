//! Errors raised while lexing, parsing, or evaluating a condition expression.
//!
//! These share one enum rather than three, per the interpreter's failure
//! channel: whichever stage raises, the interpreter absorbs it into a single
//! `SafetyStop` outcome (§7 layer 2 of the rule-engine spec).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected token at offset {offset}: {found}")]
    UnexpectedToken { offset: usize, found: String },

    #[error("unclosed parenthesis at offset {offset}")]
    UnclosedParen { offset: usize },

    #[error("trailing input at offset {offset}: {found}")]
    TrailingInput { offset: usize, found: String },

    #[error("empty expression")]
    EmptyExpression,

    #[error("invalid number at offset {offset}: {text}")]
    InvalidNumber { offset: usize, text: String },

    #[error("unexpected character '{ch}' at offset {offset}")]
    BadCharacter { offset: usize, ch: char },

    #[error("field not found: {path}")]
    FieldNotFound { path: String },

    #[error("type error: {message}")]
    TypeError { message: String },
}
