use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// A schedule file failed to parse. `position` is the byte offset of
/// the offending token in the source text the caller passed in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at byte {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self { position, message: message.into() }
    }
}
