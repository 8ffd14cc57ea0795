//! Centralized error handling for linebuf
//! Defines the error kinds and the structured error type returned by buffer operations

use crate::constants;
use std::fmt;

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A line, mark, or rule lookup found nothing, or there is nothing to replay
    NotFound,
    /// A recorded action no longer maps onto the current line graph
    StaleReplay,
    /// A style rule pattern failed to compile
    RuleCompile,
    /// A position or range argument falls outside the buffer
    OutOfRange,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NotFound"),
            Self::StaleReplay => write!(f, "StaleReplay"),
            Self::RuleCompile => write!(f, "RuleCompile"),
            Self::OutOfRange => write!(f, "OutOfRange"),
        }
    }
}

/// A structured error in linebuf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferError {
    /// What kind of error occurred
    pub kind: ErrorKind,
    /// Machine-readable error code (e.g. "LINE_NOT_FOUND")
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl BufferError {
    /// Create a new error
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if the message contains a substring (useful for tests)
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for BufferError {}

impl From<regex::Error> for BufferError {
    fn from(err: regex::Error) -> Self {
        Self::new(
            ErrorKind::RuleCompile,
            constants::errors::PATTERN_ERROR,
            err.to_string(),
        )
    }
}

/// Result alias for linebuf operations
pub type Result<T> = std::result::Result<T, BufferError>;
