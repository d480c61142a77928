//! Error handling types shared by the whole Idzey toolchain.
//!
//! A single [`Error`] type covers lexical diagnostics (carried through the
//! token stream), parse failures, and runtime errors. Source location is
//! optional: parse errors have one, runtime errors usually do not.
//!
//! ```rust
//! use idzey_syntax::error::{Result, error};
//!
//! fn parse_digit(c: char) -> Result<u32> {
//!     match c.to_digit(10) {
//!         Some(d) => Ok(d),
//!         None => error(format!("'{}' is not a digit", c)),
//!     }
//! }
//! ```

use std::fmt;

/// An error produced while lexing, parsing, or interpreting a script.
#[derive(Debug, Clone)]
pub struct Error {
    /// Human-readable description.
    pub msg: String,
    /// 1-based source line, when known.
    pub line: Option<usize>,
    /// 1-based source column, when known.
    pub col: Option<usize>,
}

impl Error {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            line: None,
            col: None,
        }
    }

    /// An error pinned to a source position; `Display` renders it as
    /// `"<msg> at line L, column C"`.
    pub fn with_span(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            msg: msg.into(),
            line: Some(line),
            col: Some(col),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.col) {
            write!(f, "{} at line {}, column {}", self.msg, line, col)
        } else {
            write!(f, "{}", self.msg)
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::new(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::new(s)
    }
}

/// Specialized `Result` used throughout the toolchain.
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for `Err(Error::new(msg))`.
pub fn error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(msg))
}

/// Shorthand for `Err(Error::with_span(msg, line, col))`.
pub fn error_at<T>(line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(msg, line, col))
}
