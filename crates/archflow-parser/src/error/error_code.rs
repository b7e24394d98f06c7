//! Stable codes for front-end diagnostics.
//!
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// A string literal was opened with `"` but never closed on the same line.
    E001,

    /// A character that cannot start any token.
    E002,

    /// An escape other than `\n`, `\t`, `\r`, `\\`, or `\"` inside a string.
    E003,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// The parser met a token it could not use at this position.
    E100,

    /// The input ended in the middle of a declaration.
    E101,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E002.description(), "unexpected character");
        assert_eq!(ErrorCode::E100.description(), "unexpected token");
    }
}
