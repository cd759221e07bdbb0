//! Diagnostics produced while lexing or parsing Go source.

use std::fmt;

/// A syntax error at a 1-based line and column of the source.
///
/// The `Display` form is `line:column: message`, matching the shape of the
/// Go toolchain's own diagnostics so it can be surfaced to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Convenient alias for parser results.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = ParseError::new(3, 14, "expected type, found `)`");
        assert_eq!(err.to_string(), "3:14: expected type, found `)`");
    }
}
