//! Parse error types for the Groove parser.

use std::fmt;

use groove_common::span::Span;

/// A parse error with location information and optional related span.
///
/// The parser never stops at the first error: every problem is recorded as
/// one of these and parsing resumes, so a syntax tree is always produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Primary source location where the error was detected.
    pub span: Span,
    /// Optional related location with context message (e.g., "closure opened here").
    pub related: Option<(String, Span)>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            related: None,
        }
    }

    pub fn with_related(
        message: impl Into<String>,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            message: message.into(),
            span,
            related: Some((related_message.into(), related_span)),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_with_related() {
        let err = ParseError::with_related(
            "expected `}`",
            Span::new(20, 20),
            "block opened here",
            Span::new(4, 5),
        );
        assert_eq!(err.to_string(), "expected `}`");
        let (msg, span) = err.related.unwrap();
        assert_eq!(msg, "block opened here");
        assert_eq!(span, Span::new(4, 5));
    }
}
