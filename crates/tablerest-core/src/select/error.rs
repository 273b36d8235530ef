//! Select grammar error types.

use thiserror::Error;

use super::span::Span;

/// A malformed `select` expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {}..{}", span.start, span.end)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// A field with no name, e.g. `id,,name` or `(id)`.
    #[must_use]
    pub fn empty_identifier(span: Span) -> Self {
        Self::new("empty identifier", span)
    }

    /// An opening parenthesis that is never closed.
    #[must_use]
    pub fn unclosed(open: Span) -> Self {
        Self::new("unclosed '('", open)
    }

    /// A closing parenthesis with no matching opener.
    #[must_use]
    pub fn unmatched_close(span: Span) -> Self {
        Self::new("unmatched ')'", span)
    }

    /// Something other than `,` or `)` after a complete field.
    #[must_use]
    pub fn unexpected(found: char, span: Span) -> Self {
        Self::new(format!("unexpected {found:?}, expected ',' or ')'"), span)
    }

    /// A `!modifier` other than `inner` or `left`.
    #[must_use]
    pub fn unknown_modifier(modifier: &str, span: Span) -> Self {
        Self::new(
            format!("unknown join modifier '!{modifier}', expected '!inner' or '!left'"),
            span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = ParseError::unclosed(Span::new(5, 6));
        assert_eq!(err.to_string(), "unclosed '(' at position 5..6");
    }
}
