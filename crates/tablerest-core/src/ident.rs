//! Validated SQL identifiers.
//!
//! SQL cannot parameterize table, column or schema names, so every such name
//! that reaches statement text goes through [`Ident::new`] first. The accepted
//! charset is `[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes (PostgreSQL's
//! `NAMEDATALEN - 1`). A name outside it is rejected outright, never escaped.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CompileError, Result};

/// Longest identifier PostgreSQL keeps without truncation.
pub const MAX_IDENT_LEN: usize = 63;

static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// A table, column or schema name that is safe to embed in SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    /// Validates `name` against the identifier charset.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::IdentifierRejected`] if the name is empty, too
    /// long, or contains anything outside `[A-Za-z0-9_]`.
    pub fn new(name: &str) -> Result<Self> {
        if name.len() > MAX_IDENT_LEN || !IDENT_RE.is_match(name) {
            return Err(CompileError::IdentifierRejected(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the conventional foreign-key column name `{singular}_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::IdentifierRejected`] if the name would exceed
    /// [`MAX_IDENT_LEN`].
    pub(crate) fn foreign_key_for(singular: &str) -> Result<Self> {
        Self::new(&format!("{singular}_id"))
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["authors", "first_name", "_private", "T1", "post_id"] {
            assert_eq!(Ident::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_rejects_injection_attempts() {
        for name in [
            "",
            "1abc",
            "first name",
            "id;drop table users",
            "\"quoted\"",
            "public\"; SET ROLE postgres; --",
            "a.b",
            "a-b",
            "*",
            "名前",
        ] {
            assert!(
                matches!(Ident::new(name), Err(CompileError::IdentifierRejected(n)) if n == name),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_length_limit() {
        let ok = "a".repeat(MAX_IDENT_LEN);
        let too_long = "a".repeat(MAX_IDENT_LEN + 1);
        assert!(Ident::new(&ok).is_ok());
        assert!(Ident::new(&too_long).is_err());
    }
}
