//! Error types for query compilation.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::select::ParseError;

/// Errors produced while compiling a request into SQL.
///
/// Every variant corresponds to input the compiler recognised but could not
/// accept; none of them is ever downgraded into a partial statement.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The `select` expression is malformed.
    #[error("invalid select expression: {0}")]
    Parse(#[from] ParseError),

    /// No foreign key could be inferred between two tables.
    #[error("cannot resolve relationship between '{parent}' and '{related}': {reason}")]
    UnresolvableRelationship {
        /// Table the embed or join hangs off.
        parent: String,
        /// Table being embedded or joined.
        related: String,
        /// What was looked for and not found.
        reason: String,
    },

    /// A filter used an operator outside `eq,gt,lt,gte,lte,like,in`.
    #[error("unsupported operator '{operator}' on column '{column}'")]
    UnsupportedOperator {
        /// Filtered column.
        column: String,
        /// The operator as written.
        operator: String,
    },

    /// `limit` or `offset` is not a non-negative integer.
    #[error("invalid pagination: {param}={value} is not a non-negative integer")]
    InvalidPagination {
        /// `limit` or `offset`.
        param: &'static str,
        /// The rejected value.
        value: String,
    },

    /// An identifier failed charset validation.
    #[error("identifier rejected: {0:?}")]
    IdentifierRejected(String),

    /// A query parameter has a shape the compiler does not understand.
    #[error("unknown query parameter: {0}")]
    UnknownParameter(String),

    /// The schema catalog could not be consulted.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl CompileError {
    /// Returns true if the error was caused by the request rather than the
    /// environment.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Catalog(_))
    }

    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::UnresolvableRelationship { .. } => "unresolvable_relationship",
            Self::UnsupportedOperator { .. } => "unsupported_operator",
            Self::InvalidPagination { .. } => "invalid_pagination",
            Self::IdentifierRejected(_) => "identifier_rejected",
            Self::UnknownParameter(_) => "unknown_parameter",
            Self::Catalog(_) => "catalog_unavailable",
        }
    }
}

/// Result type alias for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
