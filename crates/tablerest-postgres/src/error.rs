//! Error types for catalog lookups and query execution.

use tablerest_core::CompileError;

/// SQLSTATE raised when `statement_timeout` cancels a statement.
const QUERY_CANCELED: &str = "57014";

/// Errors that can occur while executing a compiled query.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// The request did not compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Database error during execution; the engine message is kept as is.
    #[error("Query execution failed: {0}")]
    Database(#[from] sqlx::Error),

    /// An operand does not parse as the type the server inferred for it.
    #[error("Invalid value for parameter ${index}: {value:?} is not a valid {type_name}")]
    InvalidParameter {
        /// 1-based placeholder index.
        index: usize,
        /// Inferred PostgreSQL type name.
        type_name: String,
        /// The operand as written.
        value: String,
    },

    /// The server inferred a parameter type the executor cannot bind.
    #[error("Unsupported type {type_name} for parameter ${index}")]
    UnsupportedParameterType {
        /// 1-based placeholder index.
        index: usize,
        /// Inferred PostgreSQL type name.
        type_name: String,
    },
}

impl ExecuteError {
    /// Returns true if the server cancelled the statement on timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(e)) => e.code().as_deref() == Some(QUERY_CANCELED),
            _ => false,
        }
    }

    /// Returns true if the error was caused by the request rather than the
    /// database.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::Compile(e) => e.is_client_error(),
            Self::InvalidParameter { .. } | Self::UnsupportedParameterType { .. } => true,
            Self::Database(_) => false,
        }
    }

    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Compile(e) => e.code(),
            Self::Database(_) if self.is_timeout() => "statement_timeout",
            Self::Database(_) => "execution_failed",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::UnsupportedParameterType { .. } => "unsupported_parameter_type",
        }
    }
}

/// Result type for execution.
pub type Result<T> = std::result::Result<T, ExecuteError>;
