//! Request-level errors and their HTTP statuses.

use std::time::Duration;

use tablerest_core::CompileError;
use tablerest_postgres::ExecuteError;

/// Errors that end a request early.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The tenant header is absent.
    #[error("Missing {0} header")]
    MissingTenant(String),

    /// The tenant header is not a valid schema name.
    #[error("Invalid tenant: {0:?}")]
    InvalidTenant(String),

    /// Compilation or execution failed.
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    /// The request ran past its deadline.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl From<CompileError> for RequestError {
    fn from(e: CompileError) -> Self {
        Self::Execute(ExecuteError::Compile(e))
    }
}

impl RequestError {
    /// HTTP status for the error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingTenant(_) | Self::InvalidTenant(_) => 400,
            Self::Execute(ExecuteError::Compile(CompileError::Catalog(_))) => 503,
            Self::Execute(e) if e.is_timeout() => 504,
            Self::Execute(e) if e.is_client_error() => 400,
            Self::Execute(_) => 500,
            Self::Timeout(_) => 504,
        }
    }

    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTenant(_) => "missing_tenant",
            Self::InvalidTenant(_) => "invalid_tenant",
            Self::Execute(e) => e.code(),
            Self::Timeout(_) => "request_timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablerest_core::CatalogError;

    #[test]
    fn test_statuses() {
        let missing = RequestError::MissingTenant(String::from("X-Tenant-ID"));
        assert_eq!(missing.status(), 400);
        assert_eq!(missing.to_string(), "Missing X-Tenant-ID header");

        let parse = RequestError::from(CompileError::UnknownParameter(String::from("a.b")));
        assert_eq!(parse.status(), 400);
        assert_eq!(parse.code(), "unknown_parameter");

        let catalog = RequestError::from(CompileError::Catalog(CatalogError::new("refused")));
        assert_eq!(catalog.status(), 503);
        assert_eq!(catalog.code(), "catalog_unavailable");

        let db = RequestError::from(ExecuteError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(db.status(), 500);
        assert!(db.to_string().starts_with("Query execution failed: "));

        let timeout = RequestError::Timeout(Duration::from_millis(250));
        assert_eq!(timeout.status(), 504);
        assert_eq!(timeout.to_string(), "Request timed out after 250ms");
    }
}
