//! Column catalog backed by `information_schema`.

use sqlx::postgres::PgPool;
use tablerest_core::{CatalogError, ColumnCatalog, Ident};
use tracing::debug;

/// Looks a column up within one schema.
pub const COLUMN_EXISTS_SQL: &str = r"
SELECT EXISTS (
    SELECT 1
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2 AND column_name = $3
)
";

/// Answers column lookups for a single tenant schema.
///
/// The schema doubles as the catalog scope, so cached relationships are
/// never shared between tenants.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
    schema: Ident,
}

impl PgCatalog {
    /// Creates a catalog for `schema`.
    #[must_use]
    pub const fn new(pool: PgPool, schema: Ident) -> Self {
        Self { pool, schema }
    }

    /// The schema lookups are scoped to.
    #[must_use]
    pub const fn schema(&self) -> &Ident {
        &self.schema
    }
}

impl ColumnCatalog for PgCatalog {
    fn scope(&self) -> &str {
        self.schema.as_str()
    }

    async fn column_exists(&self, table: &str, column: &str) -> Result<bool, CatalogError> {
        let exists: bool = sqlx::query_scalar(COLUMN_EXISTS_SQL)
            .bind(self.schema.as_str())
            .bind(table)
            .bind(column)
            .persistent(false)
            .fetch_one(&self.pool)
            .await
            .map_err(CatalogError::new)?;
        debug!(schema = %self.schema, table, column, exists, "column lookup");
        Ok(exists)
    }
}
