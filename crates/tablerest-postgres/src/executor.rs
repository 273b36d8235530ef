//! Tenant-scoped execution of compiled queries.

use std::time::Instant;

use futures::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnection, PgPool, Postgres};
use sqlx::{Either, Executor, Statement, TypeInfo};
use tablerest_core::{CompiledQuery, Dialect, Ident, PostgresDialect};
use tracing::{debug, warn};

use crate::bind::bind_all;
use crate::error::Result;

/// Alias of the derived table each result row is read from.
const ROW_ALIAS: &str = "r";

/// Wraps `sql` so every row comes back as one JSON object.
#[must_use]
pub fn wrap_rows(sql: &str) -> String {
    let dialect = PostgresDialect::new();
    let alias = dialect.quote_identifier(ROW_ALIAS);
    format!("SELECT {} FROM ({sql}) AS {alias}", dialect.row_to_json(&alias))
}

/// Runs compiled queries inside a read-only transaction pinned to a tenant
/// schema.
///
/// The pool should be built with [`crate::connect_options`], which turns the
/// per-connection statement cache off. Every statement runs unnamed, so
/// pooled connections accumulate no server-side prepared statements.
#[derive(Debug, Clone)]
pub struct TenantExecutor {
    pool: PgPool,
    statement_timeout_ms: u64,
}

impl TenantExecutor {
    /// Creates an executor; a `statement_timeout_ms` of 0 leaves the server
    /// default in place.
    #[must_use]
    pub const fn new(pool: PgPool, statement_timeout_ms: u64) -> Self {
        Self {
            pool,
            statement_timeout_ms,
        }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Executes `query` against `tenant`'s schema and returns one JSON object
    /// per row.
    ///
    /// Dropping the returned future drops the transaction, which rolls it
    /// back.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExecuteError::Database`] for any driver or server
    /// failure, or a conversion error if an operand does not fit its
    /// parameter type.
    pub async fn fetch_json(&self, tenant: &Ident, query: &CompiledQuery) -> Result<Vec<Value>> {
        let start = Instant::now();
        let dialect = PostgresDialect::new();
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .persistent(false)
            .execute(&mut *tx)
            .await?;
        let search_path = format!(
            "SET LOCAL search_path TO {}",
            dialect.quote_identifier(tenant.as_str())
        );
        sqlx::query(&search_path)
            .persistent(false)
            .execute(&mut *tx)
            .await?;
        if self.statement_timeout_ms > 0 {
            let timeout = format!("SET LOCAL statement_timeout = {}", self.statement_timeout_ms);
            sqlx::query(&timeout)
                .persistent(false)
                .execute(&mut *tx)
                .await?;
        }

        let sql = wrap_rows(&query.sql);
        let args = if query.params.is_empty() {
            PgArguments::default()
        } else {
            let types = parameter_types(&mut tx, &sql).await?;
            if types.len() != query.params.len() {
                warn!(
                    expected = types.len(),
                    given = query.params.len(),
                    "parameter count mismatch"
                );
                return Err(sqlx::Error::Protocol(format!(
                    "statement expects {} parameters, {} given",
                    types.len(),
                    query.params.len()
                ))
                .into());
            }
            bind_all(&types, &query.params)?
        };

        let mut rows = Vec::new();
        {
            let mut stream = sqlx::query_scalar_with::<Postgres, Value, _>(&sql, args)
                .persistent(false)
                .fetch(&mut *tx);
            while let Some(row) = stream.try_next().await? {
                rows.push(row);
            }
        }
        tx.commit().await?;

        debug!(
            tenant = %tenant,
            params = query.params.len(),
            rows = rows.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "query executed"
        );
        Ok(rows)
    }
}

/// Prepares `sql` and returns the type the server inferred for each
/// placeholder.
///
/// The driver always names an explicitly prepared statement and, with its
/// cache off, never closes it, so the statement is deallocated here.
async fn parameter_types(conn: &mut PgConnection, sql: &str) -> Result<Vec<String>> {
    let statement = (&mut *conn).prepare(sql).await?;
    let types = match statement.parameters() {
        Some(Either::Left(types)) => types.iter().map(|ty| ty.name().to_string()).collect(),
        _ => Vec::new(),
    };
    sqlx::query("DEALLOCATE ALL")
        .persistent(false)
        .execute(&mut *conn)
        .await?;
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_rows() {
        assert_eq!(
            wrap_rows(r#"SELECT "authors".* FROM "authors""#),
            r#"SELECT row_to_json("r") FROM (SELECT "authors".* FROM "authors") AS "r""#
        );
    }
}
