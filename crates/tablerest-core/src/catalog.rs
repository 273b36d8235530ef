//! Schema metadata capability.
//!
//! Driver crates (tablerest-postgres, etc.) implement [`ColumnCatalog`]
//! against the live schema. The core crate defines only the trait, plus an
//! in-memory [`StaticCatalog`] for tests and embedding.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::{self, Future};

use thiserror::Error;

/// A metadata lookup that could not be answered.
///
/// This is distinct from "the column does not exist": a missing column is
/// `Ok(false)`, an unreachable catalog is an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("catalog lookup failed: {message}")]
pub struct CatalogError {
    /// Driver-supplied description.
    pub message: String,
}

impl CatalogError {
    /// Creates a new catalog error.
    #[must_use]
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Answers whether a column exists on a table.
pub trait ColumnCatalog: Send + Sync {
    /// Namespace the answers are valid for, such as a tenant schema.
    ///
    /// Relationship descriptors are cached per scope, so two catalogs that
    /// may disagree about a table must return different scopes.
    fn scope(&self) -> &str {
        ""
    }

    /// Returns true if `table` has a column named `column`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the catalog cannot be consulted.
    fn column_exists(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = Result<bool, CatalogError>> + Send;
}

impl<C: ColumnCatalog> ColumnCatalog for &C {
    fn scope(&self) -> &str {
        (**self).scope()
    }

    fn column_exists(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = Result<bool, CatalogError>> + Send {
        (**self).column_exists(table, column)
    }
}

/// A fixed, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    scope: String,
    tables: HashMap<String, HashSet<String>>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scope reported by [`ColumnCatalog::scope`].
    #[must_use]
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }

    /// Adds a table with the given columns.
    #[must_use]
    pub fn table(mut self, name: &str, columns: &[&str]) -> Self {
        self.tables
            .entry(name.to_string())
            .or_default()
            .extend(columns.iter().map(|c| (*c).to_string()));
        self
    }

    /// Returns true if the table is known.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}

impl ColumnCatalog for StaticCatalog {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn column_exists(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = Result<bool, CatalogError>> + Send {
        let exists = self
            .tables
            .get(table)
            .is_some_and(|columns| columns.contains(column));
        future::ready(Ok(exists))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_catalog_lookup() {
        let catalog = StaticCatalog::new()
            .table("authors", &["id", "name"])
            .table("posts", &["id", "author_id"]);

        assert!(catalog.column_exists("authors", "name").await.unwrap());
        assert!(catalog.column_exists("posts", "author_id").await.unwrap());
        assert!(!catalog.column_exists("posts", "name").await.unwrap());
        assert!(!catalog.column_exists("comments", "id").await.unwrap());
        assert!(catalog.has_table("posts"));
        assert_eq!(catalog.scope(), "");
    }

    #[tokio::test]
    async fn test_reference_forwards_to_catalog() {
        let catalog = StaticCatalog::new()
            .with_scope("tenant_a")
            .table("authors", &["id"]);
        let by_ref = &catalog;
        assert_eq!(ColumnCatalog::scope(&by_ref), "tenant_a");
        assert!(by_ref.column_exists("authors", "id").await.unwrap());
    }
}
