//! SQL dialect support.
//!
//! The compiler emits JSON-shaping subqueries whose exact spelling depends on
//! the database. This module provides a trait for those dialect-specific
//! pieces; statement structure stays in the compiler.

mod postgres;

pub use postgres::PostgresDialect;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier.
    ///
    /// Callers must only pass validated identifiers or compiler-generated
    /// aliases; no escaping is performed.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        format!("{quote}{name}{quote}")
    }

    /// Returns the placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Converts the current row of `relation` into a JSON object.
    fn row_to_json(&self, relation: &str) -> String;

    /// Aggregates `expr` over a group into a JSON array (NULL for no rows).
    fn json_array_agg(&self, expr: &str) -> String;

    /// The literal for an empty JSON array.
    fn empty_json_array(&self) -> &'static str;
}
