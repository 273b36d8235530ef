//! PostgreSQL dialect.

use super::Dialect;

/// PostgreSQL: `$n` placeholders and the `json` family of functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn row_to_json(&self, relation: &str) -> String {
        format!("row_to_json({relation})")
    }

    fn json_array_agg(&self, expr: &str) -> String {
        format!("json_agg({expr})")
    }

    fn empty_json_array(&self) -> &'static str {
        "'[]'::json"
    }
}
