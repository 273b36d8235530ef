//! Flat `LEFT JOIN`s written as `table=fk.pk`.
//!
//! Unlike embeds, a flat join appends the joined table's columns to the root
//! row instead of nesting them. `table.select=a,b` narrows the appended
//! columns; without it every column is appended.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::ident::Ident;

/// One flat join against the root table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatJoin {
    /// Joined table.
    pub table: Ident,
    /// Column on the root table.
    pub foreign_key: Ident,
    /// Column on the joined table.
    pub key: Ident,
    /// Appended columns; empty means all.
    pub columns: Vec<Ident>,
}

impl FlatJoin {
    /// Returns `(fk, pk)` if `value` has the `fk.pk` shape.
    #[must_use]
    pub fn split_spec(value: &str) -> Option<(&str, &str)> {
        let (fk, pk) = value.split_once('.')?;
        (!fk.is_empty() && !pk.is_empty() && !pk.contains('.')).then_some((fk, pk))
    }

    /// Builds a join from its table name and `fk.pk` parts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CompileError::IdentifierRejected`] if any name is not
    /// a valid identifier.
    pub fn new(table: &str, foreign_key: &str, key: &str) -> Result<Self> {
        Ok(Self {
            table: Ident::new(table)?,
            foreign_key: Ident::new(foreign_key)?,
            key: Ident::new(key)?,
            columns: Vec::new(),
        })
    }

    /// Appends the comma-separated column list from `{table}.select`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CompileError::IdentifierRejected`] for an invalid
    /// column name.
    pub fn select_columns(&mut self, list: &str) -> Result<()> {
        for column in list.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            self.columns.push(Ident::new(column)?);
        }
        Ok(())
    }

    /// Returns the quoted table and the `ON` condition.
    #[must_use]
    pub fn to_sql<D: Dialect + ?Sized>(&self, dialect: &D, root: &str) -> (String, String) {
        let table = dialect.quote_identifier(self.table.as_str());
        let on = format!(
            "{}.{} = {table}.{}",
            dialect.quote_identifier(root),
            dialect.quote_identifier(self.foreign_key.as_str()),
            dialect.quote_identifier(self.key.as_str()),
        );
        (table, on)
    }

    /// Returns the select-list entries appended to the root row.
    #[must_use]
    pub fn column_sql<D: Dialect + ?Sized>(&self, dialect: &D) -> Vec<String> {
        let table = dialect.quote_identifier(self.table.as_str());
        if self.columns.is_empty() {
            return vec![format!("{table}.*")];
        }
        self.columns
            .iter()
            .map(|c| format!("{table}.{}", dialect.quote_identifier(c.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;

    #[test]
    fn test_split_spec() {
        assert_eq!(FlatJoin::split_spec("director_id.id"), Some(("director_id", "id")));
        assert_eq!(FlatJoin::split_spec("director_id"), None);
        assert_eq!(FlatJoin::split_spec(".id"), None);
        assert_eq!(FlatJoin::split_spec("a."), None);
        assert_eq!(FlatJoin::split_spec("a.b.c"), None);
    }

    #[test]
    fn test_sql() {
        let mut join = FlatJoin::new("directors", "director_id", "id").unwrap();
        let (table, on) = join.to_sql(&PostgresDialect, "movies");
        assert_eq!(table, r#""directors""#);
        assert_eq!(on, r#""movies"."director_id" = "directors"."id""#);
        assert_eq!(join.column_sql(&PostgresDialect), vec![r#""directors".*"#]);

        join.select_columns("name, born").unwrap();
        assert_eq!(
            join.column_sql(&PostgresDialect),
            vec![r#""directors"."name""#, r#""directors"."born""#]
        );
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(FlatJoin::new("directors", "director_id;--", "id").is_err());
        let mut join = FlatJoin::new("directors", "director_id", "id").unwrap();
        assert!(join.select_columns("name,1=1").is_err());
    }
}
