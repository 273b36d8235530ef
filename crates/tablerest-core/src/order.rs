//! Single-column ordering from `order=column[.desc]`.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::ident::Ident;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (ASC)
    #[default]
    Asc,
    /// Descending order (DESC)
    Desc,
}

/// An ordering specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Column to order by
    pub column: Ident,
    /// Order direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates a new ascending sort.
    #[must_use]
    pub const fn asc(column: Ident) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    /// Creates a new descending sort.
    #[must_use]
    pub const fn desc(column: Ident) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }

    /// Parses an `order` parameter.
    ///
    /// Only a `.desc` suffix sorts descending; any other suffix, including
    /// a misspelt one, sorts ascending. An empty value means no ordering.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CompileError::IdentifierRejected`] if the column
    /// name is not a valid identifier.
    pub fn parse(value: &str) -> Result<Option<Self>> {
        if value.is_empty() {
            return Ok(None);
        }
        let (column, suffix) = value.split_once('.').unwrap_or((value, ""));
        let column = Ident::new(column)?;
        Ok(Some(if suffix == "desc" {
            Self::desc(column)
        } else {
            Self::asc(column)
        }))
    }

    /// Returns the SQL `ORDER BY` term against `relation`.
    #[must_use]
    pub fn to_sql<D: Dialect + ?Sized>(&self, dialect: &D, relation: &str) -> String {
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!(
            "{}.{} {direction}",
            dialect.quote_identifier(relation),
            dialect.quote_identifier(self.column.as_str())
        )
    }
}
