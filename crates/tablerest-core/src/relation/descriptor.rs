//! Resolved relationship metadata.

use std::fmt;

use crate::dialect::Dialect;
use crate::ident::Ident;

/// Whether an embed yields one related row or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// The parent holds the foreign key; the embed is a JSON object or null.
    ManyToOne,
    /// The related table holds the foreign key; the embed is a JSON array.
    OneToMany,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManyToOne => f.write_str("many-to-one"),
            Self::OneToMany => f.write_str("one-to-many"),
        }
    }
}

/// How `parent` reaches `related`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    /// Table the embed hangs off.
    pub parent: Ident,
    /// Embedded table.
    pub related: Ident,
    /// Direction of the foreign key.
    pub cardinality: Cardinality,
    /// Foreign-key column; on `parent` for many-to-one, on `related` for
    /// one-to-many.
    pub foreign_key: Ident,
    /// Referenced key column on the other side.
    pub key: Ident,
}

impl RelationshipDescriptor {
    /// Renders the correlation predicate between a row of `related` (aliased
    /// `related_alias`) and its parent row (aliased `parent_alias`).
    #[must_use]
    pub fn join_condition<D: Dialect + ?Sized>(
        &self,
        dialect: &D,
        parent_alias: &str,
        related_alias: &str,
    ) -> String {
        let (related_col, parent_col) = match self.cardinality {
            Cardinality::ManyToOne => (&self.key, &self.foreign_key),
            Cardinality::OneToMany => (&self.foreign_key, &self.key),
        };
        format!(
            "{}.{} = {}.{}",
            dialect.quote_identifier(related_alias),
            dialect.quote_identifier(related_col.as_str()),
            dialect.quote_identifier(parent_alias),
            dialect.quote_identifier(parent_col.as_str()),
        )
    }
}
