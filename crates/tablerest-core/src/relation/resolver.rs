//! Foreign-key inference from naming conventions.
//!
//! Given `parent` and `related`, the resolver looks for `{related}_id` on the
//! parent (many-to-one), then for `{parent}_id` on the related table
//! (one-to-many), with both names singularized first.
//!
//! Singularization is a plain suffix rule: `ies` becomes `y`, otherwise a
//! trailing `s` is dropped. Irregular plurals come out wrong (`movies`
//! becomes `movy`); schemas that rely on them will not resolve.

use tracing::debug;

use super::cache::RelationshipCache;
use super::descriptor::{Cardinality, RelationshipDescriptor};
use crate::catalog::ColumnCatalog;
use crate::error::{CompileError, Result};
use crate::ident::Ident;

/// Conventional primary-key column name.
pub const PRIMARY_KEY: &str = "id";

/// Strips an English plural suffix.
#[must_use]
pub fn singularize(table: &str) -> String {
    if let Some(stem) = table.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = table.strip_suffix('s') {
        stem.to_string()
    } else {
        table.to_string()
    }
}

/// Infers the relationship between two tables by consulting the catalog.
///
/// # Errors
///
/// Returns [`CompileError::UnresolvableRelationship`] when neither
/// foreign-key column exists, or [`CompileError::Catalog`] when the catalog
/// cannot be reached.
pub async fn resolve_relationship<C: ColumnCatalog>(
    catalog: &C,
    parent: &Ident,
    related: &Ident,
) -> Result<RelationshipDescriptor> {
    let key = Ident::new(PRIMARY_KEY)?;

    let forward = Ident::foreign_key_for(&singularize(related.as_str()))?;
    if catalog
        .column_exists(parent.as_str(), forward.as_str())
        .await?
    {
        debug!(%parent, %related, fk = %forward, "resolved many-to-one");
        return Ok(RelationshipDescriptor {
            parent: parent.clone(),
            related: related.clone(),
            cardinality: Cardinality::ManyToOne,
            foreign_key: forward,
            key,
        });
    }

    let backward = Ident::foreign_key_for(&singularize(parent.as_str()))?;
    if catalog
        .column_exists(related.as_str(), backward.as_str())
        .await?
    {
        debug!(%parent, %related, fk = %backward, "resolved one-to-many");
        return Ok(RelationshipDescriptor {
            parent: parent.clone(),
            related: related.clone(),
            cardinality: Cardinality::OneToMany,
            foreign_key: backward,
            key,
        });
    }

    Err(CompileError::UnresolvableRelationship {
        parent: parent.to_string(),
        related: related.to_string(),
        reason: format!(
            "neither {parent}.{forward} nor {related}.{backward} exists"
        ),
    })
}

/// Resolves relationships against one catalog, optionally through a shared
/// cache.
pub struct RelationshipResolver<'a, C> {
    catalog: &'a C,
    cache: Option<&'a RelationshipCache>,
}

impl<'a, C: ColumnCatalog> RelationshipResolver<'a, C> {
    /// Creates an uncached resolver.
    #[must_use]
    pub const fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            cache: None,
        }
    }

    /// Routes lookups through `cache`.
    #[must_use]
    pub const fn with_cache(mut self, cache: &'a RelationshipCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolves `parent` to `related`.
    ///
    /// # Errors
    ///
    /// See [`resolve_relationship`].
    pub async fn resolve(&self, parent: &Ident, related: &Ident) -> Result<RelationshipDescriptor> {
        match self.cache {
            Some(cache) => cache.get_or_resolve(self.catalog, parent, related).await,
            None => resolve_relationship(self.catalog, parent, related).await,
        }
    }
}
