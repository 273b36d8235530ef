//! Process-wide relationship cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use super::descriptor::RelationshipDescriptor;
use super::resolver::resolve_relationship;
use crate::catalog::ColumnCatalog;
use crate::error::Result;
use crate::ident::Ident;

/// `(catalog scope, parent, related)`.
type CacheKey = (String, String, String);

/// Memoizes resolved relationships.
///
/// Each key owns a [`OnceCell`], so concurrent first lookups for the same key
/// share a single catalog round-trip. Failed resolutions drop their entry and
/// the next lookup retries.
#[derive(Debug, Default)]
pub struct RelationshipCache {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<RelationshipDescriptor>>>>,
}

impl RelationshipCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<OnceCell<RelationshipDescriptor>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached descriptor, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors; they are not cached.
    pub async fn get_or_resolve<C: ColumnCatalog>(
        &self,
        catalog: &C,
        parent: &Ident,
        related: &Ident,
    ) -> Result<RelationshipDescriptor> {
        let key = (
            catalog.scope().to_string(),
            parent.to_string(),
            related.to_string(),
        );
        let cell = Arc::clone(self.lock().entry(key.clone()).or_default());
        let resolved = cell
            .get_or_try_init(|| resolve_relationship(catalog, parent, related))
            .await
            .cloned();
        if resolved.is_err() {
            self.forget_failed(&key, &cell);
        }
        resolved
    }

    /// Removes `key` if it still maps to `cell` and nothing filled it since.
    fn forget_failed(&self, key: &CacheKey, cell: &Arc<OnceCell<RelationshipDescriptor>>) {
        let mut entries = self.lock();
        let stale = entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized());
        if stale {
            entries.remove(key);
        }
    }

    /// Returns a descriptor already in the cache.
    #[must_use]
    pub fn get(&self, scope: &str, parent: &str, related: &str) -> Option<RelationshipDescriptor> {
        let key = (scope.to_string(), parent.to_string(), related.to_string());
        self.lock().get(&key).and_then(|cell| cell.get().cloned())
    }

    /// Number of resolved relationships.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().values().filter(|cell| cell.initialized()).count()
    }

    /// Returns true if nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every entry, e.g. after a schema migration.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::error::CompileError;
    use crate::relation::Cardinality;

    fn ident(name: &str) -> Ident {
        Ident::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_caches_by_scope() {
        let cache = RelationshipCache::new();
        let a = StaticCatalog::new()
            .with_scope("tenant_a")
            .table("authors", &["id"])
            .table("posts", &["id", "author_id"]);
        let b = StaticCatalog::new()
            .with_scope("tenant_b")
            .table("authors", &["id", "post_id"])
            .table("posts", &["id"]);

        let da = cache
            .get_or_resolve(&a, &ident("authors"), &ident("posts"))
            .await
            .unwrap();
        let db = cache
            .get_or_resolve(&b, &ident("authors"), &ident("posts"))
            .await
            .unwrap();
        assert_eq!(da.cardinality, Cardinality::OneToMany);
        assert_eq!(db.cardinality, Cardinality::ManyToOne);
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get("tenant_a", "authors", "posts").unwrap().foreign_key.as_str(),
            "author_id"
        );
        assert!(cache.get("tenant_c", "authors", "posts").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = RelationshipCache::new();
        let catalog = StaticCatalog::new().table("authors", &["id"]);
        let err = cache
            .get_or_resolve(&catalog, &ident("authors"), &ident("posts"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::UnresolvableRelationship { .. }));
        assert!(cache.is_empty());

        let catalog = catalog.table("posts", &["id", "author_id"]);
        let d = cache
            .get_or_resolve(&catalog, &ident("authors"), &ident("posts"))
            .await
            .unwrap();
        assert_eq!(d.cardinality, Cardinality::OneToMany);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookups_do_not_grow_the_map() {
        let cache = RelationshipCache::new();
        let catalog = StaticCatalog::new()
            .table("authors", &["id"])
            .table("posts", &["id", "author_id"]);
        for i in 0..200 {
            let related = ident(&format!("missing_{i}"));
            let err = cache
                .get_or_resolve(&catalog, &ident("authors"), &related)
                .await
                .unwrap_err();
            assert!(matches!(err, CompileError::UnresolvableRelationship { .. }));
        }
        assert_eq!(cache.lock().len(), 0);

        cache
            .get_or_resolve(&catalog, &ident("authors"), &ident("posts"))
            .await
            .unwrap();
        assert_eq!(cache.lock().len(), 1);
    }
}
