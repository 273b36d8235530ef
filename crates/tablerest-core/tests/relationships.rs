//! Tests for relationship resolution and the relationship cache.

mod common;
use common::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tablerest_core::relation::{resolve_relationship, RelationshipResolver};
use tablerest_core::{
    Cardinality, CatalogError, ColumnCatalog, CompileError, Compiler, Ident, QueryParams,
    RelationshipCache, StaticCatalog,
};

fn ident(name: &str) -> Ident {
    Ident::new(name).unwrap()
}

/// Wraps the fixture catalog, counting lookups and yielding before answering.
struct SlowCatalog {
    inner: StaticCatalog,
    lookups: AtomicUsize,
}

impl SlowCatalog {
    fn new() -> Self {
        Self {
            inner: catalog(),
            lookups: AtomicUsize::new(0),
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ColumnCatalog for SlowCatalog {
    async fn column_exists(&self, table: &str, column: &str) -> Result<bool, CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.column_exists(table, column).await
    }
}

/// A catalog whose backing store is unreachable.
struct DownCatalog;

impl ColumnCatalog for DownCatalog {
    async fn column_exists(&self, _table: &str, _column: &str) -> Result<bool, CatalogError> {
        Err(CatalogError::new("connection refused"))
    }
}

#[tokio::test]
async fn test_posts_under_authors_is_one_to_many() {
    let d = resolve_relationship(&catalog(), &ident("authors"), &ident("posts"))
        .await
        .unwrap();
    assert_eq!(d.cardinality, Cardinality::OneToMany);
    assert_eq!(d.foreign_key.as_str(), "author_id");
    assert_eq!(d.key.as_str(), "id");
}

#[tokio::test]
async fn test_directors_under_movies_is_many_to_one() {
    let d = resolve_relationship(&catalog(), &ident("movies"), &ident("directors"))
        .await
        .unwrap();
    assert_eq!(d.cardinality, Cardinality::ManyToOne);
    assert_eq!(d.foreign_key.as_str(), "director_id");
}

#[tokio::test]
async fn test_ies_plural_singularizes_to_y() {
    let d = resolve_relationship(&catalog(), &ident("movies"), &ident("categories"))
        .await
        .unwrap();
    assert_eq!(d.cardinality, Cardinality::ManyToOne);
    assert_eq!(d.foreign_key.as_str(), "category_id");
}

#[tokio::test]
async fn test_irregular_plural_is_a_known_limitation() {
    // "movies" singularizes to "movy", so reviews.movie_id is never found.
    let catalog = catalog().table("reviews", &["id", "movie_id", "rating"]);
    let err = resolve_relationship(&catalog, &ident("movies"), &ident("reviews"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("reviews.movy_id"));
}

#[tokio::test]
async fn test_unrelated_tables_fail_with_description() {
    let err = compile_err("authors", "select=id,directors(name)").await;
    match err {
        CompileError::UnresolvableRelationship {
            parent,
            related,
            reason,
        } => {
            assert_eq!(parent, "authors");
            assert_eq!(related, "directors");
            assert_eq!(reason, "neither authors.director_id nor directors.author_id exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_catalog_failure_is_not_a_client_error() {
    let err = Compiler::new(&DownCatalog)
        .compile("authors", &QueryParams::parse("select=id,posts(id)"))
        .await
        .unwrap_err();
    assert!(matches!(err, CompileError::Catalog(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_concurrent_first_lookups_resolve_once() {
    let catalog = SlowCatalog::new();
    let cache = RelationshipCache::new();
    let resolver = RelationshipResolver::new(&catalog).with_cache(&cache);
    let (authors, posts) = (ident("authors"), ident("posts"));

    let (a, b, c) = tokio::join!(
        resolver.resolve(&authors, &posts),
        resolver.resolve(&authors, &posts),
        resolver.resolve(&authors, &posts),
    );
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(c.unwrap().cardinality, Cardinality::OneToMany);
    // authors.post_id (missing), then posts.author_id (found).
    assert_eq!(catalog.lookups(), 2);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_cached_compiles_skip_the_catalog() {
    let catalog = SlowCatalog::new();
    let cache = RelationshipCache::new();
    let compiler = Compiler::new(&catalog).with_cache(&cache);
    let params = QueryParams::parse("select=id,posts(id,stats(views))");

    let first = compiler.compile("authors", &params).await.unwrap();
    let after_first = catalog.lookups();
    let second = compiler.compile("authors", &params).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(catalog.lookups(), after_first);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_uncached_compiles_resolve_every_time() {
    let catalog = SlowCatalog::new();
    let compiler = Compiler::new(&catalog);
    let params = QueryParams::parse("select=id,posts(id)");

    compiler.compile("authors", &params).await.unwrap();
    compiler.compile("authors", &params).await.unwrap();
    assert_eq!(catalog.lookups(), 4);
}

#[tokio::test]
async fn test_cache_is_scoped_per_tenant() {
    let cache = RelationshipCache::new();
    let tenant_a = catalog().with_scope("tenant_a");
    let tenant_b = StaticCatalog::new()
        .with_scope("tenant_b")
        .table("authors", &["id", "post_id"])
        .table("posts", &["id"]);

    let a = Compiler::new(&tenant_a)
        .with_cache(&cache)
        .compile("authors", &QueryParams::parse("select=posts(id)"))
        .await
        .unwrap();
    let b = Compiler::new(&tenant_b)
        .with_cache(&cache)
        .compile("authors", &QueryParams::parse("select=posts(id)"))
        .await
        .unwrap();
    assert!(a.sql.contains("json_agg"));
    assert!(!b.sql.contains("json_agg"));
    assert_eq!(cache.len(), 2);
}
