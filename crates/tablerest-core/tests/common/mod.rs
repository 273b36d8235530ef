#![allow(dead_code)]

use tablerest_core::{CompileError, CompiledQuery, Compiler, QueryParams, StaticCatalog};

/// The fixture schema shared by the compiler tests.
pub fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .table("authors", &["id", "name", "email"])
        .table("posts", &["id", "author_id", "title", "content", "created_at"])
        .table("stats", &["id", "post_id", "views"])
        .table("movies", &["id", "title", "year", "director_id", "category_id"])
        .table("directors", &["id", "name"])
        .table("categories", &["id", "name"])
}

pub async fn compile(table: &str, query: &str) -> Result<CompiledQuery, CompileError> {
    let catalog = catalog();
    Compiler::new(&catalog)
        .compile(table, &QueryParams::parse(query))
        .await
}

pub async fn compile_ok(table: &str, query: &str) -> CompiledQuery {
    let compiled = compile(table, query)
        .await
        .unwrap_or_else(|e| panic!("Failed to compile: {table}?{query}\nError: {e:?}"));
    assert_eq!(
        placeholder_count(&compiled.sql),
        compiled.params.len(),
        "placeholder/parameter mismatch in {}",
        compiled.sql
    );
    compiled
}

pub async fn compile_err(table: &str, query: &str) -> CompileError {
    match compile(table, query).await {
        Ok(compiled) => panic!("Expected compile error for: {table}?{query}\nGot: {}", compiled.sql),
        Err(e) => e,
    }
}

/// Counts `$n` placeholders in `sql`.
pub fn placeholder_count(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    bytes
        .windows(2)
        .filter(|w| w[0] == b'$' && w[1].is_ascii_digit())
        .count()
}
