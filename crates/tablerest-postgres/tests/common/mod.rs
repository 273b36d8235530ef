#![allow(dead_code)]

use sqlx::postgres::PgPool;
use tablerest_postgres::{connect, PoolSettings};

/// Fixture tables, created inside each test's schema.
pub const FIXTURE_SQL: [&str; 13] = [
    "CREATE TABLE authors (id INT4 PRIMARY KEY, name TEXT NOT NULL, email TEXT)",
    "CREATE TABLE posts (id INT4 PRIMARY KEY, author_id INT4 REFERENCES authors(id), title TEXT, content TEXT, created_at TIMESTAMPTZ NOT NULL DEFAULT now())",
    "CREATE TABLE stats (id INT4 PRIMARY KEY, post_id INT4 REFERENCES posts(id), views INT8)",
    "INSERT INTO authors VALUES (1, 'Jane', 'jane@example.com'), (2, 'John', NULL), (3, 'Ann', NULL)",
    "INSERT INTO posts (id, author_id, title, content) VALUES (10, 1, 'First', 'hello'), (11, 1, 'Second', 'world'), (12, 2, 'Third', 'again')",
    "INSERT INTO stats VALUES (100, 10, 42)",
    "CREATE TABLE directors (id INT4 PRIMARY KEY, name TEXT NOT NULL)",
    "INSERT INTO directors VALUES (1, 'Lynch')",
    "CREATE TABLE movies (id INT4 PRIMARY KEY, title TEXT, rating NUMERIC(3, 1), director_id INT4 REFERENCES directors(id))",
    "INSERT INTO movies VALUES (1, 'Alpha', 7.5, 1), (2, 'Beta', 9.0, NULL)",
    "CREATE TABLE accounts (id INT4 PRIMARY KEY, balance NUMERIC(30, 2) NOT NULL)",
    "INSERT INTO accounts VALUES (1, 12345678901234567.89), (2, 12345678901234567.80)",
    "CREATE SEQUENCE counter",
];

/// Connects to `DATABASE_URL` and recreates the fixture schema `tenant`.
///
/// Each test uses its own schema so tests can run in parallel.
pub async fn setup(tenant: &str) -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = connect(&url, &PoolSettings::default())
        .await
        .expect("Failed to connect");
    sqlx::query(&format!("DROP SCHEMA IF EXISTS {tenant} CASCADE"))
        .execute(&pool)
        .await
        .expect("Failed to drop schema");
    sqlx::query(&format!("CREATE SCHEMA {tenant}"))
        .execute(&pool)
        .await
        .expect("Failed to create schema");
    let mut conn = pool.acquire().await.expect("Failed to acquire");
    sqlx::query(&format!("SET search_path TO {tenant}"))
        .execute(&mut *conn)
        .await
        .expect("Failed to set search_path");
    for sql in FIXTURE_SQL {
        sqlx::query(sql)
            .execute(&mut *conn)
            .await
            .unwrap_or_else(|e| panic!("Failed to run fixture: {sql}\nError: {e}"));
    }
    sqlx::query("RESET search_path")
        .execute(&mut *conn)
        .await
        .expect("Failed to reset search_path");
    pool
}
