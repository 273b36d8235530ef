//! # tablerest-core
//!
//! Compiles REST-style query parameters into a single parameterized SQL
//! statement, with related resources embedded as nested JSON.
//!
//! This crate provides:
//! - A recursive-descent parser for the `select` grammar, including
//!   `!inner` / `!left` modifiers at any depth
//! - Foreign-key inference from naming conventions, against an injected
//!   [`ColumnCatalog`], with an optional process-wide cache
//! - Lowering of embeds into correlated JSON subqueries
//! - Root filters, single-column ordering and pagination
//! - Protection against SQL injection: operands are always placeholders and
//!   identifiers are validated before they reach statement text
//!
//! ## Example
//!
//! ```ignore
//! use tablerest_core::{Compiler, QueryParams, StaticCatalog};
//!
//! let catalog = StaticCatalog::new()
//!     .table("authors", &["id", "name"])
//!     .table("posts", &["id", "author_id", "content"]);
//!
//! let params = QueryParams::parse("select=id,posts!inner(content)&name=like.J%25");
//! let query = Compiler::new(&catalog).compile("authors", &params).await?;
//!
//! // SELECT "authors"."id", (SELECT COALESCE(json_agg(...), '[]'::json) ...) AS "posts"
//! //   FROM "authors" WHERE "authors"."name" LIKE $1 AND EXISTS (...)
//! assert_eq!(query.params, vec!["J%"]);
//! ```

pub mod catalog;
pub mod compile;
pub mod dialect;
pub mod embed;
pub mod error;
pub mod filter;
pub mod ident;
pub mod join;
pub mod order;
pub mod page;
pub mod params;
pub mod relation;
pub mod select;
pub mod statement;

pub use catalog::{CatalogError, ColumnCatalog, StaticCatalog};
pub use compile::{CompiledQuery, Compiler};
pub use dialect::{Dialect, PostgresDialect};
pub use error::{CompileError, Result};
pub use filter::{FilterOp, FilterPredicate};
pub use ident::Ident;
pub use order::{SortDirection, SortSpec};
pub use page::PageSpec;
pub use params::QueryParams;
pub use relation::{Cardinality, RelationshipCache, RelationshipDescriptor};
pub use select::{parse_select, EmbedNode, FieldNode, JoinType, ParseError};
