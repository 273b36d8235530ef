//! # tablerest-postgres
//!
//! PostgreSQL collaborators for `tablerest-core`:
//! - [`PgCatalog`], a [`tablerest_core::ColumnCatalog`] answering from
//!   `information_schema.columns` within one tenant schema
//! - [`TenantExecutor`], which runs a compiled query in a read-only
//!   transaction with `search_path` pinned to the tenant and returns the rows
//!   as JSON objects
//! - Operand coercion from query-string text to the parameter types the
//!   server infers
//!
//! ## Example
//!
//! ```ignore
//! use tablerest_core::{Compiler, Ident, QueryParams};
//! use tablerest_postgres::{connect, PgCatalog, PoolSettings, TenantExecutor};
//!
//! let pool = connect("postgres://localhost/app", &PoolSettings::default()).await?;
//! let tenant = Ident::new("acme")?;
//! let catalog = PgCatalog::new(pool.clone(), tenant.clone());
//! let query = Compiler::new(&catalog)
//!     .compile("authors", &QueryParams::parse("select=id,posts(title)"))
//!     .await?;
//! let rows = TenantExecutor::new(pool, 30_000).fetch_json(&tenant, &query).await?;
//! ```

pub mod bind;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod pool;

pub use bind::{coerce, BoundValue};
pub use catalog::PgCatalog;
pub use error::{ExecuteError, Result};
pub use executor::{wrap_rows, TenantExecutor};
pub use pool::{connect, connect_lazy, connect_options, PoolSettings};
