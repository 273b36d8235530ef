//! # tablerest-server
//!
//! The HTTP surface: `GET /{table}` compiles the query string, runs it in
//! the schema named by the tenant header and answers with a JSON array of
//! rows.

pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod service;

pub use config::Cli;
pub use error::RequestError;
pub use handler::{handle, AppState};
pub use request::Request;
pub use response::Response;
pub use service::serve;
