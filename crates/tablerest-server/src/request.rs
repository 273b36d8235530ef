//! HTTP request type.

use std::collections::HashMap;

use hyper::Method;
use tablerest_core::QueryParams;

/// An HTTP request, detached from the connection it arrived on.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Decoded query string, in order.
    pub query: QueryParams,
    /// Request headers.
    pub headers: HashMap<String, String>,
}

impl Request {
    /// Creates a new request.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            headers: HashMap::new(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Replaces the query with a raw query string.
    #[must_use]
    pub fn query_string(mut self, query: &str) -> Self {
        self.query = QueryParams::parse(query);
        self
    }

    /// Gets a header value.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the table named by a `/{table}` path.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.path
            .strip_prefix('/')
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
    }
}
