//! The `GET /{table}` handler.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::Method;
use serde_json::Value;
use tablerest_core::{Compiler, Ident, RelationshipCache};
use tablerest_postgres::{PgCatalog, TenantExecutor};
use tracing::{debug, error, info, warn};

use crate::error::RequestError;
use crate::request::Request;
use crate::response::Response;

/// State shared by every connection.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Runs compiled queries.
    pub executor: TenantExecutor,
    /// Relationship cache, unless disabled.
    pub cache: Option<Arc<RelationshipCache>>,
    /// Header naming the tenant schema.
    pub tenant_header: String,
    /// Overall deadline for one request.
    pub request_timeout: Option<Duration>,
}

impl AppState {
    /// Creates state with a fresh relationship cache and no deadline.
    #[must_use]
    pub fn new(executor: TenantExecutor) -> Self {
        Self {
            executor,
            cache: Some(Arc::new(RelationshipCache::new())),
            tenant_header: String::from("X-Tenant-ID"),
            request_timeout: None,
        }
    }

    /// Disables relationship caching.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Sets the tenant header name.
    #[must_use]
    pub fn tenant_header(mut self, header: impl Into<String>) -> Self {
        self.tenant_header = header.into();
        self
    }

    /// Sets the request deadline.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Serves one request.
pub async fn handle(state: &AppState, req: Request) -> Response {
    let start = Instant::now();
    let Some(table) = req.table() else {
        debug!(path = %req.path, "no route");
        return Response::not_found();
    };
    if req.method != Method::GET {
        return Response::method_not_allowed();
    }

    let tenant = req.get_header(&state.tenant_header).unwrap_or_default();
    let response = match fetch(state, table, &req).await {
        Ok(rows) => Response::json(&rows),
        Err(e) => {
            let status = e.status();
            if status >= 500 {
                error!(table, tenant, error = %e, "request failed");
            } else {
                warn!(table, tenant, error = %e, "request rejected");
            }
            Response::error(status, e.code(), &e.to_string())
        }
    };
    info!(
        method = %req.method,
        table,
        tenant,
        status = response.status,
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request"
    );
    response
}

async fn fetch(state: &AppState, table: &str, req: &Request) -> Result<Vec<Value>, RequestError> {
    let tenant = req
        .get_header(&state.tenant_header)
        .ok_or_else(|| RequestError::MissingTenant(state.tenant_header.clone()))?;
    let tenant = Ident::new(tenant).map_err(|_| RequestError::InvalidTenant(tenant.to_string()))?;

    let work = async {
        let catalog = PgCatalog::new(state.executor.pool().clone(), tenant.clone());
        let mut compiler = Compiler::new(&catalog);
        if let Some(cache) = &state.cache {
            compiler = compiler.with_cache(cache);
        }
        let query = compiler.compile(table, &req.query).await?;
        Ok::<_, RequestError>(state.executor.fetch_json(&tenant, &query).await?)
    };
    with_deadline(state.request_timeout, work).await
}

async fn with_deadline<T>(
    deadline: Option<Duration>,
    work: impl Future<Output = Result<T, RequestError>>,
) -> Result<T, RequestError> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .map_err(|_| RequestError::Timeout(limit))?,
        None => work.await,
    }
}
