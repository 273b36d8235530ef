//! Hyper glue: the accept loop and request/response conversion.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::handler::{handle, AppState};
use crate::request::Request;
use crate::response::Response;

/// Converts a hyper request; the body is ignored.
#[must_use]
pub fn from_hyper<B>(req: &HyperRequest<B>) -> Request {
    let uri = req.uri();
    let mut request = Request::new(req.method().clone(), uri.path())
        .query_string(uri.query().unwrap_or_default());
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.headers.insert(key.to_string(), v.to_string());
        }
    }
    request
}

/// Converts a response, dropping headers that are not valid HTTP.
#[must_use]
pub fn to_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let mut response = HyperResponse::new(Full::new(Bytes::from(res.body)));
    *response.status_mut() =
        StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    for (key, value) in &res.headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %key, "dropping invalid response header"),
        }
    }
    response
}

async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let res = handle(&state, from_hyper(&req)).await;
    Ok(to_hyper(res))
}

/// Accepts connections until Ctrl-C, serving each on its own task.
///
/// # Errors
///
/// Returns an error if accepting a connection fails.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        };
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle_request(req, state.clone()));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(%peer, error = %err, "error serving connection");
            }
        });
    }
}
