//! Reverse proxy for `/api` requests.
//!
//! Method, path, query, headers and body are forwarded verbatim to the
//! backend origin. Only the `Host` header changes (it is set from the
//! backend URL) and hop-by-hop headers are dropped in both directions.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, header};
use axum::response::Response;
use std::sync::Arc;
use tracing::{debug, error};

/// Largest request body forwarded to the backend.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Headers that describe a single connection and must not be forwarded.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Copies end-to-end headers. `Host` and `Content-Length` are recomputed by
/// the HTTP stack for the outgoing message.
fn forward_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || *name == header::HOST || *name == header::CONTENT_LENGTH {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Forwards the request to the backend and relays its response.
///
/// # Errors
/// Returns [`ApiError::BackendUnavailable`] when the backend cannot be
/// reached, and [`ApiError::InvalidRequest`] when the request body cannot be
/// read.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or(parts.uri.path(), |pq| pq.as_str());
    let url = format!("{}{}", state.backend_origin, path_and_query);

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    debug!("proxy {} {}", parts.method, url);

    let upstream = state
        .http
        .request(parts.method.clone(), &url)
        .headers(forward_headers(&parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|e| {
            error!("Proxy error: {} {}: {}", parts.method, path_and_query, e);
            ApiError::from(e)
        })?;

    let status = upstream.status();
    let headers = forward_headers(upstream.headers());
    let bytes = upstream.bytes().await.map_err(|e| {
        error!(
            "Proxy error reading response for {} {}: {}",
            parts.method, path_and_query, e
        );
        ApiError::from(e)
    })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
