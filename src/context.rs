//! Per-request context: correlation id, principal id, and the access log.
//!
//! Every inbound request gets a [`RequestContext`] carrying its correlation
//! id (taken from `X-Request-ID` or freshly generated) and, once
//! authentication has run, the principal id. The context lives in the
//! request's extensions and in a `tracing` span wrapping the handler future,
//! so log lines emitted anywhere below inherit both ids without threading
//! them through every call. Contexts are per-request owned values; nothing
//! here is shared across concurrent requests.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::header::{HeaderMap, HeaderValue};
use tracing::Instrument;
use uuid::Uuid;

use crate::types::RequestId;

/// Header used both to accept an externally supplied correlation id and to
/// echo the effective one back to the caller.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Placeholder principal id until a resolver has run for this request.
const UNRESOLVED: &str = "-";

/// Context scoped to a single in-flight request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    principal_id: Arc<OnceLock<String>>,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            principal_id: Arc::new(OnceLock::new()),
        }
    }

    /// Build a context from inbound headers, generating a fresh correlation
    /// id when the caller did not supply a usable one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| RequestId::new(v))
            .unwrap_or_else(|| RequestId::new(Uuid::new_v4().simple().to_string()));

        Self::new(request_id)
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Record the resolved principal. The first write wins; later calls for
    /// the same request are no-ops.
    pub fn set_principal(&self, subject_id: &str) {
        let _ = self.principal_id.set(subject_id.to_string());
    }

    /// The resolved principal id, or `"-"` while unresolved.
    pub fn principal_id(&self) -> &str {
        self.principal_id.get().map(String::as_str).unwrap_or(UNRESOLVED)
    }
}

/// One access-log line per request, emitted on drop.
///
/// Emission lives in `Drop` so the line is written on every exit path: if
/// the inner handler never produced a response (panic unwind), the status
/// falls back to the 500 sentinel and the line still goes out.
struct AccessLog {
    client: String,
    method: String,
    path: String,
    ctx: RequestContext,
    started: Instant,
    status: Option<u16>,
}

impl AccessLog {
    fn begin(client: String, method: String, path: String, ctx: RequestContext) -> Self {
        Self {
            client,
            method,
            path,
            ctx,
            started: Instant::now(),
            status: None,
        }
    }

    fn finish(&mut self, status: u16) {
        self.status = Some(status);
    }
}

impl Drop for AccessLog {
    fn drop(&mut self) {
        let status = self.status.unwrap_or(500);
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        tracing::info!(
            target: "stockroom::request",
            client = %self.client,
            method = %self.method,
            path = %self.path,
            status,
            elapsed_ms,
            request_id = %self.ctx.request_id(),
            user_id = %self.ctx.principal_id(),
            "request complete"
        );
    }
}

/// Middleware wrapping every request with its [`RequestContext`].
///
/// Applied outermost, so authentication and handlers all run inside the
/// request span. The effective correlation id is echoed back on the
/// response.
pub async fn track_requests(mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::from_headers(request.headers());
    let client = client_addr(request.headers());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    request.extensions_mut().insert(ctx.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id(),
        user_id = tracing::field::Empty,
    );

    let mut log = AccessLog::begin(client, method, path, ctx.clone());
    let mut response = next.run(request).instrument(span).await;
    log.finish(response.status().as_u16());
    drop(log);

    if let Ok(value) = HeaderValue::from_str(ctx.request_id().as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Best-effort client address from proxy headers.
fn client_addr(headers: &HeaderMap) -> String {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("X-Real-IP"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| UNRESOLVED.to_string())
}
