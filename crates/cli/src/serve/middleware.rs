//! HTTP middleware: API key authentication.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use orgchart_storage::OrgStorage;

use super::json_error;
use super::state::AppState;

/// Paths reachable without credentials.
const PUBLIC_PATHS: &[&str] = &["/health"];

/// Where a request's credentials came from, if it carried any.
#[derive(Debug, PartialEq, Eq)]
enum Credential<'a> {
    Bearer(&'a str),
    ApiKey(&'a str),
    Missing,
}

fn credential<B>(request: &Request<B>) -> Credential<'_> {
    let headers = request.headers();
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Credential::Bearer(token);
    }
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(key) => Credential::ApiKey(key),
        None => Credential::Missing,
    }
}

/// API key authentication middleware.
///
/// If `ORGCHART_API_KEY` is set, all requests except `/health` must include
/// either `Authorization: Bearer <key>` or `X-API-Key: <key>`. A missing
/// credential is 401, a wrong one 403.
pub(crate) async fn auth_middleware<S: OrgStorage>(
    State(state): State<Arc<AppState<S>>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let accepted = match credential(&request) {
        Credential::Bearer(key) | Credential::ApiKey(key) => Some(key == expected),
        Credential::Missing => None,
    };
    match accepted {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "rejected invalid API key");
            json_error(StatusCode::FORBIDDEN, "invalid API key").into_response()
        }
        None => json_error(StatusCode::UNAUTHORIZED, "authentication required").into_response(),
    }
}
