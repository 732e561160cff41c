use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Form, FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use etagtrack_core::identity::derive_identifier;

use crate::{error::AppError, state::AppState};

/// Diagnostic copy of the identifier, readable in devtools without digging
/// through cache-validation semantics.
pub static X_ETAG: HeaderName = HeaderName::from_static("x-etag");

/// `ConnectInfo` that tolerates absence, so the router also works when driven
/// in-process by `tower::ServiceExt::oneshot` (no TCP peer to report).
pub struct MaybeConnectInfo(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for MaybeConnectInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

/// Pick the client address for fingerprinting: first `X-Forwarded-For` entry
/// when a proxy supplied one, otherwise the TCP peer address.
pub fn extract_client_addr(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| peer.map(|addr| addr.to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Compute the request's client identifier: echoed `If-None-Match` when it
/// survives sanitization, fresh address+user-agent fingerprint otherwise.
pub fn identify(state: &AppState, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let validator = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    let addr = extract_client_addr(headers, peer);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    derive_identifier(validator, &state.config.secret, &addr, user_agent)
}

/// Header values carrying the identifier back out: the quoted `ETag` (the
/// round-trip channel) and the unquoted diagnostic `X-Etag`.
pub fn validator_headers(identifier: &str) -> Result<(HeaderValue, HeaderValue), AppError> {
    let etag =
        HeaderValue::from_str(&format!("\"{identifier}\"")).map_err(anyhow::Error::from)?;
    let diagnostic = HeaderValue::from_str(identifier).map_err(anyhow::Error::from)?;
    Ok((etag, diagnostic))
}

/// `GET /` — the demo page.
///
/// Shows the record the tracking image has accumulated for this client and a
/// form to attach a free-text string to it. Viewing the page does not count
/// as a visit; only the tracking image does.
pub async fn get_index(
    State(state): State<Arc<AppState>>,
    maybe_connect_info: MaybeConnectInfo,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identifier = identify(&state, &headers, maybe_connect_info.0);
    let record = state.store.get_or_create(&identifier);

    let mut context = tera::Context::new();
    context.insert("visits", &record.visits);
    context.insert("last_visit", &record.last_visit.to_rfc3339());
    context.insert("note", &record.note);
    let body = state
        .templates
        .render("index.html", &context)
        .map_err(anyhow::Error::from)?;

    let (etag, diagnostic) = validator_headers(&identifier)?;
    let mut response = Html(body).into_response();
    response.headers_mut().insert(header::ETAG, etag);
    response.headers_mut().insert(X_ETAG.clone(), diagnostic);
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub newstring: String,
}

/// `POST /` — store the submitted string against this client's record, then
/// redirect back to the page. The text is stored verbatim; escaping happens
/// at render time.
pub async fn post_index(
    State(state): State<Arc<AppState>>,
    maybe_connect_info: MaybeConnectInfo,
    headers: HeaderMap,
    Form(form): Form<NoteForm>,
) -> Result<Response, AppError> {
    let identifier = identify(&state, &headers, maybe_connect_info.0);
    state.store.set_note(&identifier, form.newstring);

    let (etag, diagnostic) = validator_headers(&identifier)?;
    let mut response = StatusCode::FOUND.into_response();
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static("./"));
    response.headers_mut().insert(header::ETAG, etag);
    response.headers_mut().insert(X_ETAG.clone(), diagnostic);
    Ok(response)
}
