use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};

use crate::{
    error::AppError,
    routes::index::{identify, validator_headers, MaybeConnectInfo, X_ETAG},
    state::AppState,
};

/// 1x1 transparent GIF served when no tracking image exists on disk, so the
/// demo works straight out of the box.
pub const FALLBACK_PIXEL: &[u8] = &[
    71, 73, 70, 56, 57, 97, 1, 0, 1, 0, 128, 0, 0, 0, 0, 0, 255, 255, 255, 33, 249, 4, 1, 0, 0, 0,
    0, 44, 0, 0, 0, 0, 1, 0, 1, 0, 0, 2, 2, 68, 1, 0, 59,
];

/// `GET /tracker.jpg` — the tracking resource.
///
/// Counts a visit against the client's record and sends the identifier back
/// as a quoted `ETag`. `Cache-Control: no-cache` forces the browser to
/// revalidate on every subsequent fetch, resending the identifier via
/// `If-None-Match` — which is the entire trick.
pub async fn tracker_image(
    State(state): State<Arc<AppState>>,
    maybe_connect_info: MaybeConnectInfo,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identifier = identify(&state, &headers, maybe_connect_info.0);
    state.store.record_visit(&identifier);
    tracing::debug!(identifier = %identifier, "tracking image fetched");

    let image_path = format!("{}/fingerprinting.jpg", state.config.static_dir);
    let (bytes, content_type) = match tokio::fs::read(&image_path).await {
        Ok(bytes) => (bytes, "image/jpeg"),
        Err(_) => (FALLBACK_PIXEL.to_vec(), "image/gif"),
    };

    let (etag, diagnostic) = validator_headers(&identifier)?;
    let mut response = Response::new(axum::body::Body::from(bytes));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response.headers_mut().insert(header::ETAG, etag);
    response.headers_mut().insert(X_ETAG.clone(), diagnostic);
    Ok(response)
}
