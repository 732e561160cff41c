use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

/// `GET /etags.jpg` — illustration image for the demo page, served from the
/// configured static directory. Unlike the tracking image this one carries no
/// identifier and caches normally.
pub async fn etags_image(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let path = format!("{}/etags.jpg", state.config.static_dir);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound(format!("no such asset: {path}")))?;

    let mut response = Response::new(axum::body::Body::from(bytes));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
    Ok(response)
}

/// `GET /source` — pointer to the project this demo reimplements.
pub async fn source() -> impl IntoResponse {
    Html(
        "See <a href='https://github.com/lucb1e/cookielesscookies'>\
         github.com/lucb1e/cookielesscookies</a>",
    )
}
