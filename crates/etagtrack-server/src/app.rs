use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// `TraceLayer` gives structured request/response logging via `tracing`. No
/// CORS layer: every resource here is same-origin by design — the tracking
/// image only correlates visits to this site's own page.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(routes::index::get_index).post(routes::index::post_index),
        )
        .route("/source", get(routes::assets::source))
        .route("/etags.jpg", get(routes::assets::etags_image))
        .route("/tracker.jpg", get(routes::tracker::tracker_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
