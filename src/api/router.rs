//! API router. Returns a composable `Router` mounted under `/api/`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::pipeline::intake::MAX_IMAGE_BYTES;

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/api/health", get(endpoints::health::check))
        .route("/api/sessions", post(endpoints::sessions::create))
        .route("/api/sessions/:id", delete(endpoints::sessions::remove))
        .route(
            "/api/sessions/:id/questions",
            get(endpoints::sessions::questions),
        )
        .route("/api/sessions/:id/patient", put(endpoints::patient::save))
        .route("/api/sessions/:id/image", post(endpoints::image::upload))
        .route("/api/sessions/:id/analyze", post(endpoints::analyze::run))
        .route("/api/sessions/:id/report", get(endpoints::report::export))
        // Multipart uploads carry the image file; leave headroom over the
        // intake limit so intake produces the user-facing error.
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
