//! Axum router construction.

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Every route except `/health` requires bearer authentication.
pub fn build(state: AppState) -> Router {
    let protected = Router::new()
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id", delete(handlers::end_session))
        .route("/protect", post(handlers::protect))
        .route("/reveal", post(handlers::reveal))
        .route("/classify", post(handlers::classify))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
