use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/halls", get(handlers::api_halls))
        .route("/api/dishes", get(handlers::api_dishes))
        .route("/api/dishes/grouped", get(handlers::api_dishes_grouped))
        .route("/api/rate", post(handlers::api_rate))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
