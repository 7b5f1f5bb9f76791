//! HTTP API: routes, shared state and page rendering.

pub mod handlers;
mod html;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{jwt_auth, CredentialStore, JwtConfig};
use crate::store::PlaceStore;

pub use html::PageTemplate;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn PlaceStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub jwt: JwtConfig,
    pub template: PageTemplate,
}

/// Build the router with public and token-protected routes.
pub fn build_router(state: AppState) -> Router {
    let jwt = state.jwt.clone();
    let state = Arc::new(state);

    let protected = Router::new()
        .route("/api/recommend", get(handlers::recommend))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth));

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/get_token", post(handlers::get_token))
        .route("/places", get(handlers::places_html))
        .route("/api/places", get(handlers::places_api))
        .route("/api/places/", get(handlers::places_api));

    public
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
