//! Directory server - HTTP API over the user service
//!
//! Exposes create, read, batch read, partial update and delete of user
//! records, plus a `/health` probe. [`bootstrap::build`] assembles the store
//! adapters for the configured backend; [`create_app`] turns the result into
//! an `axum` router.

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::*;
pub use state::AppState;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::user_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
