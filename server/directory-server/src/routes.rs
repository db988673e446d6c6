use crate::handlers::{health, users};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const USERS: &str = "/api/v1/users";
    pub const USERS_BATCH: &str = "/api/v1/users/batch";
    pub const USER_BY_ID: &str = "/api/v1/users/:id";
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route(paths::HEALTH, get(health::health_check))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(paths::USERS, post(users::create_user))
        .route(paths::USERS_BATCH, post(users::get_users))
        .route(
            paths::USER_BY_ID,
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}
