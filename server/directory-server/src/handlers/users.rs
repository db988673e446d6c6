use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use directory_core::{CreateUserRequest, UpdateUserRequest, User, UserError, UserId};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;
use telemetry::metrics::record_request;
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: UserId,
}

/// Omitted or empty `name`/`email` keep their stored value.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUserBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchLookupBody {
    pub ids: Vec<UserId>,
}

/// Public view of a user. The password never leaves the service.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.code(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

/// Times a service call and records it under `operation`.
async fn observed<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, UserError>>,
) -> Result<T, UserError> {
    let started = Instant::now();
    let result = call.await;
    let status = match &result {
        Ok(_) => "ok",
        Err(UserError::Validation(_)) => "invalid",
        Err(UserError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    record_request(operation, status, started.elapsed());
    result
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedUser>)> {
    let Json(body) = body?;
    let email = state.redactor.redact(&body.email);

    let id = observed(
        "create",
        state.users.create(CreateUserRequest {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
        }),
    )
    .await?;

    info!(user_id = id, email = %email, "User created");
    Ok((StatusCode::CREATED, Json(CreatedUser { id })))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Path(id) = id?;
    let user = observed("get_by_id", state.users.get_by_id(id)).await?;
    Ok(Json(user.into()))
}

pub async fn get_users(
    State(state): State<AppState>,
    body: Result<Json<BatchLookupBody>, JsonRejection>,
) -> ApiResult<Json<UserListResponse>> {
    let Json(body) = body?;
    let users = observed("get_list_by_ids", state.users.get_list_by_ids(&body.ids)).await?;
    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    body: Result<Json<UpdateUserBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let Json(body) = body?;

    observed(
        "update",
        state.users.update(UpdateUserRequest {
            id,
            name: body.name,
            email: body.email,
            role: body.role,
        }),
    )
    .await?;

    info!(user_id = id, "User updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    observed("delete", state.users.delete(id)).await?;

    info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use directory_core::Role;

    #[test]
    fn test_response_has_no_password() {
        let user = User {
            id: 4,
            name: "Bo".to_string(),
            email: "bo@example.com".to_string(),
            password: "hunter22".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: None,
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("updated_at").is_none());
        assert_eq!(json["role"], 1);
    }

    #[test]
    fn test_update_body_fields_are_optional() {
        let body: UpdateUserBody = serde_json::from_str(r#"{"role": 2}"#).unwrap();

        assert!(body.name.is_none());
        assert!(body.email.is_none());
        assert_eq!(body.role, 2);
    }
}
