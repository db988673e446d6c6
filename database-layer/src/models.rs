// Row representations for the users and user_events tables
use chrono::{DateTime, Utc};
use directory_core::{Role, User, UserEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A `users` row. Role is stored by name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: Role::from_name(&row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// User snapshot archived in `user_events.value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&User> for ArchivedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A `user_events` row ready for insertion.
#[derive(Debug, Clone)]
pub struct UserEventRow {
    pub id: Uuid,
    pub user_id: i64,
    pub entity_id: i64,
    pub event_type: i16,
    pub value: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl UserEventRow {
    pub fn from_event(event: &UserEvent) -> Result<Self, serde_json::Error> {
        let value = event
            .value
            .user()
            .map(|user| serde_json::to_value(ArchivedUser::from(user)))
            .transpose()?;

        Ok(Self {
            id: event.id,
            user_id: event.user_id,
            entity_id: event.entity_id,
            event_type: event.event_type().code(),
            value,
            created_at: event.created_at,
        })
    }
}
