use chrono::{DateTime, Utc};
use directory_core::{Role, User, UserId};
use serde::{Deserialize, Serialize};

/// Cache key for a user record.
pub fn user_key(id: UserId) -> String {
    format!("user:{id}")
}

/// JSON value stored under [`user_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&User> for CachedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<CachedUser> for User {
    fn from(cached: CachedUser) -> Self {
        User {
            id: cached.id,
            name: cached.name,
            email: cached.email,
            password: cached.password,
            role: Role::from_name(&cached.role),
            created_at: cached.created_at,
            updated_at: cached.updated_at,
        }
    }
}
