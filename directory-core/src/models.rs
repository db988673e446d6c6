use chrono::{DateTime, Utc};
use std::fmt;

/// Relational-store-assigned user identifier.
pub type UserId = i64;

/// User role. `Unknown` exists for decoding stored values and is never accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Unknown,
    Admin,
    User,
}

impl Role {
    /// Integer code used on the wire and in the event log.
    pub fn code(self) -> i32 {
        match self {
            Role::Unknown => 0,
            Role::Admin => 1,
            Role::User => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Role::Unknown),
            1 => Some(Role::Admin),
            2 => Some(Role::User),
            _ => None,
        }
    }

    /// Stable upper-case name used by the relational and cache representations.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Unknown => "UNKNOWN",
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Maps a stored name back to a role; unrecognised names decode as `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ADMIN" => Role::Admin,
            "USER" => Role::User,
            _ => Role::Unknown,
        }
    }

    pub fn is_assignable(self) -> bool {
        matches!(self, Role::Admin | Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Applies the supplied fields of a patch; absent fields keep their stored value.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        self.role = patch.role;
        self.updated_at = Some(patch.updated_at);
    }
}

/// Create request as received from the transport layer.
#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Raw role code; validated into [`Role`].
    pub role: i32,
}

/// Partial update request as received from the transport layer.
///
/// `None` and `Some("")` both mean "not supplied": name and email can never be
/// cleared through this API.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: i32,
}

impl UpdateUserRequest {
    pub fn supplied_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn supplied_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

/// A validated user ready to be inserted. The id is assigned by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            role: self.role,
            created_at: self.created_at,
            updated_at: None,
        }
    }
}

/// A validated partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> User {
        User {
            id: 5,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_role_codes() {
        assert_eq!(Role::from_code(1), Some(Role::Admin));
        assert_eq!(Role::from_code(2), Some(Role::User));
        assert_eq!(Role::from_code(999), None);
        assert_eq!(Role::from_name("ADMIN"), Role::Admin);
        assert_eq!(Role::from_name("superuser"), Role::Unknown);
        assert!(!Role::Unknown.is_assignable());
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut user = stored();
        let now = Utc::now();
        user.apply(&UserPatch {
            id: 5,
            name: None,
            email: Some("alice@corp.example".to_string()),
            role: Role::Admin,
            updated_at: now,
        });

        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@corp.example");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.updated_at, Some(now));
    }

    #[test]
    fn test_empty_fields_are_not_supplied() {
        let request = UpdateUserRequest {
            id: 5,
            name: Some(String::new()),
            email: None,
            role: 2,
        };
        assert_eq!(request.supplied_name(), None);
        assert_eq!(request.supplied_email(), None);
    }
}
