// User mutation events
use crate::models::{User, UserId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Event type codes as they appear on the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEventType {
    Unspecified,
    Create,
    Update,
    Delete,
}

impl UserEventType {
    pub fn code(self) -> i16 {
        match self {
            UserEventType::Unspecified => 0,
            UserEventType::Create => 1,
            UserEventType::Update => 2,
            UserEventType::Delete => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(UserEventType::Unspecified),
            1 => Some(UserEventType::Create),
            2 => Some(UserEventType::Update),
            3 => Some(UserEventType::Delete),
            _ => None,
        }
    }
}

/// Per-type event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEventValue {
    Create { user: User },
    Update { user: User },
    Delete,
}

impl UserEventValue {
    pub fn event_type(&self) -> UserEventType {
        match self {
            UserEventValue::Create { .. } => UserEventType::Create,
            UserEventValue::Update { .. } => UserEventType::Update,
            UserEventValue::Delete => UserEventType::Delete,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            UserEventValue::Create { user } | UserEventValue::Update { user } => Some(user),
            UserEventValue::Delete => None,
        }
    }
}

/// Immutable notification of a user mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEvent {
    pub id: Uuid,
    /// Subject of the event.
    pub user_id: UserId,
    /// Affected record.
    pub entity_id: UserId,
    pub value: UserEventValue,
    pub created_at: DateTime<Utc>,
}

impl UserEvent {
    fn new(user_id: UserId, entity_id: UserId, value: UserEventValue) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            entity_id,
            value,
            created_at: Utc::now(),
        }
    }

    pub fn created(user_id: UserId, user: User) -> Self {
        let entity_id = user.id;
        Self::new(user_id, entity_id, UserEventValue::Create { user })
    }

    pub fn updated(user_id: UserId, user: User) -> Self {
        let entity_id = user.id;
        Self::new(user_id, entity_id, UserEventValue::Update { user })
    }

    pub fn deleted(user_id: UserId, entity_id: UserId) -> Self {
        Self::new(user_id, entity_id, UserEventValue::Delete)
    }

    pub fn event_type(&self) -> UserEventType {
        self.value.event_type()
    }
}
