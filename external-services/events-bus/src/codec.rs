// JSON wire format for user events on the bus
use crate::error::{EventBusError, Result};
use chrono::{DateTime, Utc};
use directory_core::{Role, User, UserEvent, UserEventType, UserEventValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User snapshot carried by create and update events. Passwords never leave the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<WireUser>,
}

/// Message payload: `{id, user_id, type, data, entity_id, created_at}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUserEvent {
    pub id: String,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub event_type: i16,
    #[serde(default)]
    pub data: WireEventData,
    pub entity_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for WireUser {
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

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        User {
            id: wire.id,
            name: wire.name,
            email: wire.email,
            password: String::new(),
            role: Role::from_name(&wire.role),
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl From<&UserEvent> for WireUserEvent {
    fn from(event: &UserEvent) -> Self {
        Self {
            id: event.id.to_string(),
            user_id: event.user_id,
            event_type: event.event_type().code(),
            data: WireEventData {
                user: event.value.user().map(WireUser::from),
            },
            entity_id: event.entity_id,
            created_at: event.created_at,
        }
    }
}

impl TryFrom<WireUserEvent> for UserEvent {
    type Error = EventBusError;

    fn try_from(wire: WireUserEvent) -> Result<Self> {
        let id = Uuid::parse_str(&wire.id)
            .map_err(|e| EventBusError::InvalidEventFormat(format!("event id: {e}")))?;

        let value = match UserEventType::from_code(wire.event_type) {
            Some(UserEventType::Create) => UserEventValue::Create {
                user: required_user(wire.data)?,
            },
            Some(UserEventType::Update) => UserEventValue::Update {
                user: required_user(wire.data)?,
            },
            Some(UserEventType::Delete) => UserEventValue::Delete,
            Some(UserEventType::Unspecified) | None => {
                return Err(EventBusError::InvalidEventFormat(format!(
                    "unknown event type {}",
                    wire.event_type
                )))
            }
        };

        Ok(UserEvent {
            id,
            user_id: wire.user_id,
            entity_id: wire.entity_id,
            value,
            created_at: wire.created_at,
        })
    }
}

fn required_user(data: WireEventData) -> Result<User> {
    data.user
        .map(User::from)
        .ok_or_else(|| EventBusError::InvalidEventFormat("missing user payload".to_string()))
}

pub fn encode(event: &UserEvent) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&WireUserEvent::from(event))?)
}

pub fn decode(payload: &[u8]) -> Result<UserEvent> {
    let wire: WireUserEvent = serde_json::from_slice(payload)?;
    UserEvent::try_from(wire)
}
