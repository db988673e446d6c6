use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use crate::models::UserEventRow;
use async_trait::async_trait;
use directory_core::{StoreError, UserEvent, UserEventLog};
use tracing::debug;

/// Durable archive of consumed user events in the `user_events` table.
#[derive(Clone)]
pub struct PgUserEventArchive {
    pool: DatabasePool,
}

impl PgUserEventArchive {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn insert(&self, row: &UserEventRow) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_events (id, user_id, entity_id, event_type, value, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.entity_id)
        .bind(row.event_type)
        .bind(&row.value)
        .bind(row.created_at)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserEventLog for PgUserEventArchive {
    async fn save(&self, event: &UserEvent) -> Result<(), StoreError> {
        let row = UserEventRow::from_event(event).map_err(crate::DatabaseError::from)?;
        self.insert(&row).await?;

        debug!(event_id = %event.id, event_type = row.event_type, "Archived user event");
        Ok(())
    }
}
