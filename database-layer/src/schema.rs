// Idempotent schema bootstrap
use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        password TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_events (
        id UUID PRIMARY KEY,
        user_id BIGINT NOT NULL,
        entity_id BIGINT NOT NULL,
        event_type SMALLINT NOT NULL,
        value JSONB,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Creates the `users` and `user_events` tables when missing.
pub async fn ensure_schema(pool: &DatabasePool) -> DatabaseResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool.pool()).await?;
    }
    info!("Database schema ready");
    Ok(())
}
