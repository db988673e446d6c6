use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::UserRow;
use async_trait::async_trait;
use directory_core::{NewUser, StoreError, User, UserId, UserPatch, UserRepository};
use sqlx::PgExecutor;
use tracing::debug;

const SELECT_USER: &str =
    "SELECT id, name, email, password, role, created_at, updated_at FROM users";

pub(crate) async fn insert_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user: &NewUser,
) -> DatabaseResult<UserId> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (name, email, password, role, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .fetch_one(executor)
    .await?;

    debug!(user_id = id, "Inserted user row");
    Ok(id)
}

pub(crate) async fn select_user<'e, E: PgExecutor<'e>>(
    executor: E,
    id: UserId,
) -> DatabaseResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(User::from))
}

pub(crate) async fn select_users<'e, E: PgExecutor<'e>>(
    executor: E,
    ids: &[UserId],
) -> DatabaseResult<Vec<User>> {
    let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(User::from).collect())
}

/// Name and email are only written when supplied; role and `updated_at` always are.
///
/// Returns the row as written, so concurrent updates to other columns are
/// reflected rather than overwritten by a stale read.
pub(crate) async fn update_user<'e, E: PgExecutor<'e>>(
    executor: E,
    patch: &UserPatch,
) -> DatabaseResult<User> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            role = $4,
            updated_at = $5
        WHERE id = $1
        RETURNING id, name, email, password, role, created_at, updated_at
        "#,
    )
    .bind(patch.id)
    .bind(patch.name.as_deref())
    .bind(patch.email.as_deref())
    .bind(patch.role.as_str())
    .bind(patch.updated_at)
    .fetch_optional(executor)
    .await?
    .ok_or(DatabaseError::RowNotFound)?;

    Ok(User::from(row))
}

pub(crate) async fn delete_user<'e, E: PgExecutor<'e>>(
    executor: E,
    id: UserId,
) -> DatabaseResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::RowNotFound);
    }
    Ok(())
}

/// Non-transactional access to the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: DatabasePool,
}

impl PgUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &NewUser) -> Result<UserId, StoreError> {
        Ok(insert_user(self.pool.pool(), user).await?)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(select_user(self.pool.pool(), id).await?)
    }

    async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        Ok(select_users(self.pool.pool(), ids).await?)
    }

    async fn update(&self, patch: &UserPatch) -> Result<User, StoreError> {
        Ok(update_user(self.pool.pool(), patch).await?)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        Ok(delete_user(self.pool.pool(), id).await?)
    }
}
