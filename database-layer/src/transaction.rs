// Read-committed transactions over the users table
use crate::connection::DatabasePool;
use crate::error::DatabaseError;
use crate::user_repository::{delete_user, insert_user, select_user, select_users, update_user};
use async_trait::async_trait;
use directory_core::{
    NewUser, StoreError, TransactionManager, User, UserId, UserPatch, UserRepository,
    UserTransaction,
};
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

/// Opens PostgreSQL transactions for the user service.
#[derive(Clone)]
pub struct PgTransactionManager {
    pool: DatabasePool,
}

impl PgTransactionManager {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin_read_committed(&self) -> Result<Box<dyn UserTransaction>, StoreError> {
        debug!("Beginning transaction");

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        Ok(Box::new(PgUserTransaction { tx: Mutex::new(tx) }))
    }
}

/// Repository calls bound to one open transaction. Dropping it rolls back.
pub struct PgUserTransaction {
    tx: Mutex<Transaction<'static, Postgres>>,
}

#[async_trait]
impl UserRepository for PgUserTransaction {
    async fn create(&self, user: &NewUser) -> Result<UserId, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(insert_user(&mut **tx, user).await?)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(select_user(&mut **tx, id).await?)
    }

    async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(select_users(&mut **tx, ids).await?)
    }

    async fn update(&self, patch: &UserPatch) -> Result<User, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(update_user(&mut **tx, patch).await?)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(delete_user(&mut **tx, id).await?)
    }
}

#[async_trait]
impl UserTransaction for PgUserTransaction {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .into_inner()
            .commit()
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .into_inner()
            .rollback()
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}
