// Transaction management for the relational store
use crate::error::{StoreError, UserError};
use crate::repository::UserRepository;
use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

/// A repository handle bound to one open transaction.
///
/// Dropping the handle without calling [`commit`](Self::commit) rolls the
/// transaction back.
#[async_trait]
pub trait UserTransaction: UserRepository {
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Opens transactions on the relational store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begins a transaction at READ COMMITTED isolation, the only level in use.
    async fn begin_read_committed(&self) -> Result<Box<dyn UserTransaction>, StoreError>;
}

/// Runs `work` inside a read-committed transaction.
///
/// An `Err` from `work` rolls back and is returned unchanged; `Ok` commits.
/// Failures to begin or commit surface as [`UserError::Transaction`].
pub async fn read_committed<T, F>(manager: &dyn TransactionManager, work: F) -> Result<T, UserError>
where
    T: Send,
    F: for<'t> FnOnce(&'t dyn UserTransaction) -> BoxFuture<'t, Result<T, UserError>> + Send,
{
    let tx = manager
        .begin_read_committed()
        .await
        .map_err(UserError::Transaction)?;

    let outcome = work(tx.as_ref()).await;

    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(UserError::Transaction)?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Failed to roll back transaction");
            }
            debug!(error = %err, "Transaction rolled back");
            Err(err)
        }
    }
}
