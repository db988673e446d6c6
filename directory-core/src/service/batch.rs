use super::UserService;
use crate::error::{Result, UserError};
use crate::models::{User, UserId};
use crate::monitor::SideEffectStore;
use futures::future::join_all;
use std::collections::HashSet;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

impl UserService {
    /// Resolves a batch of ids.
    ///
    /// Cache lookups fan out under a shared concurrency limit and are all
    /// awaited before the misses are fetched with a single repository call.
    /// Ids that exist nowhere are omitted; the result order is unspecified.
    /// A repository failure fails the whole batch.
    #[instrument(skip_all, fields(requested = ids.len()))]
    pub async fn get_list_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let ids = unique(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let limiter = Semaphore::new(self.config.batch_concurrency);

        let outcomes = join_all(ids.iter().map(|&id| self.lookup_cached(&limiter, id))).await;

        let mut users = Vec::with_capacity(ids.len());
        let mut misses = Vec::new();
        for (&id, outcome) in ids.iter().zip(outcomes) {
            match outcome {
                Some(user) => users.push(user),
                None => misses.push(id),
            }
        }

        debug!(hits = users.len(), misses = misses.len(), "Batch cache lookup finished");

        if misses.is_empty() {
            return Ok(users);
        }

        let fetched = self.repo.get_by_ids(&misses).await.map_err(UserError::Store)?;

        join_all(fetched.iter().map(|user| self.write_back(&limiter, user))).await;

        users.extend(fetched);
        Ok(users)
    }

    async fn lookup_cached(&self, limiter: &Semaphore, id: UserId) -> Option<User> {
        let _permit = limiter.acquire().await.ok()?;
        match self.cache.get(id).await {
            Ok(hit) => hit,
            Err(err) => {
                self.report(SideEffectStore::Cache, "get", id, &err);
                None
            }
        }
    }

    async fn write_back(&self, limiter: &Semaphore, user: &User) {
        if let Ok(_permit) = limiter.acquire().await {
            self.refresh_cache(user).await;
        }
    }
}

/// Drops repeated ids, keeping first-seen order.
fn unique(ids: &[UserId]) -> Vec<UserId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
