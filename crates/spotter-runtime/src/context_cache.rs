//! Context cache — load-once snapshot with atomic swap.

use std::sync::Arc;

use parking_lot::RwLock;
use spotter_core::context::UserContext;
use spotter_core::ids::UserId;
use spotter_tools::ContextReader;
use tracing::{debug, instrument};

use crate::errors::ContextLoadError;
use crate::storage::{ContextStore, StoreError};

/// Immutable-after-load snapshot of a user's plan data.
///
/// `get()` never touches storage: it clones an `Arc` out of a read lock.
/// `swap()` replaces the snapshot without invalidating in-flight readers,
/// which keep the `Arc` they already hold (copy-on-write).
#[derive(Debug)]
pub struct ContextCache {
    user_id: UserId,
    snapshot: RwLock<Arc<UserContext>>,
}

impl ContextCache {
    /// Perform the one preload read and wrap the result.
    ///
    /// No retries: any failure is fatal to session start and the caller
    /// must not partially initialize.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn load(
        store: &dyn ContextStore,
        user_id: &UserId,
    ) -> Result<Self, ContextLoadError> {
        if user_id.is_empty() {
            return Err(ContextLoadError::InvalidIdentity);
        }
        let context = store
            .load_user_context(user_id)
            .await
            .map_err(|e| map_store_error(e, user_id))?;
        debug!(plan = %context.workout_plan.name, "context snapshot loaded");
        Ok(Self {
            user_id: user_id.clone(),
            snapshot: RwLock::new(Arc::new(context)),
        })
    }

    /// The user this cache serves.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The current snapshot. Pure, non-blocking, storage-free.
    #[must_use]
    pub fn get(&self) -> Arc<UserContext> {
        Arc::clone(&self.snapshot.read())
    }

    /// Atomically replace the snapshot.
    pub fn swap(&self, context: UserContext) {
        *self.snapshot.write() = Arc::new(context);
    }

    /// Re-read from the store and swap in the result.
    ///
    /// On failure the previous snapshot stays in place and keeps serving.
    #[instrument(skip(self, store), fields(user_id = %self.user_id))]
    pub async fn refresh(&self, store: &dyn ContextStore) -> Result<(), ContextLoadError> {
        let context = store
            .load_user_context(&self.user_id)
            .await
            .map_err(|e| map_store_error(e, &self.user_id))?;
        self.swap(context);
        debug!("context snapshot refreshed");
        Ok(())
    }
}

fn map_store_error(e: StoreError, user_id: &UserId) -> ContextLoadError {
    match e {
        StoreError::NotFound => ContextLoadError::NotFound(user_id.clone()),
        StoreError::Unavailable { message } => ContextLoadError::StoreUnavailable(message),
    }
}

impl ContextReader for ContextCache {
    fn snapshot(&self) -> Arc<UserContext> {
        self.get()
    }
}
