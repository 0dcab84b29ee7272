//! Ooth store - user storage contract for the authentication layer.
//!
//! Callers work with flat [`User`]s and [`FieldSet`]s; this adapter maps them
//! onto the user row plus `user_meta` rows held by the repository.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, warn};

use common::{AppError, AppResult, OptionExt};
use domain::{build_for_insert, diff_for_update, FieldSet, StoredUser, User};

use crate::repository::UserRepository;

/// Store contract consumed by the authentication layer.
#[async_trait]
pub trait UserAdapter: Send + Sync {
    /// Get a user with all meta fields merged in
    async fn get_user_by_id(&self, id: &str) -> AppResult<User>;

    /// Apply a field-set to an existing user
    async fn update_user(&self, id: &str, fields: FieldSet) -> AppResult<UpdateOutcome>;

    /// Create a user from a field-set and return its id
    async fn insert_user(&self, fields: FieldSet) -> AppResult<String>;
}

/// What happened to the rows an update superseded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupStatus {
    /// The update replaced no existing rows
    Skipped,
    Succeeded { removed: u64 },
    /// The stale rows are still in storage
    Failed { stale_ids: Vec<String>, reason: String },
}

/// Result of [`UserAdapter::update_user`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome {
    /// User as returned by the write, meta rows not flattened
    pub user: StoredUser,
    pub cleanup: CleanupStatus,
}

/// UserAdapter backed by a [`UserRepository`].
pub struct OothStore {
    repo: Arc<dyn UserRepository>,
}

impl OothStore {
    /// Create new store with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub fn builder() -> OothStoreBuilder {
        OothStoreBuilder::default()
    }

    /// Delete rows an update superseded. Failure is reported, not raised.
    async fn retire(&self, id: &str, stale_ids: Vec<String>) -> CleanupStatus {
        if stale_ids.is_empty() {
            return CleanupStatus::Skipped;
        }

        match self.repo.delete_meta(stale_ids.clone()).await {
            Ok(removed) => {
                if removed < stale_ids.len() as u64 {
                    debug!(user_id = %id, removed, expected = stale_ids.len(), "Some stale meta rows were already gone");
                }
                CleanupStatus::Succeeded { removed }
            }
            Err(e) => {
                warn!(user_id = %id, stale = stale_ids.len(), "Failed to remove stale meta rows: {}", e);
                CleanupStatus::Failed {
                    stale_ids,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Builder that refuses to produce a store without a repository.
#[derive(Default)]
pub struct OothStoreBuilder {
    repo: Option<Arc<dyn UserRepository>>,
}

impl OothStoreBuilder {
    pub fn repository(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn build(self) -> AppResult<OothStore> {
        self.repo
            .map(OothStore::new)
            .ok_or_else(|| AppError::configuration("DB is required."))
    }
}

fn log_failure(operation: &str, id: &str, err: &AppError) {
    if err.is_not_found() {
        warn!(user_id = %id, "{}: user not found", operation);
    } else {
        error!(user_id = %id, code = err.code(), "{} failed: {}", operation, err);
    }
}

#[async_trait]
impl UserAdapter for OothStore {
    async fn get_user_by_id(&self, id: &str) -> AppResult<User> {
        self.repo
            .fetch_user(id)
            .await
            .and_then(|user| user.ok_or_not_found())
            .map(User::from)
            .inspect_err(|e| log_failure("get_user_by_id", id, e))
    }

    async fn update_user(&self, id: &str, fields: FieldSet) -> AppResult<UpdateOutcome> {
        let current = self
            .repo
            .fetch_user(id)
            .await
            .and_then(|user| user.ok_or_not_found())
            .inspect_err(|e| log_failure("update_user", id, e))?;

        let diff = diff_for_update(&current.meta, &fields);
        debug!(
            user_id = %id,
            create = diff.rows_to_create.len(),
            retire = diff.rows_to_retire.len(),
            "Applying user meta diff"
        );

        let user = self
            .repo
            .update_user(id, diff.rows_to_create)
            .await
            .inspect_err(|e| log_failure("update_user", id, e))?;

        let cleanup = self.retire(id, diff.rows_to_retire).await;
        Ok(UpdateOutcome { user, cleanup })
    }

    async fn insert_user(&self, fields: FieldSet) -> AppResult<String> {
        let rows = build_for_insert(&fields);
        debug!(rows = rows.len(), "Creating user");

        self.repo.create_user(rows).await.inspect_err(|e| {
            error!(code = e.code(), "insert_user failed: {}", e);
        })
    }
}
