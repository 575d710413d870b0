use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::logs::log::{GuestLogSeed, Log, LogPatch, NewLog, TagCount};

/// Owner-scoped persistence for logs. Every method takes the owner and must
/// treat a log owned by someone else exactly like a missing one.
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid, tag: Option<String>) -> anyhow::Result<Vec<Log>>;

    async fn get_for_user(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Log>>;

    async fn create_for_user(&self, user_id: Uuid, log: NewLog) -> anyhow::Result<Log>;

    // Single conditional update; None when no owned row matched
    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: LogPatch,
    ) -> anyhow::Result<Option<Log>>;

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;

    /// Inserts each seed unless `(user_id, temp_id)` already exists. Returns the
    /// number of operations submitted, not the number of rows inserted.
    async fn insert_guest_drafts(
        &self,
        user_id: Uuid,
        seeds: Vec<GuestLogSeed>,
    ) -> anyhow::Result<usize>;

    async fn tag_counts(&self, user_id: Uuid, filter: Option<String>)
    -> anyhow::Result<Vec<TagCount>>;
}
