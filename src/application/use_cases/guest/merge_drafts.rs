use uuid::Uuid;

use crate::application::ports::log_repository::LogRepository;
use crate::domain::logs::log::GuestLogSeed;

/// Folds a validated batch of guest drafts into the user's logs. Retrying the
/// same batch is a no-op because each draft is keyed by `(user_id, temp_id)`
/// and existing keys are never overwritten.
pub struct MergeGuestDrafts<'a, R: LogRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LogRepository + ?Sized> MergeGuestDrafts<'a, R> {
    pub async fn execute(&self, user_id: Uuid, seeds: Vec<GuestLogSeed>) -> anyhow::Result<usize> {
        if seeds.is_empty() {
            return Ok(0);
        }
        let submitted = self.repo.insert_guest_drafts(user_id, seeds).await?;
        tracing::info!(user_id = %user_id, submitted, "guest_drafts_merged");
        Ok(submitted)
    }
}
