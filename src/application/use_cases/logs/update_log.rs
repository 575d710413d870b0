use uuid::Uuid;

use crate::application::ports::log_repository::LogRepository;
use crate::domain::logs::log::{Log, LogPatch};

pub struct UpdateLog<'a, R: LogRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LogRepository + ?Sized> UpdateLog<'a, R> {
    // None => no log with that id owned by user_id
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: LogPatch,
    ) -> anyhow::Result<Option<Log>> {
        self.repo.update_for_user(id, user_id, patch).await
    }
}
