use uuid::Uuid;

use crate::application::ports::log_repository::LogRepository;

pub struct DeleteLog<'a, R: LogRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LogRepository + ?Sized> DeleteLog<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let deleted = self.repo.delete_owned(id, user_id).await?;
        if deleted {
            tracing::debug!(log_id = %id, user_id = %user_id, "log_deleted");
        }
        Ok(deleted)
    }
}
