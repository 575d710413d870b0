use uuid::Uuid;

use crate::application::ports::log_repository::LogRepository;
use crate::domain::logs::log::{Log, NewLog};

pub struct CreateLog<'a, R: LogRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LogRepository + ?Sized> CreateLog<'a, R> {
    pub async fn execute(&self, user_id: Uuid, log: NewLog) -> anyhow::Result<Log> {
        let created = self.repo.create_for_user(user_id, log).await?;
        tracing::debug!(log_id = %created.id, user_id = %user_id, "log_created");
        Ok(created)
    }
}
