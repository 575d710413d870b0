use uuid::Uuid;

use crate::application::ports::log_repository::LogRepository;
use crate::domain::logs::log::Log;

pub struct GetLog<'a, R: LogRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LogRepository + ?Sized> GetLog<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Log>> {
        self.repo.get_for_user(id, user_id).await
    }
}
