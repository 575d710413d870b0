use uuid::Uuid;

use crate::application::ports::log_repository::LogRepository;
use crate::domain::logs::log::Log;

pub struct ListLogs<'a, R: LogRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LogRepository + ?Sized> ListLogs<'a, R> {
    pub async fn execute(&self, user_id: Uuid, tag: Option<String>) -> anyhow::Result<Vec<Log>> {
        let tag = tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        self.repo.list_for_user(user_id, tag).await
    }
}
