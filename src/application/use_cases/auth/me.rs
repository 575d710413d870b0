use uuid::Uuid;

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct GetMe<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetMe<'a, R> {
    // A token for a deleted account resolves to None
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let row = self.repo.find_by_id(user_id).await?;
        Ok(row.map(|u| UserRow {
            password_hash: None,
            ..u
        }))
    }
}
