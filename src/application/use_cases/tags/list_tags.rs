use uuid::Uuid;

use crate::application::dto::tags::TagItemDto;
use crate::application::ports::log_repository::LogRepository;

pub struct ListTags<'a, R: LogRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LogRepository + ?Sized> ListTags<'a, R> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        filter: Option<String>,
    ) -> anyhow::Result<Vec<TagItemDto>> {
        let filter = filter.filter(|s| !s.trim().is_empty());
        let rows = self.repo.tag_counts(owner_id, filter).await?;
        Ok(rows
            .into_iter()
            .map(|t| TagItemDto {
                name: t.name,
                count: t.count,
            })
            .collect())
    }
}
