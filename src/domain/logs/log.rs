use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
    pub guest_temp_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLog {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
}

/// Partial update; `None` leaves the stored value as is.
#[derive(Debug, Clone, Default)]
pub struct LogPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub date: Option<DateTime<Utc>>,
}

impl LogPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none() && self.date.is_none()
    }

    pub fn apply_to(self, log: &mut Log) {
        if let Some(title) = self.title {
            log.title = title;
        }
        if let Some(content) = self.content {
            log.content = content;
        }
        if let Some(tags) = self.tags {
            log.tags = tags;
        }
        if let Some(date) = self.date {
            log.date = date;
        }
    }
}

/// A validated guest draft ready to be inserted under `(user_id, temp_id)`.
#[derive(Debug, Clone)]
pub struct GuestLogSeed {
    pub temp_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}
