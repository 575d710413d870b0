use chrono::{DateTime, Utc};

use crate::application::validation::{
    ValidationErrors, check_max_chars, check_not_blank, parse_timestamp,
};
use crate::domain::logs::log::{LogPatch, NewLog};

pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct CreateLogDto {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub date: Option<String>,
}

impl CreateLogDto {
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewLog, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.is_none() {
            errors.push("title", "is required");
        }
        if self.content.is_none() {
            errors.push("content", "is required");
        }
        check_not_blank(&mut errors, "title", self.title.as_deref());
        check_max_chars(&mut errors, "title", self.title.as_deref(), MAX_TITLE_CHARS);
        check_not_blank(&mut errors, "content", self.content.as_deref());
        let date = parse_timestamp(&mut errors, "date", self.date.as_deref());
        errors.into_result(NewLog {
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            date: date.unwrap_or(now),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLogDto {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub date: Option<String>,
}

impl UpdateLogDto {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none() && self.date.is_none()
    }

    /// Checks only the fields that were supplied. Callers reject an empty
    /// body before getting here.
    pub fn validate(self) -> Result<LogPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_blank(&mut errors, "title", self.title.as_deref());
        check_max_chars(&mut errors, "title", self.title.as_deref(), MAX_TITLE_CHARS);
        check_not_blank(&mut errors, "content", self.content.as_deref());
        let date = parse_timestamp(&mut errors, "date", self.date.as_deref());
        errors.into_result(LogPatch {
            title: self.title,
            content: self.content,
            tags: self.tags,
            date,
        })
    }
}
