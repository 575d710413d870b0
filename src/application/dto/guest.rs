use chrono::{DateTime, Utc};

use crate::application::validation::{ValidationErrors, check_max_chars, parse_timestamp};
use crate::domain::logs::log::{DEFAULT_TITLE, GuestLogSeed};

pub const MAX_MERGE_DRAFTS: usize = 50;
pub const MAX_DRAFT_TITLE_CHARS: usize = 300;
pub const MAX_DRAFT_CONTENT_CHARS: usize = 20_000;

/// Largest body a valid batch can need: every title and content at its limit
/// with each char `\uXXXX`-escaped (6 bytes), plus room for ids, tags and
/// timestamps.
pub const MAX_MERGE_BODY_BYTES: usize =
    MAX_MERGE_DRAFTS * (MAX_DRAFT_TITLE_CHARS + MAX_DRAFT_CONTENT_CHARS) * 6 + 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct GuestDraftDto {
    pub temp_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Validates a whole merge batch. Any invalid draft fails the batch; the
/// returned seeds carry the server-side defaults.
pub fn validate_merge_batch(
    drafts: Vec<GuestDraftDto>,
    now: DateTime<Utc>,
) -> Result<Vec<GuestLogSeed>, ValidationErrors> {
    if drafts.len() > MAX_MERGE_DRAFTS {
        return Err(ValidationErrors::single(
            "drafts",
            format!("must contain at most {MAX_MERGE_DRAFTS} drafts"),
        ));
    }

    let mut errors = ValidationErrors::new();
    let mut seeds = Vec::with_capacity(drafts.len());
    for (i, draft) in drafts.into_iter().enumerate() {
        let field = |name: &str| format!("drafts[{i}].{name}");

        let temp_id = draft.temp_id.unwrap_or_default();
        if temp_id.trim().is_empty() {
            errors.push(field("tempId"), "is required");
        }
        check_max_chars(
            &mut errors,
            &field("title"),
            draft.title.as_deref(),
            MAX_DRAFT_TITLE_CHARS,
        );
        check_max_chars(
            &mut errors,
            &field("content"),
            draft.content.as_deref(),
            MAX_DRAFT_CONTENT_CHARS,
        );
        let created_at = parse_timestamp(&mut errors, &field("createdAt"), draft.created_at.as_deref());
        let updated_at = parse_timestamp(&mut errors, &field("updatedAt"), draft.updated_at.as_deref());

        seeds.push(GuestLogSeed {
            temp_id,
            title: draft.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            content: draft.content.unwrap_or_default(),
            tags: draft.tags.unwrap_or_default(),
            created_at: created_at.unwrap_or(now),
            updated_at: updated_at.unwrap_or(now),
        });
    }
    errors.into_result(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(temp_id: &str) -> GuestDraftDto {
        GuestDraftDto {
            temp_id: Some(temp_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn applies_server_defaults() {
        let now = Utc::now();
        let seeds = validate_merge_batch(vec![draft("t1")], now).unwrap();
        assert_eq!(seeds[0].title, "Untitled");
        assert_eq!(seeds[0].content, "");
        assert!(seeds[0].tags.is_empty());
        assert_eq!(seeds[0].created_at, now);
    }

    #[test]
    fn keeps_client_timestamps() {
        let mut d = draft("t1");
        d.created_at = Some("2024-05-01T10:00:00.000Z".into());
        let seeds = validate_merge_batch(vec![d], Utc::now()).unwrap();
        assert_eq!(seeds[0].created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn rejects_oversized_batch() {
        let drafts = (0..=MAX_MERGE_DRAFTS).map(|i| draft(&format!("t{i}"))).collect();
        let err = validate_merge_batch(drafts, Utc::now()).unwrap_err();
        assert!(err.has_field("drafts"));
    }

    #[test]
    fn accepts_exactly_the_limit() {
        let drafts = (0..MAX_MERGE_DRAFTS).map(|i| draft(&format!("t{i}"))).collect();
        assert_eq!(validate_merge_batch(drafts, Utc::now()).unwrap().len(), MAX_MERGE_DRAFTS);
    }

    #[test]
    fn reports_every_bad_field_with_its_index() {
        let mut long = draft("t2");
        long.content = Some("c".repeat(MAX_DRAFT_CONTENT_CHARS + 1));
        long.title = Some("t".repeat(MAX_DRAFT_TITLE_CHARS + 1));
        let drafts = vec![draft("t1"), GuestDraftDto::default(), long];
        let err = validate_merge_batch(drafts, Utc::now()).unwrap_err();
        assert!(err.has_field("drafts[1].tempId"));
        assert!(err.has_field("drafts[2].title"));
        assert!(err.has_field("drafts[2].content"));
        assert!(!err.has_field("drafts[0].tempId"));
    }

    #[test]
    fn rejects_unparseable_timestamps() {
        let mut d = draft("t1");
        d.updated_at = Some("not a date".into());
        let err = validate_merge_batch(vec![d], Utc::now()).unwrap_err();
        assert!(err.has_field("drafts[0].updatedAt"));
    }

    #[test]
    fn empty_batch_is_valid() {
        assert!(validate_merge_batch(Vec::new(), Utc::now()).unwrap().is_empty());
    }
}
