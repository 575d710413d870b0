use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::client::local_storage::LocalStorage;
use crate::domain::logs::log::DEFAULT_TITLE;

pub const STORAGE_KEY: &str = "notearc_guest_drafts_v1";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDraft {
    pub temp_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

// Stored timestamps may come from older builds or hand edits: accept RFC 3339,
// naive date-times, bare dates and epoch millis; anything else reads as absent.
fn lenient_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => parse_loose_timestamp(&s),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

fn parse_loose_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl GuestDraft {
    pub fn new(temp_id: impl Into<String>) -> Self {
        Self {
            temp_id: temp_id.into(),
            title: None,
            content: None,
            tags: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    // Shallow merge: fields present on `newer` win, createdAt sticks to the first value seen
    fn merged_with(self, newer: GuestDraft) -> GuestDraft {
        GuestDraft {
            temp_id: self.temp_id,
            title: newer.title.or(self.title),
            content: newer.content.or(self.content),
            tags: newer.tags.or(self.tags),
            created_at: self.created_at.or(newer.created_at),
            updated_at: newer.updated_at.or(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeDraft {
    pub temp_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeBatch {
    pub drafts: Vec<MergeDraft>,
}

/// Best-effort local cache of guest drafts, newest first. Nothing here
/// returns an error: unreadable storage behaves as an empty store and failed
/// writes are logged.
pub struct GuestDraftStore {
    storage: Arc<dyn LocalStorage>,
    clock: Clock,
    write_lock: Mutex<()>,
}

impl GuestDraftStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            storage,
            clock: Arc::new(Utc::now),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn get_all(&self) -> Vec<GuestDraft> {
        let raw = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = ?e, "guest_drafts_read_failed");
                return Vec::new();
            }
        };
        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "guest_drafts_parse_failed");
                return Vec::new();
            }
        };
        // a malformed entry is dropped on its own; the rest of the list survives
        // and there is one entry per tempId even if the blob was edited by hand
        let mut seen = std::collections::HashSet::new();
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<GuestDraft>(entry) {
                Ok(d) => Some(d),
                Err(e) => {
                    tracing::warn!(index, error = %e, "guest_draft_entry_skipped");
                    None
                }
            })
            .filter(|d| seen.insert(d.temp_id.clone()))
            .collect()
    }

    pub fn get(&self, temp_id: &str) -> Option<GuestDraft> {
        self.get_all().into_iter().find(|d| d.temp_id == temp_id)
    }

    pub fn save(&self, draft: GuestDraft) -> GuestDraft {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let now = (self.clock)();
        let stamped = GuestDraft {
            updated_at: Some(draft.updated_at.unwrap_or(now)),
            ..draft
        };

        let mut all = self.get_all();
        let saved = match all.iter_mut().find(|d| d.temp_id == stamped.temp_id) {
            Some(existing) => {
                let mut merged = existing.clone().merged_with(stamped);
                merged.created_at.get_or_insert(now);
                *existing = merged.clone();
                merged
            }
            None => {
                let fresh = GuestDraft {
                    created_at: Some(stamped.created_at.unwrap_or(now)),
                    ..stamped
                };
                all.insert(0, fresh.clone());
                fresh
            }
        };
        self.write_all(&all);
        saved
    }

    pub fn create(&self, fields: DraftFields) -> GuestDraft {
        let now = (self.clock)();
        let draft = GuestDraft {
            temp_id: self.new_temp_id(),
            title: Some(fields.title.unwrap_or_else(|| DEFAULT_TITLE.to_string())),
            content: Some(fields.content.unwrap_or_default()),
            tags: Some(fields.tags.unwrap_or_default()),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.save(draft)
    }

    pub fn remove(&self, temp_id: &str) {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let all = self.get_all();
        let before = all.len();
        let kept: Vec<GuestDraft> = all.into_iter().filter(|d| d.temp_id != temp_id).collect();
        if kept.len() != before {
            self.write_all(&kept);
        }
    }

    pub fn clear_all(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = self.storage.remove_item(STORAGE_KEY) {
            tracing::warn!(error = ?e, "guest_drafts_clear_failed");
        }
    }

    pub fn has_any(&self) -> bool {
        !self.get_all().is_empty()
    }

    pub fn build_merge_batch(&self) -> MergeBatch {
        let drafts = self
            .get_all()
            .into_iter()
            .map(|d| MergeDraft {
                temp_id: d.temp_id,
                title: d.title,
                content: d.content,
                tags: d.tags.unwrap_or_default(),
                created_at: d.created_at,
                updated_at: d.updated_at,
            })
            .collect();
        MergeBatch { drafts }
    }

    /// `guest-<base36 millis>-<6 random base36 chars>`; uniqueness is
    /// probabilistic, collisions are not detected.
    pub fn new_temp_id(&self) -> String {
        let millis = (self.clock)().timestamp_millis().max(0) as u64;
        let mut rng = rand::thread_rng();
        let suffix: String = (0..6)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("guest-{}-{}", to_base36(millis), suffix)
    }

    fn write_all(&self, drafts: &[GuestDraft]) {
        let raw = match serde_json::to_string(drafts) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "guest_drafts_serialize_failed");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(STORAGE_KEY, &raw) {
            tracing::warn!(error = ?e, "guest_drafts_write_failed");
        }
    }
}

pub(crate) fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::local_storage::MemoryStorage;
    use chrono::Duration;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that moves one second forward on every read.
    fn ticking_clock() -> Clock {
        let start = Utc::now();
        let ticks = Arc::new(AtomicI64::new(0));
        Arc::new(move || start + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst)))
    }

    fn store() -> (Arc<MemoryStorage>, GuestDraftStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = GuestDraftStore::new(storage.clone()).with_clock(ticking_clock());
        (storage, store)
    }

    #[test]
    fn create_stores_draft_with_defaults() {
        let (_, store) = store();
        let d = store.create(DraftFields::default());
        assert!(d.temp_id.starts_with("guest-"));
        assert_eq!(d.title.as_deref(), Some("Untitled"));
        assert_eq!(d.tags, Some(vec![]));

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].temp_id, d.temp_id);
        assert!(store.has_any());
    }

    #[test]
    fn newest_draft_comes_first() {
        let (_, store) = store();
        let a = store.create(DraftFields::default());
        let b = store.create(DraftFields::default());
        let ids: Vec<String> = store.get_all().into_iter().map(|d| d.temp_id).collect();
        assert_eq!(ids, vec![b.temp_id, a.temp_id]);
    }

    #[test]
    fn save_upserts_by_temp_id() {
        let (_, store) = store();
        let d = store.create(DraftFields {
            title: Some("orig".into()),
            ..Default::default()
        });
        store.save(GuestDraft {
            title: Some("updated".into()),
            ..GuestDraft::new(d.temp_id.clone())
        });
        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title.as_deref(), Some("updated"));
        // fields absent from the update keep their old values
        assert_eq!(all[0].content.as_deref(), Some(""));
    }

    #[test]
    fn resave_keeps_created_at_and_advances_updated_at() {
        let (_, store) = store();
        let first = store.create(DraftFields::default());
        let second = store.save(GuestDraft {
            content: Some("more".into()),
            ..GuestDraft::new(first.temp_id.clone())
        });
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn resave_with_new_created_at_keeps_original() {
        let (_, store) = store();
        let first = store.create(DraftFields::default());
        let later = store.save(GuestDraft {
            created_at: Some(Utc::now() + Duration::days(3)),
            ..GuestDraft::new(first.temp_id.clone())
        });
        assert_eq!(later.created_at, first.created_at);
    }

    #[test]
    fn remove_leaves_the_other_draft() {
        let (_, store) = store();
        let a = store.create(DraftFields::default());
        let b = store.create(DraftFields::default());
        store.remove(&a.temp_id);
        let left = store.get_all();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].temp_id, b.temp_id);

        store.remove("guest-missing");
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn clear_all_empties_store() {
        let (_, store) = store();
        store.create(DraftFields::default());
        store.create(DraftFields::default());
        store.clear_all();
        assert!(store.get_all().is_empty());
        assert!(!store.has_any());
    }

    #[test]
    fn corrupt_blob_reads_as_empty() {
        let (storage, store) = store();
        storage.set_item(STORAGE_KEY, "{not json").unwrap();
        assert!(store.get_all().is_empty());
        storage.set_item(STORAGE_KEY, r#"{"tempId":"x"}"#).unwrap();
        assert!(store.get_all().is_empty());

        // saving over a corrupt blob starts a fresh list
        store.save(GuestDraft::new("guest-1"));
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn one_bad_entry_does_not_discard_the_rest() {
        let (storage, store) = store();
        storage
            .set_item(
                STORAGE_KEY,
                r#"[
                    {"tempId":"good1","title":"Ownership","createdAt":"2024-05-01T09:00:00.000Z"},
                    {"tempId":"good2","title":"Borrowing"},
                    {"tempId":"dated","createdAt":"2024-05-01","updatedAt":"not a date"},
                    {"title":"no id"},
                    42
                ]"#,
            )
            .unwrap();

        let all = store.get_all();
        let ids: Vec<&str> = all.iter().map(|d| d.temp_id.as_str()).collect();
        assert_eq!(ids, ["good1", "good2", "dated"]);
        let dated = &all[2];
        assert_eq!(
            dated.created_at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-05-01T00:00:00+00:00")
        );
        assert_eq!(dated.updated_at, None);

        // writing afterwards keeps every readable draft
        let fresh = store.create(DraftFields::default());
        let ids: Vec<String> = store.get_all().into_iter().map(|d| d.temp_id).collect();
        assert_eq!(ids, [fresh.temp_id.as_str(), "good1", "good2", "dated"]);
    }

    #[test]
    fn loose_timestamps() {
        assert_eq!(
            parse_loose_timestamp("2024-05-01T10:30:00").map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-05-01T10:30:00+00:00")
        );
        assert!(parse_loose_timestamp("2024-05-01T10:30:00+09:00").is_some());
        assert!(parse_loose_timestamp("yesterday").is_none());
        let d: GuestDraft =
            serde_json::from_str(r#"{"tempId":"m","createdAt":1714557600000}"#).unwrap();
        assert_eq!(d.created_at.map(|t| t.timestamp()), Some(1_714_557_600));
    }

    struct BrokenStorage;

    impl LocalStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("storage disabled")
        }
        fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("quota exceeded")
        }
        fn remove_item(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("storage disabled")
        }
    }

    #[test]
    fn unavailable_storage_degrades_silently() {
        let store = GuestDraftStore::new(Arc::new(BrokenStorage));
        let d = store.create(DraftFields::default());
        assert!(d.updated_at.is_some());
        assert!(store.get_all().is_empty());
        store.remove(&d.temp_id);
        store.clear_all();
        assert!(!store.has_any());
    }

    #[test]
    fn duplicate_temp_ids_in_storage_are_collapsed() {
        let (storage, store) = store();
        storage
            .set_item(
                STORAGE_KEY,
                r#"[{"tempId":"a","title":"new"},{"tempId":"a","title":"old"}]"#,
            )
            .unwrap();
        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title.as_deref(), Some("new"));
    }

    #[test]
    fn merge_batch_projects_wire_shape() {
        let (storage, store) = store();
        storage
            .set_item(STORAGE_KEY, r#"[{"tempId":"t1","title":"T1"}]"#)
            .unwrap();
        let batch = store.build_merge_batch();
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"drafts": [{"tempId": "t1", "title": "T1", "tags": []}]})
        );
    }

    #[test]
    fn display_defaults() {
        let d = GuestDraft::new("x");
        assert_eq!(d.display_title(), "Untitled");
        assert_eq!(d.content_or_empty(), "");
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn temp_ids_are_distinct() {
        let (_, store) = store();
        let a = store.new_temp_id();
        let b = store.new_temp_id();
        assert_ne!(a, b);
        assert_eq!(a.rsplit('-').next().unwrap().len(), 6);
    }
}
