use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::client::guest_store::{DraftFields, GuestDraft, GuestDraftStore};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

#[derive(Default)]
struct PendingSave {
    generation: u64,
    fields: Option<DraftFields>,
    timer: Option<JoinHandle<()>>,
}

/// Debounced autosave for one editing session. Every edit re-arms the timer;
/// only the latest edit is written, under a `tempId` fixed for the session.
pub struct AutoSaver {
    store: Arc<GuestDraftStore>,
    temp_id: String,
    delay: Duration,
    pending: Arc<Mutex<PendingSave>>,
}

fn lock(pending: &Mutex<PendingSave>) -> MutexGuard<'_, PendingSave> {
    pending.lock().unwrap_or_else(|p| p.into_inner())
}

impl AutoSaver {
    pub fn new(store: Arc<GuestDraftStore>, key: Option<&str>) -> Self {
        let temp_id = match key {
            Some(k) => format!("guest-{}-{}", k, Utc::now().timestamp_millis()),
            None => store.new_temp_id(),
        };
        Self::resume(store, temp_id)
    }

    /// Continues editing an existing draft.
    pub fn resume(store: Arc<GuestDraftStore>, temp_id: impl Into<String>) -> Self {
        Self {
            store,
            temp_id: temp_id.into(),
            delay: DEFAULT_DEBOUNCE,
            pending: Arc::new(Mutex::new(PendingSave::default())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn temp_id(&self) -> &str {
        &self.temp_id
    }

    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, fields: DraftFields) {
        let mut state = lock(&self.pending);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.fields = Some(fields);

        let generation = state.generation;
        let pending = self.pending.clone();
        let store = self.store.clone();
        let temp_id = self.temp_id.clone();
        let delay = self.delay;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = lock(&pending);
            // a newer edit or a flush got here first
            if state.generation != generation {
                return;
            }
            state.timer = None;
            if let Some(fields) = state.fields.take() {
                store.save(draft_from(&temp_id, fields));
            }
        }));
    }

    /// Writes the pending edit now instead of waiting for the timer.
    pub fn flush(&self) -> Option<GuestDraft> {
        let mut state = lock(&self.pending);
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        let fields = state.fields.take()?;
        Some(self.store.save(draft_from(&self.temp_id, fields)))
    }

    /// Drops the pending edit without saving it.
    pub fn cancel(&self) {
        let mut state = lock(&self.pending);
        state.generation += 1;
        state.fields = None;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.pending).fields.is_some()
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.pending).timer.take() {
            timer.abort();
        }
    }
}

fn draft_from(temp_id: &str, fields: DraftFields) -> GuestDraft {
    GuestDraft {
        title: fields.title,
        content: fields.content,
        tags: fields.tags,
        ..GuestDraft::new(temp_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::local_storage::MemoryStorage;

    fn store() -> Arc<GuestDraftStore> {
        Arc::new(GuestDraftStore::new(Arc::new(MemoryStorage::new())))
    }

    fn titled(title: &str) -> DraftFields {
        DraftFields {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_rapid_edits_into_one_save() {
        let store = store();
        let saver = AutoSaver::new(store.clone(), None);

        saver.schedule(titled("R"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        saver.schedule(titled("Ru"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        saver.schedule(titled("Rust"));

        tokio::time::sleep(Duration::from_millis(599)).await;
        assert!(store.get_all().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].temp_id, saver.temp_id());
        assert_eq!(all[0].title.as_deref(), Some("Rust"));
        assert!(!saver.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_timer_never_fires() {
        let store = store();
        let saver = AutoSaver::new(store.clone(), Some("new"));
        assert!(saver.temp_id().starts_with("guest-new-"));

        saver.schedule(titled("first"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        saver.schedule(titled("second"));
        // past the first timer's deadline, before the second's
        tokio::time::sleep(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;
        assert!(store.get_all().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn later_sessions_edit_the_same_draft() {
        let store = store();
        let saver = AutoSaver::new(store.clone(), None).with_delay(Duration::from_millis(50));

        saver.schedule(titled("one"));
        tokio::time::sleep(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;
        saver.schedule(DraftFields {
            content: Some("body".into()),
            ..Default::default()
        });
        tokio::time::sleep(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title.as_deref(), Some("one"));
        assert_eq!(all[0].content.as_deref(), Some("body"));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_saves_immediately_and_disarms_timer() {
        let store = store();
        let saver = AutoSaver::new(store.clone(), None);
        saver.schedule(titled("draft"));

        let saved = saver.flush().expect("pending edit");
        assert_eq!(saved.title.as_deref(), Some("draft"));
        assert!(saver.flush().is_none());

        store.clear_all();
        tokio::time::sleep(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(store.get_all().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_edit() {
        let store = store();
        let saver = AutoSaver::new(store.clone(), None);
        saver.schedule(titled("discard me"));
        saver.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(store.get_all().is_empty());
    }
}
