use std::sync::Arc;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::client::guest_store::GuestDraftStore;

#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("merge requires a signed-in user")]
    Unauthorized,
    #[error("merge rejected with status {status}")]
    Rejected { status: u16, body: String },
    #[error("merge request failed")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct MergeResponse {
    inserted: usize,
}

/// Pushes locally stored guest drafts to a freshly signed-in account.
pub struct GuestSync {
    http: reqwest::Client,
    base_url: String,
    store: Arc<GuestDraftStore>,
}

impl GuestSync {
    pub fn new(base_url: impl Into<String>, store: Arc<GuestDraftStore>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, store)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        store: Arc<GuestDraftStore>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Sends every pending draft and, on success, drops the submitted drafts
    /// from the local store. On failure the store is left untouched so the
    /// whole batch can be retried; the server side is idempotent.
    pub async fn merge_pending(&self, access_token: &str) -> Result<usize, SyncError> {
        let batch = self.store.build_merge_batch();
        if batch.drafts.is_empty() {
            return Ok(0);
        }

        let resp = self
            .http
            .post(format!("{}/api/guest/merge", self.base_url))
            .bearer_auth(access_token)
            .json(&batch)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let body: MergeResponse = resp.json().await?;
                for draft in &batch.drafts {
                    self.store.remove(&draft.temp_id);
                }
                tracing::info!(submitted = body.inserted, "guest_drafts_synced");
                Ok(body.inserted)
            }
            StatusCode::UNAUTHORIZED => Err(SyncError::Unauthorized),
            status => {
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), %body, "guest_merge_rejected");
                Err(SyncError::Rejected {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
