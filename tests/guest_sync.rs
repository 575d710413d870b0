use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::net::TcpListener;
use uuid::Uuid;

use notearc::bootstrap::app_context::{AppContext, AppServices};
use notearc::bootstrap::config::Config;
use notearc::client::autosave::AutoSaver;
use notearc::client::guest_store::{DraftFields, GuestDraftStore};
use notearc::client::local_storage::MemoryStorage;
use notearc::client::sync::{GuestSync, SyncError};
use notearc::presentation::http::auth::issue_access_token;
use notearc::presentation::http::router;

async fn spawn_server() -> (SocketAddr, Config, tokio::task::JoinHandle<std::io::Result<()>>) {
    let cfg = Config::default();
    let ctx = AppContext::new(cfg.clone(), AppServices::in_memory());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(axum::serve(listener, router(ctx)).into_future());
    (addr, cfg, server)
}

fn store() -> Arc<GuestDraftStore> {
    Arc::new(GuestDraftStore::new(Arc::new(MemoryStorage::new())))
}

async fn list_logs(addr: SocketAddr, token: &str) -> Vec<Value> {
    reqwest::Client::new()
        .get(format!("http://{addr}/api/logs"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn merged_drafts_leave_an_empty_store_and_one_log_each() {
    let (addr, cfg, server) = spawn_server().await;
    let token = issue_access_token(&cfg, Uuid::new_v4()).unwrap();
    let store = store();
    let a = store.create(DraftFields {
        title: Some("Iterators".into()),
        content: Some("lazy adaptors".into()),
        tags: Some(vec!["rust".into()]),
    });
    let b = store.create(DraftFields::default());

    let sync = GuestSync::new(format!("http://{addr}/"), store.clone());
    assert_eq!(sync.merge_pending(&token).await.unwrap(), 2);
    assert!(!store.has_any());

    let logs = list_logs(addr, &token).await;
    assert_eq!(logs.len(), 2);
    let mut ids: Vec<&str> = logs
        .iter()
        .map(|l| l["guestTempId"].as_str().unwrap())
        .collect();
    ids.sort();
    let mut expected = vec![a.temp_id.as_str(), b.temp_id.as_str()];
    expected.sort();
    assert_eq!(ids, expected);

    // nothing left to send
    assert_eq!(sync.merge_pending(&token).await.unwrap(), 0);
    assert_eq!(list_logs(addr, &token).await.len(), 2);

    server.abort();
}

#[tokio::test]
async fn rejected_merge_keeps_drafts_for_retry() {
    let (addr, cfg, server) = spawn_server().await;
    let store = store();
    store.create(DraftFields {
        title: Some("Pinning".into()),
        ..Default::default()
    });
    let sync = GuestSync::new(format!("http://{addr}"), store.clone());

    let err = sync.merge_pending("expired-or-forged").await.unwrap_err();
    assert!(matches!(err, SyncError::Unauthorized));
    assert_eq!(store.get_all().len(), 1);

    let token = issue_access_token(&cfg, Uuid::new_v4()).unwrap();
    assert_eq!(sync.merge_pending(&token).await.unwrap(), 1);
    assert!(!store.has_any());

    server.abort();
}

#[tokio::test]
async fn autosaved_draft_reaches_the_account() {
    let (addr, cfg, server) = spawn_server().await;
    let token = issue_access_token(&cfg, Uuid::new_v4()).unwrap();
    let store = store();

    let saver = AutoSaver::new(store.clone(), Some("new-log"));
    saver.schedule(DraftFields {
        title: Some("Send and Sync".into()),
        content: Some("auto traits".into()),
        tags: None,
    });
    let saved = saver.flush().unwrap();
    assert_eq!(saved.temp_id, saver.temp_id());

    let sync = GuestSync::new(format!("http://{addr}"), store.clone());
    assert_eq!(sync.merge_pending(&token).await.unwrap(), 1);

    let logs = list_logs(addr, &token).await;
    assert_eq!(logs[0]["title"], "Send and Sync");
    assert_eq!(logs[0]["guestTempId"], saver.temp_id());

    server.abort();
}
