//! Process-local backend used when `PERSISTENCE_BACKEND=memory` and by the
//! integration tests. Each operation runs under one lock so check-and-write
//! pairs are atomic, matching the guarantees of the Postgres statements.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::application::ports::health_probe::HealthProbe;
use crate::application::ports::log_repository::LogRepository;
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::domain::logs::log::{GuestLogSeed, Log, LogPatch, NewLog, TagCount};

fn lock<T>(m: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    m.lock()
        .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))
}

#[derive(Default)]
pub struct InMemoryLogRepository {
    logs: Mutex<Vec<Log>>,
}

impl InMemoryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    async fn list_for_user(&self, user_id: Uuid, tag: Option<String>) -> anyhow::Result<Vec<Log>> {
        let logs = lock(&self.logs)?;
        let mut out: Vec<Log> = logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .filter(|l| tag.as_ref().is_none_or(|t| l.tags.contains(t)))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(out)
    }

    async fn get_for_user(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Log>> {
        let logs = lock(&self.logs)?;
        Ok(logs
            .iter()
            .find(|l| l.id == id && l.user_id == user_id)
            .cloned())
    }

    async fn create_for_user(&self, user_id: Uuid, log: NewLog) -> anyhow::Result<Log> {
        let now = Utc::now();
        let created = Log {
            id: Uuid::new_v4(),
            user_id,
            title: log.title,
            content: log.content,
            tags: log.tags,
            date: log.date,
            guest_temp_id: None,
            created_at: now,
            updated_at: now,
        };
        lock(&self.logs)?.push(created.clone());
        Ok(created)
    }

    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: LogPatch,
    ) -> anyhow::Result<Option<Log>> {
        let mut logs = lock(&self.logs)?;
        let Some(log) = logs
            .iter_mut()
            .find(|l| l.id == id && l.user_id == user_id)
        else {
            return Ok(None);
        };
        patch.apply_to(log);
        log.updated_at = Utc::now();
        Ok(Some(log.clone()))
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let mut logs = lock(&self.logs)?;
        let before = logs.len();
        logs.retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(logs.len() < before)
    }

    async fn insert_guest_drafts(
        &self,
        user_id: Uuid,
        seeds: Vec<GuestLogSeed>,
    ) -> anyhow::Result<usize> {
        let submitted = seeds.len();
        let mut logs = lock(&self.logs)?;
        for seed in seeds {
            let exists = logs.iter().any(|l| {
                l.user_id == user_id && l.guest_temp_id.as_deref() == Some(seed.temp_id.as_str())
            });
            if exists {
                continue;
            }
            logs.push(Log {
                id: Uuid::new_v4(),
                user_id,
                title: seed.title,
                content: seed.content,
                tags: seed.tags,
                date: seed.created_at,
                guest_temp_id: Some(seed.temp_id),
                created_at: seed.created_at,
                updated_at: seed.updated_at,
            });
        }
        Ok(submitted)
    }

    async fn tag_counts(
        &self,
        user_id: Uuid,
        filter: Option<String>,
    ) -> anyhow::Result<Vec<TagCount>> {
        let needle = filter.map(|f| f.to_lowercase());
        let logs = lock(&self.logs)?;
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for tag in logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .flat_map(|l| l.tags.iter())
        {
            if needle
                .as_ref()
                .is_none_or(|n| tag.to_lowercase().contains(n.as_str()))
            {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        let mut out: Vec<TagCount> = counts
            .into_iter()
            .map(|(name, count)| TagCount {
                name: name.to_string(),
                count,
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(out)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserRow>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let mut users = lock(&self.users)?;
        if users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
            password_hash: Some(password_hash.to_string()),
        };
        users.push(row.clone());
        Ok(Some(row))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        Ok(lock(&self.users)?
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        Ok(lock(&self.users)?
            .iter()
            .find(|u| u.id == id)
            .map(|u| UserRow {
                password_hash: None,
                ..u.clone()
            }))
    }
}

pub struct AlwaysHealthy;

#[async_trait]
impl HealthProbe for AlwaysHealthy {
    async fn ping(&self) -> bool {
        true
    }
}
