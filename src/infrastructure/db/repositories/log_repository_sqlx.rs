use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::log_repository::LogRepository;
use crate::domain::logs::log::{GuestLogSeed, Log, LogPatch, NewLog, TagCount};
use crate::infrastructure::db::PgPool;

const LOG_COLUMNS: &str =
    "id, user_id, title, content, tags, date, guest_temp_id, created_at, updated_at";

pub struct SqlxLogRepository {
    pub pool: PgPool,
}

impl SqlxLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_log(r: PgRow) -> Log {
    Log {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        content: r.get("content"),
        tags: r.get("tags"),
        date: r.get("date"),
        guest_temp_id: r.get("guest_temp_id"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

// Substring match on the literal filter text: LIKE wildcards in user input are escaped.
fn contains_pattern(filter: &str) -> String {
    let escaped = filter
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl LogRepository for SqlxLogRepository {
    async fn list_for_user(&self, user_id: Uuid, tag: Option<String>) -> anyhow::Result<Vec<Log>> {
        let rows = if let Some(t) = tag {
            sqlx::query(&format!(
                "SELECT {LOG_COLUMNS} FROM logs
                 WHERE user_id = $1 AND $2 = ANY(tags)
                 ORDER BY date DESC, created_at DESC"
            ))
            .bind(user_id)
            .bind(t)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                "SELECT {LOG_COLUMNS} FROM logs
                 WHERE user_id = $1
                 ORDER BY date DESC, created_at DESC"
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(map_log).collect())
    }

    async fn get_for_user(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Log>> {
        let row = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(map_log))
    }

    async fn create_for_user(&self, user_id: Uuid, log: NewLog) -> anyhow::Result<Log> {
        let row = sqlx::query(&format!(
            "INSERT INTO logs (user_id, title, content, tags, date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LOG_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&log.title)
        .bind(&log.content)
        .bind(&log.tags)
        .bind(log.date)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_log(row))
    }

    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: LogPatch,
    ) -> anyhow::Result<Option<Log>> {
        let row = sqlx::query(&format!(
            "UPDATE logs SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                tags = COALESCE($3, tags),
                date = COALESCE($4, date),
                updated_at = now()
             WHERE id = $5 AND user_id = $6
             RETURNING {LOG_COLUMNS}"
        ))
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.tags)
        .bind(patch.date)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(map_log))
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_guest_drafts(
        &self,
        user_id: Uuid,
        seeds: Vec<GuestLogSeed>,
    ) -> anyhow::Result<usize> {
        let submitted = seeds.len();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;
        for seed in &seeds {
            // first write wins: an existing (user_id, guest_temp_id) row is left as is
            let res = sqlx::query(
                r#"INSERT INTO logs
                       (user_id, title, content, tags, date, guest_temp_id, created_at, updated_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $5, $7)
                   ON CONFLICT (user_id, guest_temp_id) WHERE guest_temp_id IS NOT NULL
                   DO NOTHING"#,
            )
            .bind(user_id)
            .bind(&seed.title)
            .bind(&seed.content)
            .bind(&seed.tags)
            .bind(seed.created_at)
            .bind(&seed.temp_id)
            .bind(seed.updated_at)
            .execute(&mut *tx)
            .await?;
            inserted += res.rows_affected();
        }
        tx.commit().await?;
        tracing::debug!(user_id = %user_id, submitted, inserted, "guest_draft_upserts_committed");
        Ok(submitted)
    }

    async fn tag_counts(
        &self,
        user_id: Uuid,
        filter: Option<String>,
    ) -> anyhow::Result<Vec<TagCount>> {
        let rows = if let Some(f) = filter {
            let like = contains_pattern(&f);
            sqlx::query(
                r#"SELECT tag AS name, COUNT(*)::BIGINT AS count
                   FROM logs, UNNEST(tags) AS tag
                   WHERE user_id = $1 AND tag ILIKE $2 ESCAPE '\'
                   GROUP BY tag
                   ORDER BY count DESC, tag ASC"#,
            )
            .bind(user_id)
            .bind(like)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"SELECT tag AS name, COUNT(*)::BIGINT AS count
                   FROM logs, UNNEST(tags) AS tag
                   WHERE user_id = $1
                   GROUP BY tag
                   ORDER BY count DESC, tag ASC"#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows
            .into_iter()
            .map(|r| TagCount {
                name: r.get("name"),
                count: r.get("count"),
            })
            .collect())
    }
}
