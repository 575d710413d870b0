use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::dto::logs::{CreateLogDto, UpdateLogDto};
use crate::application::use_cases::logs::create_log::CreateLog;
use crate::application::use_cases::logs::delete_log::DeleteLog;
use crate::application::use_cases::logs::get_log::GetLog;
use crate::application::use_cases::logs::list_logs::ListLogs;
use crate::application::use_cases::logs::update_log::UpdateLog;
use crate::bootstrap::app_context::AppContext;
use crate::domain::logs::log as domain;
use crate::presentation::http::auth::{Bearer, require_user};
use crate::presentation::http::error::{ApiError, RawBody, parse_json};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_temp_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::Log> for LogResponse {
    fn from(l: domain::Log) -> Self {
        LogResponse {
            id: l.id,
            user_id: l.user_id,
            title: l.title,
            content: l.content,
            tags: l.tags,
            date: l.date,
            guest_temp_id: l.guest_temp_id,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateLogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    /// RFC 3339; defaults to now
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLogsQuery {
    /// Exact tag match
    pub tag: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteLogResponse {
    pub message: &'static str,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/logs", get(list_logs).post(create_log))
        .route("/logs/:id", get(get_log).put(update_log).delete(delete_log))
        .with_state(ctx)
}

// A blank id is a malformed request; an id that is not a UUID names no log.
fn parse_log_id(raw: &str) -> Result<Uuid, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request("ID is required"));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Not found"))
}

#[utoipa::path(get, path = "/api/logs", tag = "Logs",
    params(ListLogsQuery),
    responses(
        (status = 200, body = [LogResponse]),
        (status = 401, body = super::error::ErrorBody)
    ))]
pub async fn list_logs(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
    Query(q): Query<ListLogsQuery>,
) -> Result<Json<Vec<LogResponse>>, ApiError> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let repo = ctx.log_repo();
    let uc = ListLogs {
        repo: repo.as_ref(),
    };
    let logs = uc.execute(user_id, q.tag).await?;
    Ok(Json(logs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/api/logs", tag = "Logs", request_body = CreateLogRequest,
    responses(
        (status = 201, body = LogResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 401, body = super::error::ErrorBody)
    ))]
pub async fn create_log(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
    RawBody(body): RawBody,
) -> Result<(StatusCode, Json<LogResponse>), ApiError> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let req: CreateLogRequest = parse_json(&body)?;
    let new_log = CreateLogDto {
        title: req.title,
        content: req.content,
        tags: req.tags,
        date: req.date,
    }
    .validate(Utc::now())?;
    let repo = ctx.log_repo();
    let uc = CreateLog {
        repo: repo.as_ref(),
    };
    let log = uc.execute(user_id, new_log).await?;
    Ok((StatusCode::CREATED, Json(log.into())))
}

#[utoipa::path(get, path = "/api/logs/{id}", tag = "Logs",
    params(("id" = String, Path, description = "Log ID")),
    responses(
        (status = 200, body = LogResponse),
        (status = 401, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn get_log(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
    Path(id): Path<String>,
) -> Result<Json<LogResponse>, ApiError> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let id = parse_log_id(&id)?;
    let repo = ctx.log_repo();
    let uc = GetLog {
        repo: repo.as_ref(),
    };
    let log = uc
        .execute(id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    Ok(Json(log.into()))
}

#[utoipa::path(put, path = "/api/logs/{id}", tag = "Logs", request_body = UpdateLogRequest,
    params(("id" = String, Path, description = "Log ID")),
    responses(
        (status = 200, body = LogResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 401, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn update_log(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
    Path(id): Path<String>,
    RawBody(body): RawBody,
) -> Result<Json<LogResponse>, ApiError> {
    // body is checked before the caller is resolved
    let req: UpdateLogRequest = parse_json(&body)?;
    let dto = UpdateLogDto {
        title: req.title,
        content: req.content,
        tags: req.tags,
        date: req.date,
    };
    if dto.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    let patch = dto.validate()?;

    let user_id = require_user(&ctx.cfg, bearer)?;
    let id = parse_log_id(&id)?;
    let repo = ctx.log_repo();
    let uc = UpdateLog {
        repo: repo.as_ref(),
    };
    let log = uc
        .execute(id, user_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    Ok(Json(log.into()))
}

#[utoipa::path(delete, path = "/api/logs/{id}", tag = "Logs",
    params(("id" = String, Path, description = "Log ID")),
    responses(
        (status = 200, body = DeleteLogResponse),
        (status = 401, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn delete_log(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
    Path(id): Path<String>,
) -> Result<Json<DeleteLogResponse>, ApiError> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let id = parse_log_id(&id)?;
    let repo = ctx.log_repo();
    let uc = DeleteLog {
        repo: repo.as_ref(),
    };
    if !uc.execute(id, user_id).await? {
        return Err(ApiError::not_found("Not found"));
    }
    Ok(Json(DeleteLogResponse {
        message: "Deleted successfully",
    }))
}
