use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::post,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::guest::{GuestDraftDto, MAX_MERGE_BODY_BYTES, validate_merge_batch};
use crate::application::use_cases::guest::merge_drafts::MergeGuestDrafts;
use crate::application::validation::ValidationErrors;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, require_user};
use crate::presentation::http::error::{ApiError, RawBody, parse_json};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestDraftItem {
    pub temp_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MergeRequest {
    pub drafts: Option<Vec<GuestDraftItem>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MergeResponse {
    pub ok: bool,
    pub inserted: usize,
}

impl From<GuestDraftItem> for GuestDraftDto {
    fn from(d: GuestDraftItem) -> Self {
        GuestDraftDto {
            temp_id: d.temp_id,
            title: d.title,
            content: d.content,
            tags: d.tags,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    // a full batch of long drafts is far above the global limit
    let limit = ctx.cfg.body_limit_bytes.max(MAX_MERGE_BODY_BYTES);
    Router::new()
        .route(
            "/guest/merge",
            post(merge_guest_drafts).layer(DefaultBodyLimit::max(limit)),
        )
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/guest/merge", tag = "Guest", request_body = MergeRequest,
    responses(
        (status = 200, body = MergeResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 401, body = super::error::ErrorBody),
        (status = 413, body = super::error::ErrorBody),
        (status = 500, body = super::error::ErrorBody)
    ))]
pub async fn merge_guest_drafts(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
    body: Result<RawBody, ApiError>,
) -> Result<Json<MergeResponse>, ApiError> {
    // anonymous callers get 401 whatever the body looks like
    let user_id = require_user(&ctx.cfg, bearer)?;
    let RawBody(body) = body?;
    let req: MergeRequest = parse_json(&body)?;
    let drafts = req
        .drafts
        .ok_or_else(|| ValidationErrors::single("drafts", "is required"))?;
    let seeds = validate_merge_batch(drafts.into_iter().map(Into::into).collect(), Utc::now())?;

    let repo = ctx.log_repo();
    let uc = MergeGuestDrafts {
        repo: repo.as_ref(),
    };
    let inserted = uc.execute(user_id, seeds).await?;
    Ok(Json(MergeResponse { ok: true, inserted }))
}
