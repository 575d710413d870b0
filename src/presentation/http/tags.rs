use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::dto::tags::TagItemDto;
use crate::application::use_cases::tags::list_tags::ListTags;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, require_user};
use crate::presentation::http::error::ApiError;

#[derive(Serialize, ToSchema)]
pub struct TagItem {
    pub name: String,
    pub count: i64,
}

impl From<TagItemDto> for TagItem {
    fn from(d: TagItemDto) -> Self {
        TagItem {
            name: d.name,
            count: d.count,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagsQuery {
    /// Case-insensitive substring filter
    pub q: Option<String>,
}

#[utoipa::path(get, path = "/api/tags", tag = "Tags",
    params(TagsQuery),
    responses((status = 200, body = [TagItem]), (status = 401, body = super::error::ErrorBody)))]
pub async fn list_tags(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
    Query(q): Query<TagsQuery>,
) -> Result<Json<Vec<TagItem>>, ApiError> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let repo = ctx.log_repo();
    let uc = ListTags {
        repo: repo.as_ref(),
    };
    let items: Vec<TagItemDto> = uc.execute(user_id, q.q).await?;
    let out: Vec<TagItem> = items.into_iter().map(Into::into).collect();
    Ok(Json(out))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new().route("/tags", get(list_tags)).with_state(ctx)
}
