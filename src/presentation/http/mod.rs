pub mod auth;
pub mod error;
pub mod guest;
pub mod health;
pub mod logs;
pub mod tags;

use axum::Router;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::http::{self, HeaderValue};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        logs::list_logs,
        logs::create_log,
        logs::get_log,
        logs::update_log,
        logs::delete_log,
        guest::merge_guest_drafts,
        tags::list_tags,
        health::health,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::UserResponse,
        logs::LogResponse,
        logs::CreateLogRequest,
        logs::UpdateLogRequest,
        logs::DeleteLogResponse,
        guest::GuestDraftItem,
        guest::MergeRequest,
        guest::MergeResponse,
        tags::TagItem,
        health::HealthResp,
        error::ErrorBody,
        crate::application::validation::FieldError,
    )),
    tags(
        (name = "Auth", description = "Registration and sessions"),
        (name = "Logs", description = "Owner-scoped learning logs"),
        (name = "Guest", description = "Merging drafts written before sign-in"),
        (name = "Tags", description = "Tag summaries"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Full HTTP surface: every resource under `/api`, docs, CORS, body limit and tracing.
pub fn router(ctx: AppContext) -> Router {
    let cors = cors_layer(&ctx.cfg);
    let body_limit = ctx.cfg.body_limit_bytes;
    Router::new()
        .nest("/api", health::routes(ctx.clone()))
        .nest("/api/auth", auth::routes(ctx.clone()))
        .nest("/api", logs::routes(ctx.clone()))
        .nest("/api", guest::routes(ctx.clone()))
        .nest("/api", tags::routes(ctx.clone()))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        )
}

fn cors_layer(cfg: &Config) -> CorsLayer {
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::OPTIONS,
    ];
    let headers = [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];
    match cfg
        .frontend_url
        .as_deref()
        .and_then(|u| HeaderValue::from_str(u).ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
        // production refuses to start without FRONTEND_URL; deny all anyway
        None if cfg.is_production => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
            .allow_methods(methods)
            .allow_headers(headers),
        // Development convenience
        None => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
    }
}
