use crate::application::dto::auth::RegisterDto;
use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::register::Register as RegisterUc;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::presentation::http::error::{ApiError, RawBody, parse_json};
use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    routing::{get, post},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const ACCESS_COOKIE: &str = "access_token";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 201, body = UserResponse),
    (status = 400, body = super::error::ErrorBody),
    (status = 409, body = super::error::ErrorBody)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    RawBody(body): RawBody,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let req: RegisterRequest = parse_json(&body)?;
    let dto = RegisterDto {
        email: req.email,
        password: req.password,
        name: req.name,
    }
    .validate()?;
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(&dto)
        .await?
        .ok_or_else(|| ApiError::Conflict("User already exists".into()))?;
    tracing::info!(user_id = %user.id, "user_registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 401, body = super::error::ErrorBody)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    RawBody(body): RawBody,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let req: LoginRequest = parse_json(&body)?;
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let dto = LoginDto {
        email: req.email,
        password: req.password,
    };
    let user = uc.execute(&dto).await?.ok_or(ApiError::Unauthorized)?;
    let token = issue_access_token(&ctx.cfg, user.id)?;

    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie(&token, ctx.cfg.jwt_expires_secs, ctx.cfg.secure_cookies());
    if let Ok(v) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, v);
    }

    Ok((
        headers,
        Json(LoginResponse {
            access_token: token,
            user: UserResponse {
                id: user.id,
                email: user.email,
                name: user.name,
            },
        }),
    ))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "Auth", responses(
    (status = 200, body = UserResponse),
    (status = 401, body = super::error::ErrorBody)
))]
pub async fn me(
    State(ctx): State<AppContext>,
    bearer: Option<Bearer>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = require_user(&ctx.cfg, bearer)?;
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let row = uc.execute(id).await?.ok_or(ApiError::Unauthorized)?;
    Ok(Json(UserResponse {
        id: row.id,
        email: row.email,
        name: row.name,
    }))
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "Auth", responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> (HeaderMap, StatusCode) {
    // Clear cookie by setting it expired
    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie("", 0, ctx.cfg.secure_cookies());
    if let Ok(v) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, v);
    }
    (headers, StatusCode::NO_CONTENT)
}

// Extractor for the raw access token
pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) Prefer Authorization header if present
        if let Some(auth) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(Bearer(t.trim().to_string()));
            }
        }

        // 2) Fallback to HttpOnly cookie `access_token`
        if let Some(cookie_hdr) = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = get_cookie(cookie_hdr, ACCESS_COOKIE) {
                return Ok(Bearer(token));
            }
        }

        Err(ApiError::Unauthorized)
    }
}

pub fn issue_access_token(cfg: &Config, user_id: Uuid) -> anyhow::Result<String> {
    let now = chrono::Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + cfg.jwt_expires_secs.max(0) as usize,
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
    )?;
    Ok(token)
}

pub fn validate_bearer_str(cfg: &Config, token: &str) -> Result<String, ApiError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;
    Ok(data.claims.sub)
}

/// Resolves the caller; a missing, expired or malformed token is Unauthorized.
pub fn require_user(cfg: &Config, bearer: Option<Bearer>) -> Result<Uuid, ApiError> {
    let Bearer(token) = bearer.ok_or(ApiError::Unauthorized)?;
    let sub = validate_bearer_str(cfg, &token)?;
    Uuid::parse_str(&sub).map_err(|_| ApiError::Unauthorized)
}

// --- Cookie helpers ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    // SameSite=Lax for the same-site SPA/API deployment
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        ACCESS_COOKIE,
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}
