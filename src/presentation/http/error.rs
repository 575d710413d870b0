use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use utoipa::ToSchema;

use crate::application::validation::{FieldError, ValidationErrors};

/// Failure taxonomy of the HTTP surface. Bodies are always `{"error": ...}`,
/// with `details` added for validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid payload")]
    Validation(ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Server error")]
    Server(#[from] anyhow::Error),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            Self::Validation(errors) => Some(errors.errors().to_vec()),
            Self::Server(err) => {
                tracing::error!(error = ?err, "request_failed");
                None
            }
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

/// Raw request body whose read failures (size limit, broken stream) are
/// reported through [`ApiError`] instead of axum's plain-text rejection.
pub struct RawBody(pub Bytes);

#[axum::async_trait]
impl<S> FromRequest<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        Ok(RawBody(bytes))
    }
}

/// Decodes a JSON request body, reporting malformed input as a validation
/// failure on `body` rather than axum's plain-text rejection.
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ValidationErrors::single("body", "is required").into());
    }
    serde_json::from_slice(body)
        .map_err(|e| ValidationErrors::single("body", e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Probe {
        #[allow(dead_code)]
        title: String,
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ValidationErrors::single("title", "is required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::not_found("Not found").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("User already exists".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::from(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_the_cause() {
        let err = ApiError::from(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Server error");
    }

    #[test]
    fn parse_json_reports_body_field() {
        let err = parse_json::<Probe>(&Bytes::from_static(b"{not json")).unwrap_err();
        match err {
            ApiError::Validation(errors) => assert!(errors.has_field("body")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse_json::<Probe>(&Bytes::new()),
            Err(ApiError::Validation(_))
        ));
        assert!(parse_json::<Probe>(&Bytes::from_static(br#"{"title":"a"}"#)).is_ok());
    }
}
