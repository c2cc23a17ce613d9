use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid invite code")]
    InvalidInviteCode,

    #[error("This invite code has been used up")]
    ExhaustedInviteCode,

    #[error("Question {question_id} is required")]
    RequiredFieldMissing { question_id: Uuid },

    #[error("Attendance already exists for this user and event")]
    DuplicateAttendance,

    #[error("Cannot move attendance from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    question_id: Option<Uuid>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut question_id = None;
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::InvalidInviteCode => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::ExhaustedInviteCode => (StatusCode::GONE, self.to_string()),
            AppError::RequiredFieldMissing { question_id: id } => {
                question_id = Some(*id);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "This question is required".to_string(),
                )
            }
            AppError::DuplicateAttendance => (
                StatusCode::CONFLICT,
                "You have already applied to this event".to_string(),
            ),
            AppError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, format!("Validation error: {}", e)),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Json(e) => (StatusCode::BAD_REQUEST, format!("JSON error: {}", e)),
            AppError::Jwt(e) => (StatusCode::UNAUTHORIZED, format!("JWT error: {}", e)),
            AppError::HttpClient(e) => {
                tracing::error!("HTTP client error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Upstream service error: {}", e),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                detail: message,
                question_id,
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn get_response_body(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        let body_str = String::from_utf8(bytes.to_vec()).unwrap();
        (status, body_str)
    }

    #[tokio::test]
    async fn test_invalid_invite_is_not_found() {
        let response = AppError::InvalidInviteCode.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Invalid invite code"));
    }

    #[tokio::test]
    async fn test_exhausted_invite_has_distinct_message() {
        let response = AppError::ExhaustedInviteCode.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::GONE);
        assert!(body.contains("used up"));
        assert!(!body.contains("Invalid invite code"));
    }

    #[tokio::test]
    async fn test_required_field_carries_question_id() {
        let id = Uuid::new_v4();
        let response = AppError::RequiredFieldMissing { question_id: id }.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["detail"], "This question is required");
        assert_eq!(parsed["question_id"], id.to_string());
    }

    #[tokio::test]
    async fn test_database_error_is_opaque() {
        let error = AppError::Database(sea_orm::DbErr::Custom("disk I/O error".to_string()));
        let (status, body) = get_response_body(error.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Database error"));
        assert!(!body.contains("disk I/O"));
    }

    #[tokio::test]
    async fn test_json_error_response_format() {
        let error = AppError::NotFound("Event not found".to_string());
        let (_, body) = get_response_body(error.into_response()).await;

        // Response should be JSON with "detail" field and no question id
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.get("detail").unwrap(), "Event not found");
        assert!(parsed.get("question_id").is_none());
    }

    #[test]
    fn test_error_display_impl() {
        assert_eq!(
            AppError::NotFound("test".to_string()).to_string(),
            "Not found: test"
        );
        assert_eq!(
            AppError::Conflict("test".to_string()).to_string(),
            "Conflict: test"
        );
        assert_eq!(
            AppError::InvalidTransition {
                from: "approved".to_string(),
                to: "rejected".to_string()
            }
            .to_string(),
            "Cannot move attendance from approved to rejected"
        );
    }
}
