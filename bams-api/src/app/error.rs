use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bams_core::AuthError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    code: &'static str,
    message: String,
    status: StatusCode,
}

impl ApiError {
    pub fn new(code: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new("Unauthorized", StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("Forbidden", StatusCode::FORBIDDEN, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BadRequest", StatusCode::BAD_REQUEST, message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // 不透露 ID 是否存在过，统一为固定文案
            AuthError::NotFound(_) => {
                ApiError::new("NotFound", StatusCode::NOT_FOUND, "User not found")
            }
            // 重复邮箱对注册方本人可见，按约定返回 400 而非 409
            AuthError::EmailTaken(_) => ApiError::new(
                "BadRequest",
                StatusCode::BAD_REQUEST,
                "User with this email already exists",
            ),
            AuthError::Validation(msg) => {
                ApiError::new("BadRequest", StatusCode::BAD_REQUEST, msg)
            }
            AuthError::Unauthorized(msg) => {
                ApiError::new("Unauthorized", StatusCode::UNAUTHORIZED, msg)
            }
            AuthError::Io(e) => {
                ApiError::new("IoError", StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AuthError::Serde(e) => ApiError::new(
                "SerdeError",
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ),
            AuthError::Other(msg) => {
                ApiError::new("Error", StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
