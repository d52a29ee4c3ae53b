//! 认证相关 API handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use bams_core::{
    ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest,
};
use serde_json::{json, Value};

use super::super::error::ApiError;
use super::super::middleware::AuthInfo;
use super::super::state::AppState;

/// POST /auth/login - 用户登录
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let resp = state.accounts.login(&req.email, &req.password).await?;
    Ok((StatusCode::OK, Json(json!(resp))))
}

/// POST /auth/register - 自助注册（进入待审批状态）
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let resp = state.accounts.register(req).await?;
    Ok((StatusCode::OK, Json(json!(resp))))
}

/// POST /auth/refresh - 刷新 access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if req.refresh_token.is_empty() {
        return Err(ApiError::bad_request("Refresh token is required"));
    }

    let resp = state.accounts.refresh(&req.refresh_token).await?;
    Ok((StatusCode::OK, Json(json!(resp))))
}

/// POST /auth/logout - 登出
///
/// 总是返回成功：能识别调用者就清除其刷新会话，否则也不报错（幂等）。
pub async fn logout(
    State(state): State<AppState>,
    auth: Option<Extension<AuthInfo>>,
) -> (StatusCode, Json<Value>) {
    if let Some(Extension(auth)) = auth {
        if let Some(user_id) = auth.user_id() {
            if let Err(e) = state.accounts.logout(user_id).await {
                tracing::warn!(user_id, error = %e, "logout cleanup failed");
            }
        }
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Logged out successfully" })),
    )
}

/// POST /auth/forgot-password - 发起密码重置
///
/// 无论账户是否存在都返回同一响应，不能据此探测账户（防枚举）。
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state.accounts.forgot_password(&req.email).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "If the email exists, a password reset link has been sent"
        })),
    ))
}

/// POST /auth/reset-password - 使用重置令牌设置新密码
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state
        .accounts
        .reset_password(&req.token, &req.new_password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Password reset successfully" })),
    ))
}
