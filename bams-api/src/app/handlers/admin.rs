//! 用户管理 API handlers（仅管理员可访问）

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bams_core::{CreateAdminRequest, CreateAdminResponse, PendingUser};
use serde_json::{json, Value};

use super::super::error::ApiError;
use super::super::middleware::RequireAdmin;
use super::super::state::AppState;

/// GET /usermanagement/pending - 列出待审批的注册申请
pub async fn pending_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<PendingUser>>, ApiError> {
    let pending = state.accounts.list_pending().await?;
    Ok(Json(pending))
}

/// POST /usermanagement/:id/approve - 批准注册申请（幂等）
pub async fn approve_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state.accounts.approve(id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "User approved", "userId": id })),
    ))
}

/// POST /usermanagement/:id/reject - 驳回注册申请并删除账户
pub async fn reject_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state.accounts.reject(id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "User rejected and removed", "userId": id })),
    ))
}

/// POST /usermanagement/create-admin - 开通管理员账户
pub async fn create_admin(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreateAdminResponse>), ApiError> {
    let resp = state.accounts.create_admin(req).await?;
    Ok((StatusCode::OK, Json(resp)))
}
