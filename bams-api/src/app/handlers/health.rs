use axum::extract::ConnectInfo;
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde_json::json;
use std::net::SocketAddr;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// 处理 404 错误，记录可疑请求
pub async fn handler_404(
    uri: Uri,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let path = uri.path();
    let ip = connect_info
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::warn!("404 request: path={}, ip={}", path, ip);

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "code": "NotFound",
            "message": "Resource not found"
        })),
    )
}
