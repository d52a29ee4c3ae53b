use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::handlers::{
    approve_user, create_admin, forgot_password, handler_404, health, login, logout,
    pending_users, refresh, register, reject_user, reset_password,
};
use super::middleware::auth_middleware;
use super::state::AppState;

/// 根据配置的来源列表构建 CorsLayer
fn build_cors_layer(cors_origins: Vec<String>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ])
        .allow_credentials(true);

    if cors_origins.is_empty() {
        // 未配置时允许所有来源（开发环境友好，生产环境应配置 BAMS_CORS_ORIGINS）
        tracing::warn!(
            "BAMS_CORS_ORIGINS not configured, allowing all origins. \
             Set BAMS_CORS_ORIGINS in production for security."
        );
        base.allow_origin(AllowOrigin::any())
            .allow_credentials(false) // any() 不能与 credentials(true) 共用
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .into_iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        base.allow_origin(origins)
    }
}

/// Build the router with routes and middleware wired.
pub fn app_router(state: AppState, cors_origins: Vec<String>) -> Router {
    // 认证端点（公开；登出依赖中间件注入的可选 AuthInfo）
    let auth_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password));

    // 用户管理端点（需要管理员权限，由 handler 中的 RequireAdmin extractor 检查）
    let admin_routes = Router::new()
        .route("/usermanagement/pending", get(pending_users))
        .route("/usermanagement/:id/approve", post(approve_user))
        .route("/usermanagement/:id/reject", post(reject_user))
        .route("/usermanagement/create-admin", post(create_admin));

    Router::new()
        .merge(auth_routes)
        .merge(admin_routes)
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .fallback(handler_404)
        .layer(build_cors_layer(cors_origins))
        .with_state(state)
}
