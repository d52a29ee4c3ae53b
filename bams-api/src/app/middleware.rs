use std::future::Future;
use std::pin::Pin;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use bams_core::{Role, TokenClaims};

use super::error::ApiError;
use super::state::AppState;

/// 认证信息扩展
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub claims: TokenClaims,
}

impl AuthInfo {
    /// 检查是否是管理员
    pub fn is_admin(&self) -> bool {
        self.claims.role == Role::Admin
    }

    /// 解析 subject claim 中的用户 ID
    pub fn user_id(&self) -> Option<i64> {
        self.claims.sub.parse().ok()
    }
}

/// 要求管理员权限的 Extractor
#[derive(Debug, Clone)]
pub struct RequireAdmin(#[allow(dead_code)] pub AuthInfo);

impl<S: Send + Sync> FromRequestParts<S> for RequireAdmin {
    type Rejection = ApiError;

    fn from_request_parts<'a, 'b, 'c>(
        parts: &'a mut Parts,
        _state: &'b S,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'c>>
    where
        'a: 'c,
        'b: 'c,
    {
        Box::pin(async move {
            let auth = parts
                .extensions
                .get::<AuthInfo>()
                .cloned()
                .ok_or_else(ApiError::unauthorized)?;

            if !auth.is_admin() {
                return Err(ApiError::forbidden("admin access required"));
            }
            Ok(RequireAdmin(auth))
        })
    }
}

/// 不需要认证的路径（整个 /auth 面都是公开的）
const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/auth/login",
    "/auth/register",
    "/auth/refresh",
    "/auth/logout",
    "/auth/forgot-password",
    "/auth/reset-password",
];

/// 从 Authorization header 中提取 Bearer token
fn extract_token(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    let token = extract_token(&request);

    // 公开端点不强制认证；但携带有效 token 时仍注入 AuthInfo，
    // 登出需要据此识别调用者
    if PUBLIC_PATHS.iter().any(|p| path == *p) {
        if let Some(token) = token {
            if let Ok(claims) = state.accounts.verify_token(&token) {
                request.extensions_mut().insert(AuthInfo { claims });
            }
        }
        return Ok(next.run(request).await);
    }

    // 其余端点要求有效的 access token；校验是纯 JWT 操作，不访问存储
    let token = token.ok_or_else(ApiError::unauthorized)?;
    let claims = state
        .accounts
        .verify_token(&token)
        .map_err(|_| ApiError::unauthorized())?;

    request.extensions_mut().insert(AuthInfo { claims });
    Ok(next.run(request).await)
}
