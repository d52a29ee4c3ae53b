//! 账户管理器：核心结构与配置

use super::models::TokenClaims;
use super::store::UserStore;
use super::tokens::TokenIssuer;
use crate::error::Result;
use std::sync::Arc;

const DEFAULT_JWT_ISSUER: &str = "bams-api";
const DEFAULT_JWT_AUDIENCE: &str = "bams-clients";

/// 认证与审批工作流的入口
///
/// 存储通过 [`UserStore`] 接口注入；具体操作拆分在 `auth.rs`、
/// `password.rs` 和 `approval.rs` 中。
#[derive(Clone)]
pub struct AccountManager {
    /// 凭据存储
    pub(super) store: Arc<dyn UserStore>,
    /// Access token 签发器
    pub(super) tokens: TokenIssuer,
    /// Refresh token 有效期（秒）
    pub(super) refresh_ttl: i64,
    /// 密码重置令牌有效期（秒）
    pub(super) reset_ttl: i64,
    /// 是否拒绝未审批账户登录
    pub(super) require_approval: bool,
}

impl AccountManager {
    /// 创建新的账户管理器
    pub fn new(store: Arc<dyn UserStore>, jwt_secret: String) -> Self {
        Self {
            store,
            tokens: TokenIssuer::new(
                jwt_secret,
                DEFAULT_JWT_ISSUER.to_string(),
                DEFAULT_JWT_AUDIENCE.to_string(),
                60 * 60, // 60 分钟
            ),
            refresh_ttl: 7 * 24 * 3600, // 7 天
            reset_ttl: 3600,            // 1 小时
            require_approval: true,
        }
    }

    /// 配置 JWT iss/aud
    pub fn with_claims_context(
        mut self,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        self.tokens = self.tokens.with_claims_context(issuer, audience);
        self
    }

    /// 配置 token 有效期
    pub fn with_ttl(mut self, access_ttl: i64, refresh_ttl: i64) -> Self {
        self.tokens = self.tokens.with_access_ttl(access_ttl);
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// 配置审批门控：关闭后未审批账户也允许登录（原系统的观察行为）
    pub fn with_approval_gate(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    /// 校验 access token；纯 JWT 校验，不访问存储
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims> {
        self.tokens.verify(token)
    }
}
