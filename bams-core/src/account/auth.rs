//! 认证工作流：登录、注册、刷新、登出

use super::crypto::{hash_password, verify_password};
use super::manager::AccountManager;
use super::models::*;
use super::tokens::new_opaque_token;
use crate::error::{AuthError, Result};
use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};

/// 登录失败的统一提示：不区分「账户不存在」和「密码错误」，防止账户枚举
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH: &str = "Invalid or expired refresh token";

impl AccountManager {
    /// 用户登录
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let user = self
            .store
            .find_by_email(email)?
            .ok_or_else(|| AuthError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        // 验证密码
        let valid = verify_password(password, &user.password_hash).await?;
        if !valid {
            warn!(user_id = user.id, "login failed: invalid password");
            return Err(AuthError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        // 审批门控：密码正确但账户仍待审批时拒绝
        if self.require_approval && user.status == AccountStatus::Pending {
            warn!(user_id = user.id, "login rejected: account pending approval");
            return Err(AuthError::Unauthorized(
                "Account is pending approval".into(),
            ));
        }

        info!(user_id = user.id, "user logged in");
        self.open_session(user)
    }

    /// 自助注册：创建待审批账户并直接签发令牌
    ///
    /// 角色只能从 Coach/Parent/Player 中选择，缺省为 Player；
    /// 管理员账户必须走 [`create_admin`](Self::create_admin) 开通路径。
    #[instrument(skip(self, req))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        let role = req.role.unwrap_or_default();
        if role == Role::Admin {
            return Err(AuthError::Validation(
                "Admin accounts cannot be self-registered".into(),
            ));
        }

        let password_hash = hash_password(&req.password).await?;
        // 邮箱唯一性由存储层在创建时原子地强制
        let user = self.store.create(NewAccount {
            email: req.email,
            password_hash,
            role,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            status: AccountStatus::Pending,
        })?;

        info!(user_id = user.id, role = %user.role, "account registered, pending approval");
        self.open_session(user)
    }

    /// 刷新 access token
    ///
    /// 刷新不轮换 refresh token：同一令牌在自身过期或下次登录/登出前保持有效。
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let user = self
            .store
            .find_by_refresh_token(refresh_token)?
            .ok_or_else(|| AuthError::Unauthorized(INVALID_REFRESH.into()))?;

        // 过期时间必须严格在未来
        let active = user
            .refresh_session
            .as_ref()
            .map(|s| s.is_active(Utc::now()))
            .unwrap_or(false);
        if !active {
            warn!(user_id = user.id, "refresh rejected: session expired");
            return Err(AuthError::Unauthorized(INVALID_REFRESH.into()));
        }

        let access_token = self.tokens.issue_access_token(&user)?;
        info!(user_id = user.id, "access token refreshed");
        Ok(RefreshResponse { access_token })
    }

    /// 登出：清除刷新会话（幂等，账户或会话不存在也算成功）
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: i64) -> Result<()> {
        match self.store.get(user_id) {
            Ok(mut user) => {
                user.refresh_session = None;
                self.store.save(&user)?;
                info!(user_id, "user logged out");
                Ok(())
            }
            Err(AuthError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// 签发 access + refresh token 并持久化新会话
    ///
    /// 旧的刷新会话被覆盖：每个账户同一时间只有一个有效 refresh token。
    pub(super) fn open_session(&self, mut user: UserAccount) -> Result<AuthResponse> {
        let access_token = self.tokens.issue_access_token(&user)?;
        let refresh_token = new_opaque_token();
        user.refresh_session = Some(RefreshSession {
            token: refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(self.refresh_ttl),
        });
        self.store.save(&user)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: UserProfile::from(&user),
        })
    }
}
