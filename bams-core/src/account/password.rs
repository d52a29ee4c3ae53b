//! 密码重置工作流：忘记密码、重置密码

use super::crypto::hash_password;
use super::manager::AccountManager;
use super::models::ResetToken;
use super::tokens::new_opaque_token;
use crate::error::{AuthError, Result};
use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

/// 无效与过期不作区分，避免泄露令牌状态
const INVALID_RESET: &str = "Invalid or expired reset token";

impl AccountManager {
    /// 忘记密码：生成单次使用的重置令牌
    ///
    /// 账户不存在时静默成功——调用方看到的行为必须与存在时一致（防枚举）。
    /// 令牌的带外投递（邮件）由外部协作方负责，这里只负责生成和持久化。
    #[instrument(skip(self, email))]
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let Some(mut user) = self.store.find_by_email(email)? else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };

        user.reset_token = Some(ResetToken {
            token: new_opaque_token(),
            expires_at: Utc::now() + Duration::seconds(self.reset_ttl),
        });
        self.store.save(&user)?;

        info!(user_id = user.id, "password reset token issued");
        // TODO: 接入邮件投递服务，把重置链接发送给用户
        Ok(())
    }

    /// 重置密码：替换密码哈希并清除重置令牌
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        if token.is_empty() {
            return Err(AuthError::Validation(INVALID_RESET.into()));
        }

        let mut user = self
            .store
            .find_by_reset_token(token)?
            .ok_or_else(|| AuthError::Validation(INVALID_RESET.into()))?;

        let active = user
            .reset_token
            .as_ref()
            .map(|t| t.is_active(Utc::now()))
            .unwrap_or(false);
        if !active {
            return Err(AuthError::Validation(INVALID_RESET.into()));
        }

        user.password_hash = hash_password(new_password).await?;
        // 单次使用：成功后清除令牌与过期时间
        user.reset_token = None;
        self.store.save(&user)?;

        info!(user_id = user.id, "password reset completed");
        Ok(())
    }
}
