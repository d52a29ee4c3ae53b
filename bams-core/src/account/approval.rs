//! 管理员审批工作流：待审列表、批准、驳回、管理员开通
//!
//! 角色门控（仅 Admin 可调用）由 API 层的授权中间件保证，
//! 这里只实现工作流本身。

use super::crypto::hash_password;
use super::manager::AccountManager;
use super::models::*;
use super::tokens::temp_password;
use crate::error::{AuthError, Result};
use tracing::{info, instrument};

/// 临时密码长度
const TEMP_PASSWORD_LEN: usize = 12;

impl AccountManager {
    /// 列出所有待审批账户（脱敏投影，不含密码哈希）
    #[instrument(skip(self))]
    pub async fn list_pending(&self) -> Result<Vec<PendingUser>> {
        Ok(self
            .store
            .list_pending()?
            .iter()
            .map(PendingUser::from)
            .collect())
    }

    /// 批准账户（幂等：重复批准只是保持 Approved）
    #[instrument(skip(self))]
    pub async fn approve(&self, user_id: i64) -> Result<()> {
        let mut user = self.store.get(user_id)?;
        if user.status != AccountStatus::Approved {
            user.status = AccountStatus::Approved;
            self.store.save(&user)?;
            info!(user_id, "account approved");
        }
        Ok(())
    }

    /// 驳回账户：直接删除记录，不可恢复
    #[instrument(skip(self))]
    pub async fn reject(&self, user_id: i64) -> Result<()> {
        self.store.delete(user_id)?;
        info!(user_id, "account rejected and removed");
        Ok(())
    }

    /// 开通管理员账户：唯一绕过待审批状态的创建路径
    ///
    /// 未提供密码时生成 12 位字母数字临时密码并随响应返回一次，
    /// 由调用方带外转交；调用方自带密码时绝不回显。
    #[instrument(skip(self, req))]
    pub async fn create_admin(&self, req: CreateAdminRequest) -> Result<CreateAdminResponse> {
        if req.email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required".into()));
        }

        let supplied = req.password.as_deref().filter(|p| !p.is_empty());
        let generated = supplied.is_none();
        let password = match supplied {
            Some(p) => p.to_string(),
            None => temp_password(TEMP_PASSWORD_LEN),
        };
        let password_hash = hash_password(&password).await?;

        let user = self.store.create(NewAccount {
            email: req.email,
            password_hash,
            role: Role::Admin,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            status: AccountStatus::Approved,
        })?;

        info!(user_id = user.id, "admin account provisioned");
        Ok(CreateAdminResponse {
            id: user.id,
            email: user.email,
            temp_password: generated.then_some(password),
        })
    }
}
