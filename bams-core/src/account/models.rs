//! 账户数据模型与请求/响应 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;

/// 账户角色（封闭枚举）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// 管理员（只能通过管理员开通路径创建）
    Admin,
    /// 教练
    Coach,
    /// 家长
    Parent,
    /// 球员（自助注册未指定角色时的默认值）
    #[default]
    Player,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "Admin",
            Role::Coach => "Coach",
            Role::Parent => "Parent",
            Role::Player => "Player",
        };
        f.write_str(s)
    }
}

/// 账户审批状态
///
/// 自助注册的账户从 `Pending` 开始，管理员批准后进入 `Approved`。
/// 管理员开通路径创建的账户直接是 `Approved`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Pending,
    Approved,
}

/// 刷新会话：登录/注册时签发，保存在账户记录上
///
/// 每个账户同一时间只有一个有效会话；新登录会覆盖旧会话。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSession {
    /// 不透明随机 token（32 字节随机数的 base64）
    pub token: String,
    /// 过期时间；只有严格晚于当前时间才有效
    pub expires_at: DateTime<Utc>,
}

impl RefreshSession {
    /// 会话是否仍然有效（过期时间必须严格在未来）
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// 密码重置令牌（单次使用，成功重置后清除）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// 用户账户（存储模型，包含密码哈希）
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// 数字 ID（由存储层分配，不复用）
    pub id: i64,
    /// 邮箱（按原样保存；查找与唯一性检查不区分大小写）
    pub email: String,
    /// bcrypt 哈希后的密码
    pub password_hash: String,
    /// 账户角色
    pub role: Role,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    /// 审批状态
    pub status: AccountStatus,
    /// 当前刷新会话（登出后为空）
    #[serde(default)]
    pub refresh_session: Option<RefreshSession>,
    /// 待使用的密码重置令牌
    #[serde(default)]
    pub reset_token: Option<ResetToken>,
    /// 创建时间（由存储层设置，之后不变）
    pub created_at: DateTime<Utc>,
}

/// 新账户（尚未分配 ID，由存储层补全）
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub status: AccountStatus,
}

/// JWT Claims 结构
///
/// sub/email/role 供下游做授权判断；firstName/lastName 仅用于展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: 用户 ID（十进制字符串）
    pub sub: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    /// JWT issuer
    pub iss: String,
    /// JWT audience
    pub aud: String,
    /// 过期时间戳 (Unix timestamp)
    pub exp: i64,
    /// 签发时间戳 (Unix timestamp)
    pub iat: i64,
}

// ============================================================================
// 请求 DTO（字段名与前端约定一致，使用 camelCase）
// ============================================================================

/// 登录请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// 注册请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    /// 可选角色；缺省为 Player
    #[serde(default)]
    pub role: Option<Role>,
}

/// 刷新请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// 忘记密码请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// 重置密码请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// 管理员开通请求
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    #[serde(default)]
    pub email: String,
    /// 可选；为空时生成 12 位临时密码
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

// ============================================================================
// 响应 DTO
// ============================================================================

/// 用户信息摘要（不含任何敏感字段）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<&UserAccount> for UserProfile {
    fn from(user: &UserAccount) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

/// 登录/注册响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Access token (JWT)
    pub access_token: String,
    /// Refresh token（不透明，需回查存储）
    pub refresh_token: String,
    pub user: UserProfile,
}

/// 刷新响应：只返回新的 access token，refresh token 不轮换
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// 待审批账户列表项
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: String,
    /// 注册时间
    pub date: DateTime<Utc>,
}

impl From<&UserAccount> for PendingUser {
    fn from(user: &UserAccount) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            phone: user.phone.clone(),
            date: user.created_at,
        }
    }
}

/// 管理员开通响应
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminResponse {
    pub id: i64,
    pub email: String,
    /// 仅在服务端生成临时密码时返回，供带外转交
    pub temp_password: Option<String>,
}
