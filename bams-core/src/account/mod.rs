//! 账户认证、会话生命周期与审批模块

mod approval;
mod auth;
mod crypto;
mod manager;
mod models;
mod password;
mod store;
mod tokens;

pub use manager::AccountManager;
pub use models::{
    AccountStatus, AuthResponse, CreateAdminRequest, CreateAdminResponse, ForgotPasswordRequest,
    LoginRequest, NewAccount, PendingUser, RefreshRequest, RefreshResponse, RefreshSession,
    RegisterRequest, ResetPasswordRequest, ResetToken, Role, TokenClaims, UserAccount, UserProfile,
};
pub use store::{FileUserStore, UserStore};
pub use tokens::TokenIssuer;
