//! Core library for academy account administration: credential storage,
//! password hashing, token issuance, and the auth/approval workflows.

pub mod account;
mod error;

pub use account::{
    AccountManager, AccountStatus, AuthResponse, CreateAdminRequest, CreateAdminResponse,
    FileUserStore, ForgotPasswordRequest, LoginRequest, NewAccount, PendingUser, RefreshRequest,
    RefreshResponse, RefreshSession, RegisterRequest, ResetPasswordRequest, ResetToken, Role,
    TokenClaims, TokenIssuer, UserAccount, UserProfile, UserStore,
};
pub use error::{AuthError, Result};
