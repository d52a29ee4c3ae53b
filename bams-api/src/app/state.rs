use bams_core::AccountManager;
use std::sync::Arc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// 账户与会话工作流
    pub accounts: Arc<AccountManager>,
}
