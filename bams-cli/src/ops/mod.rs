mod admin;
mod auth;
mod output;
pub mod ui;

pub use admin::{approve_user, create_admin, pending_users, reject_user};
pub use auth::{forgot_password, login, logout, refresh_token, reset_password};
pub use output::OutputFormat;
