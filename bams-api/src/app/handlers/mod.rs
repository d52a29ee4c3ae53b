mod admin;
mod auth;
mod health;

pub use admin::{approve_user, create_admin, pending_users, reject_user};
pub use auth::{forgot_password, login, logout, refresh, register, reset_password};
pub use health::{handler_404, health};
