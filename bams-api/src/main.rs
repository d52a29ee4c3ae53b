mod app;

use app::{app_router, AppState};
use bams_core::{AccountManager, AuthError, CreateAdminRequest, FileUserStore};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct ApiConfig {
    bind: SocketAddr,
    data_dir: PathBuf,
    /// JWT 签名密钥
    jwt_secret: String,
    /// JWT iss
    jwt_issuer: String,
    /// JWT aud
    jwt_audience: String,
    /// 是否拒绝未审批账户登录
    require_approval: bool,
    /// CORS 允许的来源列表（空则允许所有）
    cors_origins: Vec<String>,
    /// 初始管理员邮箱（仅在账户不存在时开通）
    bootstrap_admin_email: Option<String>,
    /// 初始管理员密码（缺省则生成临时密码并记录日志）
    bootstrap_admin_password: Option<String>,
}

impl ApiConfig {
    fn from_env() -> Self {
        let bind = env::var("BAMS_BIND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| "0.0.0.0:8080".parse().expect("valid default bind"));

        let data_dir = env::var("BAMS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        // JWT 密钥；未配置时每次启动随机生成（重启后旧 token 全部失效）
        let jwt_secret = env::var("BAMS_JWT_SECRET").unwrap_or_else(|_| {
            info!("BAMS_JWT_SECRET not set; generating a random secret for this run");
            uuid::Uuid::new_v4().to_string()
        });
        let jwt_issuer = env::var("BAMS_JWT_ISSUER").unwrap_or_else(|_| "bams-api".into());
        let jwt_audience = env::var("BAMS_JWT_AUDIENCE").unwrap_or_else(|_| "bams-clients".into());

        // 审批门控默认开启；设为 false/0 可回退到原系统的宽松行为
        let require_approval = env::var("BAMS_REQUIRE_APPROVAL")
            .map(|s| {
                let trimmed = s.trim().to_lowercase();
                !(trimmed == "false" || trimmed == "0" || trimmed == "off")
            })
            .unwrap_or(true);

        // CORS 允许的来源，逗号分隔；空或 "*" 表示允许所有
        let cors_origins = env::var("BAMS_CORS_ORIGINS")
            .ok()
            .map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed == "*" {
                    vec![]
                } else {
                    trimmed
                        .split(',')
                        .filter(|t| !t.trim().is_empty())
                        .map(|t| t.trim().to_string())
                        .collect()
                }
            })
            .unwrap_or_default();

        let bootstrap_admin_email = env::var("BAMS_ADMIN_EMAIL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let bootstrap_admin_password = env::var("BAMS_ADMIN_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        Self {
            bind,
            data_dir,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            require_approval,
            cors_origins,
            bootstrap_admin_email,
            bootstrap_admin_password,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 优先读取 .env（若存在）
    let _ = dotenv();
    init_tracing();

    let config = ApiConfig::from_env();
    info!("starting API on {}", config.bind);

    let store = Arc::new(FileUserStore::new(config.data_dir.clone()));
    store.ensure_dirs()?;

    let accounts = Arc::new(
        AccountManager::new(store, config.jwt_secret.clone())
            .with_claims_context(config.jwt_issuer.clone(), config.jwt_audience.clone())
            .with_approval_gate(config.require_approval),
    );

    // 初始管理员：只有管理员能开通管理员，首个必须在启动时引导
    bootstrap_admin(&accounts, &config).await;

    let state = AppState { accounts };
    let app = app_router(state, config.cors_origins.clone());
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// 按需开通初始管理员账户
async fn bootstrap_admin(accounts: &Arc<AccountManager>, config: &ApiConfig) {
    let Some(email) = &config.bootstrap_admin_email else {
        return;
    };

    let req = CreateAdminRequest {
        email: email.clone(),
        password: config.bootstrap_admin_password.clone(),
        first_name: String::new(),
        last_name: String::new(),
        phone: String::new(),
    };
    match accounts.create_admin(req).await {
        Ok(resp) => {
            info!(user_id = resp.id, "bootstrap admin account created");
            if let Some(temp) = resp.temp_password {
                // 仅此一次可见；管理员应立即登录并修改
                warn!("bootstrap admin temporary password: {}", temp);
            }
        }
        Err(AuthError::EmailTaken(_)) => {
            info!("bootstrap admin already exists, skipping");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to bootstrap admin account");
        }
    }
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
