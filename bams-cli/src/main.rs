mod client;
mod ops;

use clap::{Parser, Subcommand};
use ops::{
    approve_user, create_admin, forgot_password, login, logout, pending_users, refresh_token,
    reject_user, reset_password, OutputFormat,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI wrapper around the BAMS HTTP API.
#[derive(Parser)]
#[command(name = "bams-cli", author, version, about = "CLI for BAMS API")]
struct Cli {
    /// API base url
    #[arg(long, env = "BAMS_API_URL", default_value = "http://127.0.0.1:8080")]
    api_base: String,

    /// Bearer token for authentication
    #[arg(long, env = "BAMS_TOKEN")]
    token: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // ==================== 认证 ====================
    /// 用户登录，获取 access token
    Login {
        /// 邮箱
        #[arg(long, short)]
        email: String,
        /// 密码（缺省时交互式输入）
        #[arg(long, short)]
        password: Option<String>,
    },
    /// 刷新 access token
    Refresh {
        /// Refresh token
        #[arg(long, short)]
        refresh_token: String,
    },
    /// 登出，使当前刷新会话失效（需要 --token）
    Logout,
    /// 发起密码重置
    ForgotPassword {
        /// 邮箱
        #[arg(long, short)]
        email: String,
    },
    /// 使用重置令牌设置新密码
    ResetPassword {
        /// 重置令牌
        #[arg(long, short)]
        token: String,
        /// 新密码（缺省时交互式输入）
        #[arg(long, short)]
        password: Option<String>,
    },

    // ==================== 用户管理（仅管理员）====================
    /// 用户管理命令
    #[command(subcommand)]
    User(UserCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// 列出待审批的注册申请
    Pending,
    /// 批准注册申请
    Approve {
        /// 用户 ID
        id: i64,
    },
    /// 驳回注册申请并删除账户
    Reject {
        /// 用户 ID
        id: i64,
    },
    /// 开通管理员账户
    CreateAdmin {
        /// 邮箱
        #[arg(long, short)]
        email: String,
        /// 密码（缺省时由服务端生成临时密码）
        #[arg(long, short)]
        password: Option<String>,
        /// 名
        #[arg(long, default_value = "")]
        first_name: String,
        /// 姓
        #[arg(long, default_value = "")]
        last_name: String,
        /// 电话
        #[arg(long, default_value = "")]
        phone: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件（如果存在），忽略错误
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();
    let client = client::build_client(&cli.token)?;

    match cli.command {
        // 认证命令
        Commands::Login { email, password } => {
            login(&client, &cli.api_base, &email, password.as_deref(), cli.output).await?;
        }
        Commands::Refresh { refresh_token: rt } => {
            refresh_token(&client, &cli.api_base, &rt, cli.output).await?;
        }
        Commands::Logout => logout(&client, &cli.api_base).await?,
        Commands::ForgotPassword { email } => {
            forgot_password(&client, &cli.api_base, &email).await?
        }
        Commands::ResetPassword { token, password } => {
            reset_password(&client, &cli.api_base, &token, password.as_deref()).await?
        }

        // 用户管理命令
        Commands::User(user_cmd) => match user_cmd {
            UserCommands::Pending => pending_users(&client, &cli.api_base, cli.output).await?,
            UserCommands::Approve { id } => approve_user(&client, &cli.api_base, id).await?,
            UserCommands::Reject { id } => reject_user(&client, &cli.api_base, id).await?,
            UserCommands::CreateAdmin {
                email,
                password,
                first_name,
                last_name,
                phone,
            } => {
                create_admin(
                    &client,
                    &cli.api_base,
                    &email,
                    password.as_deref(),
                    &first_name,
                    &last_name,
                    &phone,
                    cli.output,
                )
                .await?
            }
        },
    }

    Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses() {
        let args = ["bams", "user", "pending"];
        let _ = Cli::parse_from(&args);
    }
}
