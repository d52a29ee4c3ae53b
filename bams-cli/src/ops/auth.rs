//! 认证相关 CLI 操作

use super::ui::{print_header, print_hint, print_kv, print_section, print_success};
use super::OutputFormat;
use crate::client::handle_error;
use bams_core::{AuthResponse, RefreshResponse};
use crossterm::style::Stylize;
use dialoguer::Password;
use reqwest::Client;
use serde_json::{json, Value};

/// 未通过 --password 提供密码时交互式提示输入
fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    Ok(Password::new().with_prompt(prompt).interact()?)
}

/// 用户登录
pub async fn login(
    client: &Client,
    base: &str,
    email: &str,
    password: Option<&str>,
    output: OutputFormat,
) -> anyhow::Result<AuthResponse> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt_password("密码")?,
    };

    let url = format!("{}/auth/login", base);
    let resp = client
        .post(&url)
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await?;
    let resp = handle_error(resp).await?;
    let auth: AuthResponse = resp.json().await?;

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&auth)?);
        }
        OutputFormat::Table => {
            print_header("🔐 登录成功");
            print_kv("用户 ID", &auth.user.id.to_string());
            print_kv("邮箱", &auth.user.email);
            print_kv("角色", &auth.user.role.to_string());
            println!();
            print_section("🎫 令牌");
            print_kv("Access Token", &auth.access_token);
            print_kv("Refresh Token", &auth.refresh_token);
            println!();
            print_hint(&format!(
                "设置环境变量以使用此 token: {}",
                "BAMS_TOKEN=<access_token>".cyan()
            ));
        }
    }

    Ok(auth)
}

/// 刷新 access token
pub async fn refresh_token(
    client: &Client,
    base: &str,
    refresh_token: &str,
    output: OutputFormat,
) -> anyhow::Result<RefreshResponse> {
    let url = format!("{}/auth/refresh", base);
    let resp = client
        .post(&url)
        .json(&json!({
            "refreshToken": refresh_token
        }))
        .send()
        .await?;
    let resp = handle_error(resp).await?;
    let token: RefreshResponse = resp.json().await?;

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
        OutputFormat::Table => {
            print_success("Token 刷新成功");
            print_kv("Access Token", &token.access_token);
        }
    }

    Ok(token)
}

/// 登出（使当前刷新会话失效，依赖 --token 识别调用者）
pub async fn logout(client: &Client, base: &str) -> anyhow::Result<()> {
    let url = format!("{}/auth/logout", base);
    let resp = client.post(&url).json(&json!({})).send().await?;
    let resp = handle_error(resp).await?;
    let body: Value = resp.json().await?;

    print_success(body["message"].as_str().unwrap_or("已登出"));
    Ok(())
}

/// 发起密码重置
pub async fn forgot_password(client: &Client, base: &str, email: &str) -> anyhow::Result<()> {
    let url = format!("{}/auth/forgot-password", base);
    let resp = client
        .post(&url)
        .json(&json!({ "email": email }))
        .send()
        .await?;
    let resp = handle_error(resp).await?;
    let body: Value = resp.json().await?;

    print_success(body["message"].as_str().unwrap_or("请求已提交"));
    Ok(())
}

/// 使用重置令牌设置新密码
pub async fn reset_password(
    client: &Client,
    base: &str,
    token: &str,
    new_password: Option<&str>,
) -> anyhow::Result<()> {
    let new_password = match new_password {
        Some(p) => p.to_string(),
        None => prompt_password("新密码")?,
    };

    let url = format!("{}/auth/reset-password", base);
    let resp = client
        .post(&url)
        .json(&json!({
            "token": token,
            "newPassword": new_password
        }))
        .send()
        .await?;
    let resp = handle_error(resp).await?;
    let body: Value = resp.json().await?;

    print_success(body["message"].as_str().unwrap_or("密码已重置"));
    Ok(())
}
