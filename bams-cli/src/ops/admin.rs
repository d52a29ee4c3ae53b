//! 用户管理 CLI 操作（需要管理员 token）

use super::ui::{print_empty, print_header, print_hint, print_kv, print_success, print_table_header};
use super::OutputFormat;
use crate::client::handle_error;
use bams_core::{CreateAdminResponse, PendingUser};
use crossterm::style::Stylize;
use reqwest::Client;
use serde_json::{json, Value};

/// 列出待审批的注册申请
pub async fn pending_users(
    client: &Client,
    base: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/usermanagement/pending", base);
    let resp = client.get(&url).send().await?;
    let resp = handle_error(resp).await?;
    let pending: Vec<PendingUser> = resp.json().await?;

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
        OutputFormat::Table => {
            print_header("📋 待审批注册申请");

            if pending.is_empty() {
                print_empty("暂无待审批的申请");
            } else {
                print_table_header(&[
                    ("ID", 8),
                    ("邮箱", 28),
                    ("姓名", 16),
                    ("角色", 8),
                    ("注册时间", 20),
                ]);
                for user in &pending {
                    let name = format!("{} {}", user.first_name, user.last_name);
                    println!(
                        "  {:<8} {:<28} {:<16} {:<8} {}",
                        user.id.to_string().dark_grey(),
                        user.email.as_str().cyan(),
                        name.trim(),
                        user.role.to_string(),
                        user.date.format("%Y-%m-%d %H:%M")
                    );
                }
                println!();
                print_hint(&format!(
                    "批准: {}  驳回: {}",
                    "bams-cli user approve <id>".cyan(),
                    "bams-cli user reject <id>".cyan()
                ));
            }
        }
    }

    Ok(())
}

/// 批准注册申请
pub async fn approve_user(client: &Client, base: &str, id: i64) -> anyhow::Result<()> {
    let url = format!("{}/usermanagement/{}/approve", base, id);
    let resp = client.post(&url).send().await?;
    let resp = handle_error(resp).await?;
    let body: Value = resp.json().await?;

    print_success(body["message"].as_str().unwrap_or("已批准"));
    Ok(())
}

/// 驳回注册申请并删除账户
pub async fn reject_user(client: &Client, base: &str, id: i64) -> anyhow::Result<()> {
    let url = format!("{}/usermanagement/{}/reject", base, id);
    let resp = client.post(&url).send().await?;
    let resp = handle_error(resp).await?;
    let body: Value = resp.json().await?;

    print_success(body["message"].as_str().unwrap_or("已驳回"));
    Ok(())
}

/// 开通管理员账户
pub async fn create_admin(
    client: &Client,
    base: &str,
    email: &str,
    password: Option<&str>,
    first_name: &str,
    last_name: &str,
    phone: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/usermanagement/create-admin", base);
    let mut body = json!({
        "email": email,
        "firstName": first_name,
        "lastName": last_name,
        "phone": phone
    });
    if let Some(pw) = password {
        body["password"] = pw.into();
    }

    let resp = client.post(&url).json(&body).send().await?;
    let resp = handle_error(resp).await?;
    let created: CreateAdminResponse = resp.json().await?;

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        OutputFormat::Table => {
            print_success(&format!("管理员 {} 开通成功", created.email));
            print_kv("ID", &created.id.to_string());
            if let Some(temp) = &created.temp_password {
                // 临时密码只返回这一次
                print_kv("临时密码", &temp.as_str().yellow().to_string());
                print_hint("请立即转交给该管理员并提示其尽快修改密码");
            }
        }
    }

    Ok(())
}
