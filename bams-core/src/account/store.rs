//! 账户存储：仓储接口与基于 JSON 文件的实现

use super::models::{AccountStatus, NewAccount, UserAccount};
use crate::error::{AuthError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// 凭据存储的仓储接口
///
/// 把工作流逻辑与具体存储技术解耦；文件实现见 [`FileUserStore`]。
/// 实现方必须保证 `create` 内部的邮箱唯一性检查是原子的（不区分大小写），
/// 并发注册不能绕过该约束。
pub trait UserStore: Send + Sync {
    /// 创建账户：分配 ID 和创建时间；邮箱已存在时返回 `EmailTaken`
    fn create(&self, account: NewAccount) -> Result<UserAccount>;
    /// 按 ID 读取；不存在返回 `NotFound`
    fn get(&self, id: i64) -> Result<UserAccount>;
    /// 按邮箱查找（不区分大小写）
    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>>;
    /// 按刷新 token 精确匹配查找
    fn find_by_refresh_token(&self, token: &str) -> Result<Option<UserAccount>>;
    /// 按重置令牌精确匹配查找
    fn find_by_reset_token(&self, token: &str) -> Result<Option<UserAccount>>;
    /// 覆盖保存账户记录
    fn save(&self, account: &UserAccount) -> Result<()>;
    /// 删除账户；不存在返回 `NotFound`
    fn delete(&self, id: i64) -> Result<()>;
    /// 列出所有待审批账户
    fn list_pending(&self) -> Result<Vec<UserAccount>>;
}

/// 基于 JSON 文件的账户存储
///
/// 目录结构：`<data_dir>/accounts/<id>.json` 每账户一个文件，
/// `index.json` 保存小写邮箱 -> ID 索引，`seq.json` 保存已分配的最大 ID。
#[derive(Debug)]
pub struct FileUserStore {
    data_dir: PathBuf,
    /// 写锁：保证创建/删除时索引与序号的一致性
    write_lock: Mutex<()>,
}

impl FileUserStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// 确保账户目录存在
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.accounts_dir())?;
        Ok(())
    }

    fn accounts_dir(&self) -> PathBuf {
        self.data_dir.join("accounts")
    }

    fn account_path(&self, id: i64) -> PathBuf {
        self.accounts_dir().join(format!("{}.json", id))
    }

    fn index_path(&self) -> PathBuf {
        self.accounts_dir().join("index.json")
    }

    fn seq_path(&self) -> PathBuf {
        self.accounts_dir().join("seq.json")
    }

    /// 加载邮箱（小写） -> ID 索引
    fn load_index(&self) -> HashMap<String, i64> {
        if let Ok(data) = fs::read(self.index_path()) {
            if let Ok(map) = serde_json::from_slice::<HashMap<String, i64>>(&data) {
                return map;
            }
        }
        HashMap::new()
    }

    fn save_index(&self, index: &HashMap<String, i64>) -> Result<()> {
        let data = serde_json::to_vec_pretty(index)?;
        fs::write(self.index_path(), data)?;
        Ok(())
    }

    /// 分配下一个 ID（只增不减，删除的 ID 不复用）
    fn next_id(&self) -> Result<i64> {
        let last: i64 = fs::read(self.seq_path())
            .ok()
            .and_then(|data| serde_json::from_slice(&data).ok())
            .unwrap_or(0);
        let next = last + 1;
        fs::write(self.seq_path(), serde_json::to_vec(&next)?)?;
        Ok(next)
    }

    /// 获取写锁；锁中毒说明有写路径 panic 过，按内部错误上报
    fn write_guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| AuthError::Other("store write lock poisoned".to_string()))
    }

    fn persist(&self, account: &UserAccount) -> Result<()> {
        let data = serde_json::to_vec_pretty(account)?;
        fs::write(self.account_path(account.id), data)?;
        Ok(())
    }

    fn read_account(&self, path: &Path) -> Option<UserAccount> {
        let data = fs::read(path).ok()?;
        serde_json::from_slice(&data).ok()
    }

    /// 遍历所有账户文件（跳过 index/seq）
    fn scan(&self) -> Result<Vec<UserAccount>> {
        self.ensure_dirs()?;
        let mut accounts = Vec::new();
        for entry in fs::read_dir(self.accounts_dir())? {
            let path = entry?.path();
            let is_meta = path
                .file_stem()
                .map(|s| s == "index" || s == "seq")
                .unwrap_or(true);
            if is_meta || path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if let Some(account) = self.read_account(&path) {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }
}

impl UserStore for FileUserStore {
    fn create(&self, account: NewAccount) -> Result<UserAccount> {
        let _guard = self.write_guard()?;
        self.ensure_dirs()?;

        let mut index = self.load_index();
        let key = account.email.to_lowercase();
        if index.contains_key(&key) {
            return Err(AuthError::EmailTaken(account.email));
        }

        let user = UserAccount {
            id: self.next_id()?,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            first_name: account.first_name,
            last_name: account.last_name,
            phone: account.phone,
            status: account.status,
            refresh_session: None,
            reset_token: None,
            created_at: Utc::now(),
        };

        self.persist(&user)?;
        index.insert(key, user.id);
        self.save_index(&index)?;

        info!(user_id = user.id, role = %user.role, "created account");
        Ok(user)
    }

    fn get(&self, id: i64) -> Result<UserAccount> {
        let path = self.account_path(id);
        if !path.exists() {
            return Err(AuthError::NotFound(format!("user: {}", id)));
        }
        let data = fs::read(&path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        self.ensure_dirs()?;
        let index = self.load_index();
        let key = email.to_lowercase();
        match index.get(&key) {
            Some(id) => match self.get(*id) {
                Ok(user) => Ok(Some(user)),
                Err(AuthError::NotFound(_)) => {
                    // 索引指向的账户文件已不存在，顺手清理
                    let _guard = self.write_guard()?;
                    let mut index = self.load_index();
                    index.remove(&key);
                    let _ = self.save_index(&index);
                    Ok(None)
                }
                Err(e) => Err(e),
            },
            None => Ok(None),
        }
    }

    fn find_by_refresh_token(&self, token: &str) -> Result<Option<UserAccount>> {
        let found = self.scan()?.into_iter().find(|u| {
            u.refresh_session
                .as_ref()
                .map(|s| s.token == token)
                .unwrap_or(false)
        });
        Ok(found)
    }

    fn find_by_reset_token(&self, token: &str) -> Result<Option<UserAccount>> {
        let found = self.scan()?.into_iter().find(|u| {
            u.reset_token
                .as_ref()
                .map(|t| t.token == token)
                .unwrap_or(false)
        });
        Ok(found)
    }

    fn save(&self, account: &UserAccount) -> Result<()> {
        let _guard = self.write_guard()?;
        self.ensure_dirs()?;
        self.persist(account)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.write_guard()?;
        let path = self.account_path(id);
        if !path.exists() {
            return Err(AuthError::NotFound(format!("user: {}", id)));
        }
        fs::remove_file(&path)?;
        let mut index = self.load_index();
        index.retain(|_, uid| *uid != id);
        self.save_index(&index)?;
        info!(user_id = id, "deleted account");
        Ok(())
    }

    fn list_pending(&self) -> Result<Vec<UserAccount>> {
        let mut pending: Vec<UserAccount> = self
            .scan()?
            .into_iter()
            .filter(|u| u.status == AccountStatus::Pending)
            .collect();
        pending.sort_by_key(|u| u.id);
        Ok(pending)
    }
}
