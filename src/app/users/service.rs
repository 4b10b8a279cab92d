//! 用户存储服务

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use super::model::{NewUser, User, UserId};

/// 存储操作错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("email {0} already exists")]
    DuplicateEmail(String),
    #[error("user store lock poisoned")]
    Unavailable,
}

#[derive(Debug)]
struct StoreInner {
    users: BTreeMap<UserId, User>,
    next_id: UserId,
}

impl StoreInner {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| Some(user.id) != except && user.email == email)
    }
}

/// 内存用户表
///
/// 所有操作都在同一把互斥锁内完成，唯一性检查与写入对其他操作是原子的。
/// ID 计数器只增不减，删除后的 ID 不会被复用。
#[derive(Debug)]
pub struct UserStore {
    inner: Mutex<StoreInner>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Unavailable)
    }

    /// 按 ID 升序返回全部用户
    pub fn list(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.lock()?;
        debug!(total = inner.users.len(), "列出用户");
        Ok(inner.users.values().cloned().collect())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.users.len())
    }

    pub fn contains(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.lock()?.users.contains_key(&id))
    }

    pub fn get(&self, id: UserId) -> Result<User, StoreError> {
        let inner = self.lock()?;
        debug!(user_id = id, "查询用户");
        inner.users.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    pub fn create(&self, fields: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock()?;

        if inner.email_taken(&fields.email, None) {
            return Err(StoreError::DuplicateEmail(fields.email));
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let user = User {
            id,
            name: fields.name,
            email: fields.email,
            age: fields.age,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.users.insert(id, user.clone());

        info!(user_id = id, "用户创建成功");
        Ok(user)
    }

    /// 整体替换 name/email/age，未提供的 age 会被清空
    pub fn update(&self, id: UserId, fields: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock()?;

        if !inner.users.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if inner.email_taken(&fields.email, Some(id)) {
            return Err(StoreError::DuplicateEmail(fields.email));
        }

        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.name = fields.name;
        user.email = fields.email;
        user.age = fields.age;
        user.updated_at = Some(Utc::now());

        info!(user_id = id, "用户更新成功");
        Ok(user.clone())
    }

    /// 删除并返回被删除用户的完整记录
    pub fn delete(&self, id: UserId) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        let user = inner.users.remove(&id).ok_or(StoreError::NotFound(id))?;
        info!(user_id = id, "用户删除成功");
        Ok(user)
    }
}
