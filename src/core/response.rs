//! 核心响应处理模块

use serde::{Deserialize, Serialize};

use crate::app::users::model::User;

/// GET /users 响应
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: usize,
}

impl UserListResponse {
    pub fn new(users: Vec<User>) -> Self {
        let total = users.len();
        Self { users, total }
    }
}

/// DELETE /users/:id 响应，回显被删除的记录
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub deleted_user: User,
}

impl DeleteUserResponse {
    pub fn new(deleted_user: User) -> Self {
        Self {
            message: "User deleted successfully".to_string(),
            deleted_user,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub total_users: usize,
}

impl HealthResponse {
    pub fn healthy(total_users: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_users,
        }
    }
}
