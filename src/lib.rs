//! # 用户管理服务
//!
//! 基于 Axum 的内存用户管理 REST API：
//! - 应用层：用户增删改查、欢迎页与健康检查
//! - 核心层：统一错误响应、响应结构、请求日志中间件
//! - 基础设施层：配置加载与日志初始化

pub mod app;
pub mod core;
pub mod infrastructure;

pub use crate::app::users::{NewUser, StoreError, User, UserId, UserPayload, UserStore, ValidationError};
pub use crate::app::{build_router, AppState};
pub use crate::core::error::ApiError;
