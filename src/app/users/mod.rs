//! 用户管理

pub mod handler;
pub mod model;
pub mod service;

pub use model::{NewUser, User, UserId, UserPayload, ValidationError};
pub use service::{StoreError, UserStore};
