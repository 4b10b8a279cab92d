//! 用户数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// 用户 ID，由存储分配，从 1 开始单调递增
pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// 原样保存客户端提交的值，缺省时序列化为 null
    pub age: Option<Value>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 经过校验的创建/更新字段
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Option<Value>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: None,
        }
    }

    pub fn with_age(mut self, age: impl Into<Value>) -> Self {
        let age = age.into();
        self.age = if age.is_null() { None } else { Some(age) };
        self
    }
}

/// 请求体校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No data provided")]
    NoData,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid field: {0} must be a string")]
    InvalidField(&'static str),
}

/// 原始请求体
///
/// 请求体先按字节读取再解析，任何无法解析的内容都视为校验错误，
/// 而不是框架层面的拒绝。
#[derive(Debug, Clone, Default)]
pub struct UserPayload {
    fields: Map<String, Value>,
}

impl UserPayload {
    /// 必填字段，按此顺序校验
    const REQUIRED: [&'static str; 2] = ["name", "email"];

    pub fn from_bytes(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::NoData);
        }
        let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::NoData)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(fields) if !fields.is_empty() => Ok(Self { fields }),
            _ => Err(ValidationError::NoData),
        }
    }

    pub fn validate(mut self) -> Result<NewUser, ValidationError> {
        for field in Self::REQUIRED {
            match self.fields.get(field) {
                None | Some(Value::Null) => return Err(ValidationError::MissingField(field)),
                Some(Value::String(s)) if s.is_empty() => {
                    return Err(ValidationError::MissingField(field))
                }
                Some(Value::String(_)) => {}
                Some(_) => return Err(ValidationError::InvalidField(field)),
            }
        }

        let name = take_string(&mut self.fields, "name");
        let email = take_string(&mut self.fields, "email");
        let age = self.fields.remove("age").filter(|v| !v.is_null());

        Ok(NewUser { name, email, age })
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}
