//! 用户处理器

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::Json,
    routing::get,
    Router,
};

use super::model::{User, UserId, UserPayload};
use crate::app::{method_not_allowed, AppState};
use crate::core::error::ApiError;
use crate::core::response::{DeleteUserResponse, UserListResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/:id",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(user_method_not_allowed),
        )
}

/// 只接受非负十进制整数，其余视为路由不匹配
fn parse_id(raw: &str) -> Result<UserId, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::EndpointNotFound);
    }
    raw.parse().map_err(|_| ApiError::EndpointNotFound)
}

/// `/users/:id` 中的用户 ID
///
/// 任何方法都先经过这里，ID 不合法时一律返回 404。
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        parse_id(&raw).map(UserIdPath)
    }
}

/// ID 合法但方法不支持
async fn user_method_not_allowed(_id: UserIdPath) -> ApiError {
    ApiError::MethodNotAllowed
}

fn payload(body: Result<Bytes, BytesRejection>) -> Result<UserPayload, ApiError> {
    Ok(UserPayload::from_bytes(&body?)?)
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = state.store.list()?;
    Ok(Json(UserListResponse::new(users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.store.get(id)?))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let fields = payload(body)?.validate()?;
    let user = state.store.create(fields)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<User>, ApiError> {
    // 先判断存在性，再校验请求体
    if !state.store.contains(id)? {
        return Err(ApiError::UserNotFound);
    }
    let fields = payload(body)?.validate()?;
    Ok(Json(state.store.update(id, fields)?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let user = state.store.delete(id)?;
    Ok(Json(DeleteUserResponse::new(user)))
}
