//! 欢迎页与健康检查

use axum::{extract::State, response::Json, routing::get, Router};

use crate::app::{method_not_allowed, AppState};
use crate::core::error::ApiError;
use crate::core::response::HealthResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome).fallback(method_not_allowed))
        .route("/health", get(health_check).fallback(method_not_allowed))
}

/// API 信息
pub async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the User Management API",
        "endpoints": {
            "health": "/health",
            "users": "/users",
            "create_user": "POST /users",
            "get_user": "GET /users/<id>",
            "update_user": "PUT /users/<id>",
            "delete_user": "DELETE /users/<id>"
        }
    }))
}

/// 健康检查
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let total = state.store.count()?;
    Ok(Json(HealthResponse::healthy(total)))
}
