//! 应用层

pub mod system;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::core::error::{handle_middleware_error, handle_panic, ApiError};
use crate::core::middleware::request_logging_middleware;
use users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
}

impl AppState {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

pub async fn not_found() -> ApiError {
    ApiError::EndpointNotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// 组装完整路由和中间件
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let routes = Router::new()
        .merge(system::handler::routes())
        .merge(users::handler::routes());

    with_layers(routes, request_timeout).with_state(state)
}

fn with_layers(routes: Router<AppState>, request_timeout: Duration) -> Router<AppState> {
    routes
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
