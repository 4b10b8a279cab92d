use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use user_store_api::infrastructure::{config::load_config, logger::init_logging};
use user_store_api::{build_router, AppState, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 第一个命令行参数可指定配置文件
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let (config, source) = load_config(config_path.as_deref()).context("加载配置失败")?;

    let _guard = init_logging(&config.logging).context("初始化日志失败")?;

    match &source {
        Some(path) => info!("从配置文件加载: {}", path.display()),
        None => info!("未找到配置文件，使用默认配置"),
    }

    info!("启动用户管理服务...");

    let state = AppState::new(Arc::new(UserStore::new()));
    let app = build_router(state, config.http.timeout());

    let addr = config.http.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法绑定到 {}", addr))?;

    info!("🚀 服务运行在 http://{}", addr);
    info!("📖 API 端点:");
    info!("   GET    /              - API 信息");
    info!("   GET    /health        - 健康检查");
    info!("   GET    /users         - 获取所有用户");
    info!("   POST   /users         - 创建新用户");
    info!("   GET    /users/:id     - 获取特定用户");
    info!("   PUT    /users/:id     - 更新用户");
    info!("   DELETE /users/:id     - 删除用户");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("监听退出信号失败: {}", e);
    }
    info!("收到退出信号，正在关闭...");
}
