// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crawlq::app_context::AppContext;
use crawlq::config::settings::Settings;
use crawlq::infrastructure::observability::metrics;
use crawlq::utils::telemetry;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting crawlq...");

    // Initialize Prometheus Metrics
    metrics::init_metrics();

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect, migrate and assemble components
    let context = AppContext::build(settings).await?;
    info!(
        "Registered crawl variants: {}",
        context.registry.names().join(", ")
    );

    // 4. Start workers and the recovery scheduler
    let mut worker_manager = context.worker_manager();
    worker_manager.start();

    // 5. Start HTTP server
    let app = context.router();
    let addr = format!(
        "{}:{}",
        context.settings.server.host, context.settings.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    worker_manager.shutdown().await;

    if let Err(e) = served {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("crawlq stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
