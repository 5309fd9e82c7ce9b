// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use crawlq::app_context::AppContext;
use crawlq::config::settings::Settings;
use crawlq::infrastructure::crawlers::registry::VariantRegistry;
use crawlq::infrastructure::database::connection;
use crawlq::workers::manager::WorkerManager;
use serde_json::Value;
use std::time::Duration;

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub context: AppContext,
    pub worker_manager: Option<WorkerManager>,
}

/// 使用内存SQLite的测试设置
pub fn test_settings() -> Settings {
    Settings::for_tests("sqlite::memory:")
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(test_settings(), false).await
}

pub async fn create_test_app_with_worker(settings: Settings) -> TestApp {
    create_test_app_with(settings, true).await
}

pub async fn create_test_app_with(settings: Settings, start_worker: bool) -> TestApp {
    let db = connection::connect_and_migrate(&settings.database)
        .await
        .expect("Failed to connect and migrate test database");
    let context = AppContext::from_parts(settings, db, VariantRegistry::builtin())
        .expect("Failed to build app context");

    let worker_manager = if start_worker {
        let mut manager = context.worker_manager();
        manager.start_workers(1);
        Some(manager)
    } else {
        None
    };

    let server = TestServer::new(context.router()).unwrap();

    TestApp {
        server,
        context,
        worker_manager,
    }
}

impl TestApp {
    /// 轮询状态接口直到任务进入终态
    pub async fn wait_for_terminal(&self, job_id: &str) -> Value {
        for _ in 0..200 {
            let body: Value = self
                .server
                .get(&format!("/jobs/status/{}", job_id))
                .await
                .json();
            if matches!(body["state"].as_str(), Some("complete" | "failed")) {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("job {} did not reach a terminal state", job_id);
    }

    pub async fn shutdown(mut self) {
        if let Some(manager) = self.worker_manager.as_mut() {
            manager.shutdown().await;
        }
    }
}
