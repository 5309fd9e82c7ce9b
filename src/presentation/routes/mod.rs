// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::job_orchestrator::JobOrchestrator;
use crate::presentation::handlers::{job_handler, metrics_handler, record_handler};
use crate::presentation::middleware::rate_limit_middleware::{
    admission_middleware, AdmissionLimiter,
};
use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 构建HTTP路由
///
/// 准入限流只作用于任务提交路由
///
/// # 参数
///
/// * `orchestrator` - 任务编排用例
/// * `limiter` - 准入限流器
pub fn routes(orchestrator: Arc<JobOrchestrator>, limiter: Arc<AdmissionLimiter>) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/metrics", get(metrics_handler::metrics));

    let job_routes = Router::new()
        .route(
            "/jobs/crawl",
            post(job_handler::submit_job)
                .layer(middleware::from_fn_with_state(limiter, admission_middleware)),
        )
        .route("/jobs/status/{job_id}", get(job_handler::get_job_status))
        .route("/records/{record_type}", get(record_handler::list_records));

    Router::new()
        .merge(public_routes)
        .merge(job_routes)
        .layer(Extension(orchestrator))
        .layer(TraceLayer::new_for_http())
}

pub async fn root() -> &'static str {
    "Welcome to the crawlq job API"
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
