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

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use crawlq::application::use_cases::job_orchestrator::JobOrchestrator;
use crawlq::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use crawlq::infrastructure::repositories::record_repo_impl::RecordRepositoryImpl;
use crawlq::presentation::middleware::rate_limit_middleware::AdmissionLimiter;
use crawlq::presentation::routes;
use crawlq::queue::job_queue::DatabaseJobQueue;
use sea_orm::MockDatabase;
use std::sync::Arc;
use tower::util::ServiceExt;

fn mock_router() -> axum::Router {
    let db = Arc::new(MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection());
    let queue = Arc::new(DatabaseJobQueue::new(
        Arc::new(JobRepositoryImpl::new(db.clone())),
        chrono::Duration::seconds(300),
    ));
    let records = Arc::new(RecordRepositoryImpl::new(db));
    let orchestrator = Arc::new(JobOrchestrator::new(queue, records));
    routes::routes(orchestrator, Arc::new(AdmissionLimiter::Disabled))
}

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let response = mock_router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn version_reports_crate_version() {
    let response = mock_router()
        .oneshot(
            Request::builder()
                .uri("/v1/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body, env!("CARGO_PKG_VERSION").as_bytes());
}

/// 空变体名称在入队前被拒绝，不会触达数据库
#[tokio::test]
async fn empty_variant_name_is_unprocessable() {
    let response = mock_router()
        .oneshot(
            Request::builder()
                .uri("/jobs/crawl")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"variant_name": ""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
