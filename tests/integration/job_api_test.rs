// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_with, test_settings};
use axum::http::StatusCode;
use crawlq::config::settings::RateLimitBackend;
use crawlq::infrastructure::database::entities::job;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_submit_returns_queued_ticket() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/jobs/crawl")
        .json(&json!({
            "variant_name": "wikipedia",
            "parameters": {"search_term": "rust"}
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["state"], json!("queued"));
    let job_id = body["job_id"].as_str().unwrap();
    assert!(Uuid::parse_str(job_id).is_ok());

    // Nothing is running, the job stays queued
    let status: Value = app
        .server
        .get(&format!("/jobs/status/{}", job_id))
        .await
        .json();
    assert_eq!(status["state"], json!("queued"));
    assert_eq!(status["result"], Value::Null);
}

#[tokio::test]
async fn test_third_submission_in_window_is_rejected() {
    let app = create_test_app().await;
    let request = json!({"variant_name": "quotes"});

    for _ in 0..2 {
        let response = app.server.post("/jobs/crawl").json(&request).await;
        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    }

    let response = app.server.post("/jobs/crawl").json(&request).await;
    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body, json!({"error": "Too many requests"}));

    // Rejected submissions are never queued
    let queued = job::Entity::find()
        .count(app.context.db.as_ref())
        .await
        .unwrap();
    assert_eq!(queued, 2);
}

#[tokio::test]
async fn test_quota_is_per_client() {
    let app = create_test_app().await;
    let request = json!({"variant_name": "quotes"});

    for _ in 0..2 {
        app.server
            .post("/jobs/crawl")
            .add_header("X-Forwarded-For", "198.51.100.1")
            .json(&request)
            .await;
    }
    let blocked = app
        .server
        .post("/jobs/crawl")
        .add_header("X-Forwarded-For", "198.51.100.1")
        .json(&request)
        .await;
    assert_eq!(blocked.status_code(), StatusCode::TOO_MANY_REQUESTS);

    let other = app
        .server
        .post("/jobs/crawl")
        .add_header("X-Forwarded-For", "198.51.100.2")
        .json(&request)
        .await;
    assert_eq!(other.status_code(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_status_queries_are_not_rate_limited() {
    let app = create_test_app().await;
    for _ in 0..5 {
        let response = app
            .server
            .get(&format!("/jobs/status/{}", Uuid::new_v4()))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_disabled_limiter_admits_everything() {
    let mut settings = test_settings();
    settings.rate_limiting.enabled = false;
    let app = create_test_app_with(settings, false).await;

    for _ in 0..5 {
        let response = app
            .server
            .post("/jobs/crawl")
            .json(&json!({"variant_name": "quotes"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    }
}

#[tokio::test]
async fn test_unavailable_redis_backend_is_503() {
    let mut settings = test_settings();
    settings.rate_limiting.backend = RateLimitBackend::Redis;
    settings.redis.url = "redis://127.0.0.1:1".to_string();
    let app = create_test_app_with(settings, false).await;

    let response = app
        .server
        .post("/jobs/crawl")
        .json(&json!({"variant_name": "quotes"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_and_malformed_job_ids_are_404() {
    let app = create_test_app().await;

    let unknown = app
        .server
        .get(&format!("/jobs/status/{}", Uuid::new_v4()))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let malformed = app.server.get("/jobs/status/not-a-uuid").await;
    assert_eq!(malformed.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_variant_name_is_422() {
    let app = create_test_app().await;
    let response = app
        .server
        .post("/jobs/crawl")
        .json(&json!({"variant_name": ""}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_records_listing() {
    let app = create_test_app().await;

    let empty = app.server.get("/records/quotes").await;
    assert_eq!(empty.status_code(), StatusCode::OK);
    assert_eq!(empty.json::<Value>(), json!([]));

    let unknown = app.server.get("/records/tweets").await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_and_health() {
    let app = create_test_app().await;
    assert_eq!(app.server.get("/health").await.text(), "OK");
    assert_eq!(app.server.get("/").await.status_code(), StatusCode::OK);
}
