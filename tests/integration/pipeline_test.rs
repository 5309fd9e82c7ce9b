// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app_with_worker, test_settings};
use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_wikipedia() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "search": [
                    {"title": "Tokio", "pageid": 101,
                     "snippet": "<span class=\"searchmatch\">Tokio</span> is a runtime"},
                    {"title": "Axum", "pageid": 102, "snippet": "Axum is a web framework"}
                ]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts|info"))
        .and(query_param("pageids", "101|102"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pages": {
                    "101": {"extract": "Tokio full text", "fullurl": "https://example.org/Tokio"}
                }
            }
        })))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_wikipedia_job_runs_end_to_end() {
    let upstream = mock_wikipedia().await;
    let mut settings = test_settings();
    settings.crawlers.wikipedia.base_url = upstream.uri();
    let app = create_test_app_with_worker(settings).await;

    let ticket: Value = app
        .server
        .post("/jobs/crawl")
        .json(&json!({"variant_name": "wikipedia", "parameters": {"search_term": "tokio"}}))
        .await
        .json();
    let job_id = ticket["job_id"].as_str().unwrap().to_string();

    let status = app.wait_for_terminal(&job_id).await;
    assert_eq!(status["state"], json!("complete"));
    assert_eq!(status["result"], json!({"found": 2, "saved": 2}));

    let records: Value = app.server.get("/records/wikipedia_articles").await.json();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    // Newest first
    assert_eq!(records[0]["pageid"], json!(102));
    assert_eq!(records[0]["summary"], json!("Axum is a web framework"));
    assert_eq!(records[0]["url"], Value::Null);
    assert_eq!(records[1]["pageid"], json!(101));
    assert_eq!(records[1]["summary"], json!("Tokio is a runtime"));
    assert_eq!(records[1]["url"], json!("https://example.org/Tokio"));
    assert_eq!(records[1]["full_text"], json!("Tokio full text"));

    // Same search again: found again, nothing new saved
    let ticket: Value = app
        .server
        .post("/jobs/crawl")
        .json(&json!({"variant_name": "wikipedia", "parameters": {"search_term": "tokio"}}))
        .await
        .json();
    let status = app
        .wait_for_terminal(ticket["job_id"].as_str().unwrap())
        .await;
    assert_eq!(status["result"], json!({"found": 2, "saved": 0}));

    let records: Value = app.server.get("/records/wikipedia_articles").await.json();
    assert_eq!(records.as_array().unwrap().len(), 2);

    app.shutdown().await;
}

#[tokio::test]
async fn test_unknown_variant_fails_with_its_name() {
    let app = create_test_app_with_worker(test_settings()).await;

    let response = app
        .server
        .post("/jobs/crawl")
        .json(&json!({"variant_name": "bogus"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let ticket: Value = response.json();

    let status = app
        .wait_for_terminal(ticket["job_id"].as_str().unwrap())
        .await;
    assert_eq!(status["state"], json!("failed"));
    assert!(status["result"]["error"].as_str().unwrap().contains("bogus"));

    app.shutdown().await;
}

#[tokio::test]
async fn test_missing_parameter_fails_the_job() {
    let app = create_test_app_with_worker(test_settings()).await;

    let ticket: Value = app
        .server
        .post("/jobs/crawl")
        .json(&json!({"variant_name": "wikipedia", "parameters": {}}))
        .await
        .json();

    let status = app
        .wait_for_terminal(ticket["job_id"].as_str().unwrap())
        .await;
    assert_eq!(status["state"], json!("failed"));
    assert!(status["result"]["error"]
        .as_str()
        .unwrap()
        .contains("search_term"));

    app.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_source_completes_with_nothing_found() {
    let mut settings = test_settings();
    settings.crawlers.quotes.base_url = "http://127.0.0.1:1".to_string();
    let app = create_test_app_with_worker(settings).await;

    let ticket: Value = app
        .server
        .post("/jobs/crawl")
        .json(&json!({"variant_name": "quotes"}))
        .await
        .json();

    let status = app
        .wait_for_terminal(ticket["job_id"].as_str().unwrap())
        .await;
    assert_eq!(status["state"], json!("complete"));
    assert_eq!(status["result"], json!({"found": 0, "saved": 0}));

    app.shutdown().await;
}
