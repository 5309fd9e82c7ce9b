// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app_with_worker, test_settings, TestApp};
use crawlq::client::api_client::{ApiClient, SubmitFailure};
use crawlq::client::poll_loop::{
    ClientEvent, PollConfig, PollFailure, PollLoop, PollOutcome, PollState,
};
use crawlq::domain::models::job::JobParameters;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 在真实端口上启动服务，返回其地址
async fn serve(app: &TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.context.router();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{}", addr)
}

fn fast_polling() -> PollConfig {
    PollConfig {
        poll_interval: Duration::from_millis(50),
        timeout: Duration::from_secs(10),
    }
}

#[tokio::test]
async fn test_poll_loop_reports_success_and_loads_records() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/web-search/tehran/laptop-notebook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "web_widgets": {
                "post_list": [
                    {"data": {"token": "AaBb", "title": "ThinkPad X1", "middle_description_text": "40,000,000 Toman"}},
                    {"data": {"title": "no token"}}
                ]
            }
        })))
        .mount(&upstream)
        .await;

    let mut settings = test_settings();
    settings.crawlers.divar.base_url = upstream.uri();
    let app = create_test_app_with_worker(settings).await;
    let base_url = serve(&app).await;

    let api = ApiClient::new(base_url).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = PollLoop::new(Arc::new(api.clone()), fast_polling(), tx)
        .spawn("divar_listings".to_string(), JobParameters::new())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        PollOutcome::Succeeded {
            found: 1,
            saved: 1,
            ..
        }
    ));

    let mut states = Vec::new();
    let mut loaded = None;
    while let Some(event) = rx.recv().await {
        match event {
            ClientEvent::StateChanged(state) => states.push(state),
            ClientEvent::RecordsLoaded { records, .. } => loaded = Some(records),
            _ => {}
        }
    }
    assert_eq!(states.first(), Some(&PollState::Submitting));
    assert_eq!(states.last(), Some(&PollState::Succeeded));

    let records = loaded.expect("records refreshed after success");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields["token"], json!("AaBb"));
    assert_eq!(records[0].fields["url"], json!("https://divar.ir/v/AaBb"));

    assert_eq!(api.list_records("divar_listings").await.unwrap().len(), 1);

    app.shutdown().await;
}

#[tokio::test]
async fn test_poll_loop_reports_job_failure() {
    let app = create_test_app_with_worker(test_settings()).await;
    let base_url = serve(&app).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let outcome = PollLoop::new(Arc::new(ApiClient::new(base_url).unwrap()), fast_polling(), tx)
        .run("bogus", JobParameters::new())
        .await;

    match &outcome {
        PollOutcome::Failed(PollFailure::JobFailed { error, .. }) => {
            assert!(error.contains("bogus"))
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(outcome.message().starts_with("job failed: "));

    app.shutdown().await;
}

#[tokio::test]
async fn test_client_sees_rate_limit() {
    let app = create_test_app_with_worker(test_settings()).await;
    let api = ApiClient::new(serve(&app).await).unwrap();

    for _ in 0..2 {
        api.submit("bogus", JobParameters::new()).await.unwrap();
    }
    let failure = api
        .submit("bogus", JobParameters::new())
        .await
        .unwrap_err();
    assert_eq!(failure, SubmitFailure::RateLimited);

    app.shutdown().await;
}

#[tokio::test]
async fn test_client_surfaces_rejection() {
    let app = create_test_app_with_worker(test_settings()).await;
    let api = ApiClient::new(serve(&app).await).unwrap();

    let failure = api.submit("", JobParameters::new()).await.unwrap_err();
    assert!(matches!(
        failure,
        SubmitFailure::Rejected { status: 422, .. }
    ));

    app.shutdown().await;
}
