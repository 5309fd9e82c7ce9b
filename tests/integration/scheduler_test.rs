// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app_with, test_settings};
use crawlq::domain::models::job::{Job, JobParameters, JobResult, JobState};
use crawlq::queue::job_queue::JobQueue;
use crawlq::queue::scheduler::RecoveryScheduler;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUOTES_PAGE: &str = r#"
<html><body>
  <div class="quote">
    <span class="text">"Simplicity is prerequisite for reliability."</span>
    <small class="author">Edsger W. Dijkstra</small>
    <a class="tag" href="/tag/simplicity/">simplicity</a>
  </div>
  <div class="quote">
    <span class="text">"Premature optimization is the root of all evil."</span>
    <small class="author">Donald Knuth</small>
  </div>
</body></html>
"#;

#[tokio::test]
async fn test_expired_job_is_redelivered_and_saved_once() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTES_PAGE))
        .mount(&upstream)
        .await;

    let mut settings = test_settings();
    settings.crawlers.quotes.base_url = upstream.uri();
    // Every claim expires immediately
    settings.workers.lock_duration_seconds = -1;
    let mut app = create_test_app_with(settings, false).await;
    let queue = app.context.queue.clone();

    let job = queue
        .enqueue(Job::new("quotes", JobParameters::new()))
        .await
        .unwrap();

    // A worker claims the job and dies before finishing it
    let claimed = queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);
    assert!(queue.dequeue(Uuid::new_v4()).await.unwrap().is_none());

    let scheduler = RecoveryScheduler::new(queue.clone(), Duration::from_secs(60));
    assert_eq!(scheduler.run_once().await.unwrap(), 1);

    let requeued = queue.status(job.id).await.unwrap().unwrap();
    assert_eq!(requeued.state, JobState::Queued);
    assert_eq!(requeued.attempt_count, 1);
    assert!(requeued.lock_token.is_none());

    // Run the redelivered job to completion
    let mut manager = app.context.worker_manager();
    manager.start_workers(1);
    app.worker_manager = Some(manager);

    let status = app.wait_for_terminal(&job.id.to_string()).await;
    assert_eq!(status["state"], "complete");

    let finished = queue.status(job.id).await.unwrap().unwrap();
    assert_eq!(finished.attempt_count, 2);
    assert_eq!(finished.result, Some(JobResult::success(2, 2)));

    // Terminal jobs are never requeued
    assert_eq!(scheduler.run_once().await.unwrap(), 0);

    app.shutdown().await;
}

#[tokio::test]
async fn test_live_locks_are_left_alone() {
    let app = create_test_app_with(test_settings(), false).await;
    let queue = app.context.queue.clone();

    let job = queue
        .enqueue(Job::new("quotes", JobParameters::new()))
        .await
        .unwrap();
    queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();

    let scheduler = RecoveryScheduler::new(queue.clone(), Duration::from_secs(60));
    assert_eq!(scheduler.run_once().await.unwrap(), 0);

    let running = queue.status(job.id).await.unwrap().unwrap();
    assert_eq!(running.state, JobState::Running);
}
