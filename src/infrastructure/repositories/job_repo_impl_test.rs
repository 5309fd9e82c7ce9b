// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::config::settings::Settings;
use crate::infrastructure::database::connection::connect_and_migrate;
use serde_json::json;

async fn repository() -> JobRepositoryImpl {
    let settings = Settings::for_tests("sqlite::memory:");
    let db = connect_and_migrate(&settings.database).await.unwrap();
    JobRepositoryImpl::new(Arc::new(db))
}

fn job(variant: &str) -> Job {
    let mut parameters = JobParameters::new();
    parameters.insert("search_term".to_string(), json!("rust"));
    Job::new(variant, parameters)
}

#[tokio::test]
async fn test_create_and_find_by_id() {
    let repo = repository().await;
    let job = job("wikipedia");

    repo.create(&job).await.unwrap();
    let found = repo.find_by_id(job.id).await.unwrap().unwrap();

    assert_eq!(found.id, job.id);
    assert_eq!(found.variant_name, "wikipedia");
    assert_eq!(found.state, JobState::Queued);
    assert_eq!(found.parameters.get("search_term"), Some(&json!("rust")));
    assert!(found.result.is_none());

    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_acquire_next_claims_each_job_once() {
    let repo = repository().await;
    let job = job("quotes");
    repo.create(&job).await.unwrap();

    let worker_id = Uuid::new_v4();
    let claimed = repo
        .acquire_next(worker_id, Duration::minutes(5))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(claimed.id, job.id);
    assert_eq!(claimed.state, JobState::Running);
    assert_eq!(claimed.attempt_count, 1);
    assert_eq!(claimed.lock_token, Some(worker_id));
    assert!(claimed.lock_expires_at.is_some());

    assert!(repo
        .acquire_next(Uuid::new_v4(), Duration::minutes(5))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_terminal_result_is_not_overwritten() {
    let repo = repository().await;
    let job = job("quotes");
    repo.create(&job).await.unwrap();
    repo.acquire_next(Uuid::new_v4(), Duration::minutes(5))
        .await
        .unwrap();

    repo.mark_completed(job.id, &JobResult::success(10, 4))
        .await
        .unwrap();
    repo.mark_failed(job.id, &JobResult::failure("late"))
        .await
        .unwrap();

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.state, JobState::Complete);
    assert_eq!(stored.result, Some(JobResult::success(10, 4)));
    assert!(stored.completed_at.is_some());
    assert!(stored.lock_token.is_none());
}

#[tokio::test]
async fn test_mark_failed_unknown_job() {
    let repo = repository().await;

    let result = repo
        .mark_failed(Uuid::new_v4(), &JobResult::failure("boom"))
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_requeue_expired_redelivers_job() {
    let repo = repository().await;
    let job = job("divar_listings");
    repo.create(&job).await.unwrap();

    repo.acquire_next(Uuid::new_v4(), Duration::seconds(-1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(repo.requeue_expired().await.unwrap(), 1);

    let requeued = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(requeued.state, JobState::Queued);
    assert!(requeued.lock_token.is_none());

    let redelivered = repo
        .acquire_next(Uuid::new_v4(), Duration::minutes(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(redelivered.attempt_count, 2);

    // A live lock is left alone
    assert_eq!(repo.requeue_expired().await.unwrap(), 0);
}
