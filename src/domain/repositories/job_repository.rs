// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobResult};
use async_trait::async_trait;
use chrono::Duration;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 结果或参数无法序列化
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 任务仓库特质
///
/// 任务表即队列：入队、领取、终态写回都通过这里
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 领取下一个排队中的任务，并加上有时限的锁
    async fn acquire_next(
        &self,
        worker_id: Uuid,
        lock_duration: Duration,
    ) -> Result<Option<Job>, RepositoryError>;
    /// 标记任务已完成并写入结果
    async fn mark_completed(&self, id: Uuid, result: &JobResult) -> Result<(), RepositoryError>;
    /// 标记任务已失败并写入结果
    async fn mark_failed(&self, id: Uuid, result: &JobResult) -> Result<(), RepositoryError>;
    /// 将锁已过期的执行中任务放回队列
    async fn requeue_expired(&self) -> Result<u64, RepositoryError>;
}
