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

use crate::domain::models::job::{Job, JobResult};
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// 负载无法编解码
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 可靠任务队列
///
/// 至少一次投递，每个任务带有一个结果槽
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队任务
    async fn enqueue(&self, job: Job) -> Result<Job, QueueError>;

    /// 出队任务，领取后任务进入执行中并加锁
    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Job>, QueueError>;

    /// 完成任务并写入结果
    async fn complete(&self, job_id: Uuid, result: &JobResult) -> Result<(), QueueError>;

    /// 失败任务并写入结果
    async fn fail(&self, job_id: Uuid, result: &JobResult) -> Result<(), QueueError>;

    /// 查询任务当前状态
    async fn status(&self, job_id: Uuid) -> Result<Option<Job>, QueueError>;

    /// 将锁已过期的任务重新投递
    async fn requeue_expired(&self) -> Result<u64, QueueError>;
}

/// 基于数据库表的任务队列
pub struct DatabaseJobQueue<R: JobRepository> {
    /// 任务仓库
    repository: Arc<R>,
    /// 领取任务时的锁定时长
    lock_duration: Duration,
}

impl<R: JobRepository> DatabaseJobQueue<R> {
    /// 创建新的任务队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 任务仓库
    /// * `lock_duration` - 领取任务时的锁定时长，超时后任务会被重新投递
    ///
    /// # 返回值
    ///
    /// 返回新的任务队列实例
    pub fn new(repository: Arc<R>, lock_duration: Duration) -> Self {
        Self {
            repository,
            lock_duration,
        }
    }
}

#[async_trait]
impl<R: JobRepository> JobQueue for DatabaseJobQueue<R> {
    async fn enqueue(&self, job: Job) -> Result<Job, QueueError> {
        let created = self.repository.create(&job).await?;
        Ok(created)
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Job>, QueueError> {
        let job = self
            .repository
            .acquire_next(worker_id, self.lock_duration)
            .await?;
        Ok(job)
    }

    async fn complete(&self, job_id: Uuid, result: &JobResult) -> Result<(), QueueError> {
        self.repository.mark_completed(job_id, result).await?;
        Ok(())
    }

    async fn fail(&self, job_id: Uuid, result: &JobResult) -> Result<(), QueueError> {
        self.repository.mark_failed(job_id, result).await?;
        Ok(())
    }

    async fn status(&self, job_id: Uuid) -> Result<Option<Job>, QueueError> {
        Ok(self.repository.find_by_id(job_id).await?)
    }

    async fn requeue_expired(&self) -> Result<u64, QueueError> {
        Ok(self.repository.requeue_expired().await?)
    }
}

#[async_trait]
impl<T: JobQueue + ?Sized> JobQueue for Arc<T> {
    async fn enqueue(&self, job: Job) -> Result<Job, QueueError> {
        (**self).enqueue(job).await
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Job>, QueueError> {
        (**self).dequeue(worker_id).await
    }

    async fn complete(&self, job_id: Uuid, result: &JobResult) -> Result<(), QueueError> {
        (**self).complete(job_id, result).await
    }

    async fn fail(&self, job_id: Uuid, result: &JobResult) -> Result<(), QueueError> {
        (**self).fail(job_id, result).await
    }

    async fn status(&self, job_id: Uuid) -> Result<Option<Job>, QueueError> {
        (**self).status(job_id).await
    }

    async fn requeue_expired(&self) -> Result<u64, QueueError> {
        (**self).requeue_expired().await
    }
}
