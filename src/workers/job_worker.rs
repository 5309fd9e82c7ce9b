// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Job;
use crate::queue::job_queue::{JobQueue, QueueError};
use crate::workers::dispatcher::JobDispatcher;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// 任务工作器
///
/// 循环从队列领取任务，交给分发器执行并写回结果
pub struct JobWorker {
    /// 工作器ID，作为任务锁令牌
    worker_id: Uuid,
    queue: Arc<dyn JobQueue>,
    dispatcher: Arc<JobDispatcher>,
    /// 队列为空或出错时的等待间隔
    poll_interval: Duration,
}

impl JobWorker {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        dispatcher: Arc<JobDispatcher>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            worker_id: Uuid::new_v4(),
            queue,
            dispatcher,
            poll_interval,
        }
    }

    pub fn worker_id(&self) -> Uuid {
        self.worker_id
    }

    /// 运行工作循环
    pub async fn run(&self) {
        info!("Job worker {} started", self.worker_id);

        loop {
            match self.process_next().await {
                Ok(true) => {}
                Ok(false) => sleep(self.poll_interval).await,
                Err(e) => {
                    error!("Error processing job: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// 领取并处理一个任务
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 处理了一个任务
    /// * `Ok(false)` - 队列为空
    /// * `Err(QueueError)` - 队列访问失败
    pub async fn process_next(&self) -> Result<bool, QueueError> {
        let Some(job) = self.queue.dequeue(self.worker_id).await? else {
            return Ok(false);
        };

        self.process(job).await?;
        Ok(true)
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, variant = %job.variant_name, attempt = job.attempt_count))]
    async fn process(&self, job: Job) -> Result<(), QueueError> {
        info!("Processing job");
        let started = Instant::now();

        let result = self.dispatcher.dispatch(&job.payload()).await;

        metrics::histogram!("crawlq_job_duration_seconds").record(started.elapsed().as_secs_f64());

        if result.is_failure() {
            metrics::counter!("crawlq_jobs_failed_total").increment(1);
            self.queue.fail(job.id, &result).await
        } else {
            metrics::counter!("crawlq_jobs_completed_total").increment(1);
            self.queue.complete(job.id, &result).await
        }
    }
}
