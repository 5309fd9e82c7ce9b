// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::job_request::CrawlJobRequestDto;
use crate::application::dto::job_response::{JobStatusDto, JobTicketDto};
use crate::domain::models::job::Job;
use crate::domain::models::record::{RecordType, StoredRecord};
use crate::domain::repositories::record_repository::{PersistenceError, RecordRepository};
use crate::queue::job_queue::{JobQueue, QueueError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Job not found")]
    JobNotFound,
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// 任务编排用例
///
/// 受理任务提交、查询任务状态、列出已保存记录。
/// 准入限流在HTTP层完成，这里只处理已放行的请求。
pub struct JobOrchestrator {
    queue: Arc<dyn JobQueue>,
    records: Arc<dyn RecordRepository>,
}

impl JobOrchestrator {
    pub fn new(queue: Arc<dyn JobQueue>, records: Arc<dyn RecordRepository>) -> Self {
        Self { queue, records }
    }

    /// 提交任务
    ///
    /// 变体名称在执行时才会解析，未知名称的任务会以失败结果结束
    ///
    /// # 参数
    ///
    /// * `dto` - 提交请求
    ///
    /// # 返回值
    ///
    /// * `Ok(JobTicketDto)` - 任务已入队
    /// * `Err(OrchestratorError)` - 请求无效或队列不可用
    pub async fn submit(&self, dto: CrawlJobRequestDto) -> Result<JobTicketDto, OrchestratorError> {
        dto.validate()
            .map_err(|e| OrchestratorError::Validation(e.to_string()))?;

        let job = self
            .queue
            .enqueue(Job::new(dto.variant_name, dto.parameters))
            .await?;

        metrics::counter!("crawlq_jobs_submitted_total").increment(1);
        info!(job_id = %job.id, variant = %job.variant_name, "Job queued");

        Ok(JobTicketDto {
            job_id: job.id,
            state: job.state,
            message: format!("Crawl job for '{}' queued", job.variant_name),
        })
    }

    /// 查询任务状态
    pub async fn status(&self, job_id: Uuid) -> Result<JobStatusDto, OrchestratorError> {
        self.queue
            .status(job_id)
            .await?
            .map(JobStatusDto::from)
            .ok_or(OrchestratorError::JobNotFound)
    }

    /// 列出某类记录，最新插入的在前
    pub async fn list_records(
        &self,
        record_type: &str,
    ) -> Result<Vec<StoredRecord>, OrchestratorError> {
        let record_type = RecordType::by_name(record_type)
            .ok_or_else(|| OrchestratorError::UnknownRecordType(record_type.to_string()))?;
        Ok(self.records.list(record_type).await?)
    }
}
