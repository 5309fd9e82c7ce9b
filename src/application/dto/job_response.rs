// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobResult, JobState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 任务受理回执
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobTicketDto {
    /// 队列分配的任务ID
    pub job_id: Uuid,
    /// 受理时总是 `queued`
    pub state: JobState,
    pub message: String,
}

/// 任务状态视图
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobStatusDto {
    pub job_id: Uuid,
    pub state: JobState,
    /// 仅在终态时存在
    pub result: Option<JobResult>,
}

impl From<Job> for JobStatusDto {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            state: job.state,
            result: job.result,
        }
    }
}
