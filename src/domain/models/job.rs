// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 任务参数
///
/// 以名称为键的任意JSON值，由具体的抓取变体负责校验
pub type JobParameters = serde_json::Map<String, serde_json::Value>;

/// 抓取任务实体
///
/// 表示一次提交的抓取请求。任务由队列分配ID，
/// 在队列中经历 queued → running → complete/failed 的生命周期，
/// 终态时携带不可变的执行结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// 任务唯一标识符，由队列在入队时分配
    pub id: Uuid,
    /// 抓取变体名称，决定由哪个数据源处理
    pub variant_name: String,
    /// 任务参数
    pub parameters: JobParameters,
    /// 任务状态
    pub state: JobState,
    /// 执行结果，仅在终态时存在
    pub result: Option<JobResult>,
    /// 已投递次数，每次被工作器领取时加一
    pub attempt_count: i32,
    /// 锁定令牌，标识当前持有任务的工作器
    pub lock_token: Option<Uuid>,
    /// 锁定过期时间，过期后任务可被重新投递
    pub lock_expires_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 完成时间
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Queued → Running → Complete/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// 已入队，等待工作器领取
    #[default]
    Queued,
    /// 执行中
    Running,
    /// 已完成
    Complete,
    /// 已失败
    Failed,
}

impl JobState {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobState::Queued => write!(f, "queued"),
            JobState::Running => write!(f, "running"),
            JobState::Complete => write!(f, "complete"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobState::Queued),
            "running" => Ok(JobState::Running),
            "complete" => Ok(JobState::Complete),
            "failed" => Ok(JobState::Failed),
            _ => Err(()),
        }
    }
}

/// 任务执行结果
///
/// 成功时为 `{found, saved}`，失败时为 `{error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResult {
    /// 成功：抓取到的记录数与新写入的记录数
    Success { found: u64, saved: u64 },
    /// 失败：错误描述
    Failure { error: String },
}

impl JobResult {
    pub fn success(found: u64, saved: u64) -> Self {
        JobResult::Success { found, saved }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        JobResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobResult::Failure { .. })
    }

    /// 失败原因
    pub fn error(&self) -> Option<&str> {
        match self {
            JobResult::Failure { error } => Some(error),
            JobResult::Success { .. } => None,
        }
    }
}

/// 工作器接收的任务负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload {
    pub job_id: Uuid,
    pub variant_name: String,
    #[serde(default)]
    pub parameters: JobParameters,
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当任务状态转换不符合业务规则时发生
    #[error("Invalid state transition from {0}")]
    InvalidStateTransition(JobState),
}

impl Job {
    /// 创建一个新的排队任务
    ///
    /// # 参数
    ///
    /// * `variant_name` - 抓取变体名称
    /// * `parameters` - 任务参数
    ///
    /// # 返回值
    ///
    /// 返回处于Queued状态的新任务
    pub fn new(variant_name: impl Into<String>, parameters: JobParameters) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            variant_name: variant_name.into(),
            parameters,
            state: JobState::Queued,
            result: None,
            attempt_count: 0,
            lock_token: None,
            lock_expires_at: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    /// 启动任务
    ///
    /// 将任务状态从Queued变更为Running
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.state {
            JobState::Queued => {
                self.state = JobState::Running;
                self.started_at = Some(Utc::now().into());
                self.attempt_count += 1;
                Ok(self)
            }
            other => Err(DomainError::InvalidStateTransition(other)),
        }
    }

    /// 完成任务并写入结果
    ///
    /// 将任务状态从Running变更为Complete
    pub fn complete(self, result: JobResult) -> Result<Self, DomainError> {
        self.finish(JobState::Complete, result)
    }

    /// 标记任务失败并写入结果
    ///
    /// 将任务状态从Running变更为Failed
    pub fn fail(self, result: JobResult) -> Result<Self, DomainError> {
        self.finish(JobState::Failed, result)
    }

    fn finish(mut self, state: JobState, result: JobResult) -> Result<Self, DomainError> {
        match self.state {
            JobState::Running => {
                let now: DateTime<FixedOffset> = Utc::now().into();
                self.state = state;
                self.result = Some(result);
                self.completed_at = Some(now);
                self.updated_at = now;
                self.lock_token = None;
                self.lock_expires_at = None;
                Ok(self)
            }
            other => Err(DomainError::InvalidStateTransition(other)),
        }
    }

    /// 构造分发给工作器的负载
    pub fn payload(&self) -> JobPayload {
        JobPayload {
            job_id: self.id,
            variant_name: self.variant_name.clone(),
            parameters: self.parameters.clone(),
        }
    }
}
