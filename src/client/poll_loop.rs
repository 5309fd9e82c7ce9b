// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::job_response::JobStatusDto;
use crate::client::api_client::{JobApi, SubmitFailure};
use crate::domain::models::job::{JobParameters, JobResult, JobState};
use crate::domain::models::record::{RecordType, StoredRecord};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// 默认等待上限
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// 轮询配置
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// 轮询状态机
///
/// Idle → Submitting → Polling → Succeeded | Failed | TimedOut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Submitting,
    Polling { job_id: Uuid },
    Succeeded,
    Failed,
    TimedOut,
}

/// 失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// 提交阶段失败，任务没有入队
    #[error(transparent)]
    Submit(#[from] SubmitFailure),

    /// 任务在服务端执行失败
    #[error("job failed: {error}")]
    JobFailed { job_id: Uuid, error: String },
}

/// 轮询的终态结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 任务完成
    Succeeded { job_id: Uuid, found: u64, saved: u64 },
    /// 提交失败或任务失败
    Failed(PollFailure),
    /// 超过等待上限仍未结束，任务本身不会被取消
    TimedOut { job_id: Uuid },
}

impl PollOutcome {
    /// 对应的终态
    pub fn state(&self) -> PollState {
        match self {
            PollOutcome::Succeeded { .. } => PollState::Succeeded,
            PollOutcome::Failed(_) => PollState::Failed,
            PollOutcome::TimedOut { .. } => PollState::TimedOut,
        }
    }

    /// 面向用户的提示文本
    pub fn message(&self) -> String {
        match self {
            PollOutcome::Succeeded { found, saved, .. } => {
                format!("job complete: found {}, saved {} new", found, saved)
            }
            PollOutcome::Failed(PollFailure::Submit(SubmitFailure::Unreachable(_))) => {
                "queue unreachable".to_string()
            }
            PollOutcome::Failed(PollFailure::Submit(SubmitFailure::RateLimited)) => {
                "rate limited, retry later".to_string()
            }
            PollOutcome::Failed(PollFailure::Submit(SubmitFailure::Rejected { status, body })) => {
                format!("submission rejected ({}): {}", status, body)
            }
            PollOutcome::Failed(PollFailure::JobFailed { error, .. }) => {
                format!("job failed: {}", error)
            }
            PollOutcome::TimedOut { .. } => "job timed out".to_string(),
        }
    }
}

/// 发往视图的事件
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// 状态机迁移
    StateChanged(PollState),
    /// 一次成功的状态查询
    Status(JobStatusDto),
    /// 终态结果
    Finished(PollOutcome),
    /// 成功后刷新的已存储记录
    RecordsLoaded {
        record_type: String,
        records: Vec<StoredRecord>,
    },
}

/// 客户端轮询循环
///
/// 提交任务后按间隔查询状态，直到终态或超时。
/// 只通过事件通道与视图通信，视图关闭后事件被丢弃。
pub struct PollLoop {
    api: Arc<dyn JobApi>,
    config: PollConfig,
    events: UnboundedSender<ClientEvent>,
}

impl PollLoop {
    pub fn new(api: Arc<dyn JobApi>, config: PollConfig, events: UnboundedSender<ClientEvent>) -> Self {
        Self {
            api,
            config,
            events,
        }
    }

    /// 在独立的Tokio任务中运行
    ///
    /// # 参数
    ///
    /// * `variant_name` - 抓取变体名称
    /// * `parameters` - 任务参数
    pub fn spawn(self, variant_name: String, parameters: JobParameters) -> JoinHandle<PollOutcome> {
        tokio::spawn(async move { self.run(&variant_name, parameters).await })
    }

    /// 提交并等待任务结束
    ///
    /// # 返回值
    ///
    /// 终态结果，同时作为 `Finished` 事件发出
    pub async fn run(&self, variant_name: &str, parameters: JobParameters) -> PollOutcome {
        self.emit(ClientEvent::StateChanged(PollState::Submitting));

        let ticket = match self.api.submit(variant_name, parameters).await {
            Ok(ticket) => ticket,
            Err(failure) => {
                warn!("Submission of {} failed: {}", variant_name, failure);
                return self.finish(PollOutcome::Failed(failure.into()));
            }
        };

        let job_id = ticket.job_id;
        info!("Job {} accepted, polling for result", job_id);
        self.emit(ClientEvent::StateChanged(PollState::Polling { job_id }));

        let deadline = Instant::now() + self.config.timeout;
        loop {
            if Instant::now() >= deadline {
                return self.finish(PollOutcome::TimedOut { job_id });
            }

            let polled = tokio::time::timeout_at(deadline, self.api.status(job_id)).await;
            let Ok(polled) = polled else {
                warn!("Status poll for job {} still pending at deadline", job_id);
                return self.finish(PollOutcome::TimedOut { job_id });
            };

            match polled {
                Ok(status) => {
                    let outcome = terminal_outcome(&status);
                    self.emit(ClientEvent::Status(status));
                    if let Some(outcome) = outcome {
                        let succeeded = matches!(outcome, PollOutcome::Succeeded { .. });
                        let outcome = self.finish(outcome);
                        if succeeded {
                            self.refresh_records(variant_name).await;
                        }
                        return outcome;
                    }
                }
                Err(e) => warn!("Status poll for job {} failed: {}", job_id, e),
            }

            let next = (Instant::now() + self.config.poll_interval).min(deadline);
            tokio::time::sleep_until(next).await;
        }
    }

    async fn refresh_records(&self, variant_name: &str) {
        let Some(record_type) = RecordType::for_variant(variant_name) else {
            debug!("No record type known for variant {}", variant_name);
            return;
        };

        match self.api.list_records(record_type.name).await {
            Ok(records) => self.emit(ClientEvent::RecordsLoaded {
                record_type: record_type.name.to_string(),
                records,
            }),
            Err(e) => warn!("Failed to load {} records: {}", record_type.name, e),
        }
    }

    fn finish(&self, outcome: PollOutcome) -> PollOutcome {
        self.emit(ClientEvent::StateChanged(outcome.state()));
        self.emit(ClientEvent::Finished(outcome.clone()));
        outcome
    }

    fn emit(&self, event: ClientEvent) {
        // The view may have gone away
        let _ = self.events.send(event);
    }
}

fn terminal_outcome(status: &JobStatusDto) -> Option<PollOutcome> {
    let job_id = status.job_id;
    match (status.state, &status.result) {
        (JobState::Complete, Some(JobResult::Success { found, saved })) => {
            Some(PollOutcome::Succeeded {
                job_id,
                found: *found,
                saved: *saved,
            })
        }
        (JobState::Complete, None) => Some(PollOutcome::Succeeded {
            job_id,
            found: 0,
            saved: 0,
        }),
        (JobState::Complete | JobState::Failed, Some(JobResult::Failure { error })) => {
            Some(PollOutcome::Failed(PollFailure::JobFailed {
                job_id,
                error: error.clone(),
            }))
        }
        (JobState::Failed, _) => Some(PollOutcome::Failed(PollFailure::JobFailed {
            job_id,
            error: "unknown error".to_string(),
        })),
        (JobState::Queued | JobState::Running, _) => None,
    }
}

#[cfg(test)]
#[path = "poll_loop_test.rs"]
mod tests;
