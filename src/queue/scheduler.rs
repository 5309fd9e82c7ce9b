// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::job_queue::{JobQueue, QueueError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// 恢复调度器
///
/// 定期把锁已过期的执行中任务放回队列。
/// 工作器崩溃或超时后，任务借此被重新投递。
pub struct RecoveryScheduler {
    /// 任务队列
    queue: Arc<dyn JobQueue>,
    /// 检查间隔
    period: Duration,
}

impl RecoveryScheduler {
    /// 创建新的恢复调度器实例
    ///
    /// # 参数
    ///
    /// * `queue` - 任务队列
    /// * `period` - 检查间隔
    pub fn new(queue: Arc<dyn JobQueue>, period: Duration) -> Self {
        Self { queue, period }
    }

    /// 执行一次恢复
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 重新入队的任务数
    /// * `Err(QueueError)` - 队列访问失败
    pub async fn run_once(&self) -> Result<u64, QueueError> {
        let count = self.queue.requeue_expired().await?;
        if count > 0 {
            info!("Requeued {} jobs with expired locks", count);
        }
        Ok(count)
    }

    /// 启动调度器后台任务
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if let Err(e) = self.run_once().await {
                    error!("Failed to requeue expired jobs: {}", e);
                }
            }
        })
    }
}
