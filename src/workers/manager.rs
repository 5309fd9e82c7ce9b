// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::WorkerSettings;
use crate::queue::job_queue::JobQueue;
use crate::queue::scheduler::RecoveryScheduler;
use crate::workers::dispatcher::JobDispatcher;
use crate::workers::job_worker::JobWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// 工作器管理器
///
/// 启动工作器池和恢复调度器，并在关闭时终止它们
pub struct WorkerManager {
    queue: Arc<dyn JobQueue>,
    dispatcher: Arc<JobDispatcher>,
    settings: WorkerSettings,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        dispatcher: Arc<JobDispatcher>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            settings,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms);

        for _ in 0..count {
            let worker = JobWorker::new(self.queue.clone(), self.dispatcher.clone(), poll_interval);
            let handle = tokio::spawn(async move {
                worker.run().await;
            });
            self.handles.push(handle);
        }

        info!("Started {} job workers", count);
    }

    /// 启动恢复调度器
    pub fn start_recovery(&mut self) {
        let period = Duration::from_secs(self.settings.recovery_interval_seconds.max(1));
        let scheduler = RecoveryScheduler::new(self.queue.clone(), period);
        self.handles.push(scheduler.start());
    }

    /// 按配置启动工作器池和恢复调度器
    pub fn start(&mut self) {
        self.start_workers(self.settings.count);
        self.start_recovery();
    }

    /// 正在运行的后台任务数量
    pub fn running(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// 终止所有后台任务
    ///
    /// 正在执行的任务会被中断，其锁过期后由恢复调度器重新投递
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in &self.handles {
            handle.abort();
        }
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
        info!("Workers shut down successfully");
    }
}
