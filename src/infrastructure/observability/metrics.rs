// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// 初始化指标系统
///
/// 安装Prometheus记录器并注册任务管道的各类指标。
/// 同一进程中只会安装一次，之后的调用返回已有的句柄。
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Some(handle.clone());
    }

    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            return None;
        }
    };

    describe_counter!(
        "crawlq_jobs_submitted_total",
        "Total number of crawl jobs accepted into the queue"
    );
    describe_counter!(
        "crawlq_jobs_rejected_total",
        "Total number of submissions rejected by admission limiting"
    );
    describe_counter!(
        "crawlq_jobs_completed_total",
        "Total number of crawl jobs completed"
    );
    describe_counter!(
        "crawlq_jobs_failed_total",
        "Total number of crawl jobs failed"
    );
    describe_counter!(
        "crawlq_fetch_failures_total",
        "Total number of upstream fetches that failed"
    );
    describe_counter!(
        "crawlq_records_saved_total",
        "Total number of records newly inserted"
    );
    describe_histogram!(
        "crawlq_job_duration_seconds",
        "Duration of crawl jobs in seconds"
    );

    Some(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// 渲染Prometheus文本格式的指标
///
/// 记录器未安装时返回 `None`
pub fn render() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(PrometheusHandle::render)
}
