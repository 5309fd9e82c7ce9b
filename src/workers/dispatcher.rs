// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlerSettings;
use crate::domain::crawler::CrawlVariant;
use crate::domain::models::job::{JobPayload, JobResult};
use crate::domain::repositories::record_repository::{PersistenceError, RecordRepository};
use crate::infrastructure::crawlers::registry::VariantRegistry;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// 任务分发器
///
/// 解码任务负载，经注册表构造变体并执行，保存记录后返回结果。
/// 任何失败（包括变体内部panic）都转换为 `JobResult::Failure`，
/// 变体无论成功与否都会被关闭。
pub struct JobDispatcher {
    registry: Arc<VariantRegistry>,
    records: Arc<dyn RecordRepository>,
    settings: Arc<CrawlerSettings>,
}

impl JobDispatcher {
    /// 创建任务分发器
    ///
    /// # 参数
    ///
    /// * `registry` - 变体注册表
    /// * `records` - 记录仓库
    /// * `settings` - 数据源配置
    pub fn new(
        registry: Arc<VariantRegistry>,
        records: Arc<dyn RecordRepository>,
        settings: Arc<CrawlerSettings>,
    ) -> Self {
        Self {
            registry,
            records,
            settings,
        }
    }

    /// 执行一个任务
    ///
    /// # 参数
    ///
    /// * `payload` - 任务负载
    ///
    /// # 返回值
    ///
    /// 成功时为 `{found, saved}`，失败时为 `{error}`
    #[instrument(skip(self, payload), fields(job_id = %payload.job_id, variant = %payload.variant_name))]
    pub async fn dispatch(&self, payload: &JobPayload) -> JobResult {
        let variant =
            match self
                .registry
                .build(&payload.variant_name, &payload.parameters, &self.settings)
            {
                Ok(variant) => variant,
                Err(e) => {
                    warn!("Rejected job: {}", e);
                    return JobResult::failure(e.to_string());
                }
            };

        let outcome = AssertUnwindSafe(self.execute(variant.as_ref()))
            .catch_unwind()
            .await;

        if let Err(panic) = AssertUnwindSafe(variant.close()).catch_unwind().await {
            error!("Crawler close panicked: {}", panic_message(panic.as_ref()));
        }

        match outcome {
            Ok(Ok((found, saved))) => {
                info!(found, saved, "Job finished");
                JobResult::success(found, saved)
            }
            Ok(Err(e)) => {
                error!("Failed to save records: {}", e);
                JobResult::failure(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Crawler panicked: {}", message);
                JobResult::failure(format!("Crawler panicked: {}", message))
            }
        }
    }

    async fn execute(&self, variant: &dyn CrawlVariant) -> Result<(u64, u64), PersistenceError> {
        let records = variant.run().await;
        let found = records.len() as u64;
        if records.is_empty() {
            return Ok((0, 0));
        }

        let saved = self.records.save(&records, variant.record_type()).await?;
        Ok((found, saved))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
