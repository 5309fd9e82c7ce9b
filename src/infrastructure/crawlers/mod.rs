// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 抓取变体实现
//!
//! 每个变体组合一个受并发闸门约束的 `Fetcher` 和纯函数解析器，
//! 通过 `registry` 按名称构造

pub mod divar;
pub mod quotes;
pub mod registry;
pub mod wikipedia;

use crate::config::settings::CrawlerSettings;
use crate::domain::crawler::ValidationError;
use crate::engines::fetcher::{Fetcher, FetcherConfig};
use std::time::Duration;

/// 为指定数据源构建抓取器
fn build_fetcher(
    variant: &'static str,
    base_url: &str,
    concurrency: usize,
    settings: &CrawlerSettings,
) -> Result<Fetcher, ValidationError> {
    Fetcher::new(FetcherConfig {
        base_url: base_url.to_string(),
        concurrency,
        timeout: Duration::from_secs(settings.timeout_seconds),
        user_agent: settings.user_agent.clone(),
    })
    .map_err(|e| ValidationError::Initialization {
        variant,
        reason: e.to_string(),
    })
}
