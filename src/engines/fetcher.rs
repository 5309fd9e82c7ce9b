// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

/// 传输层错误
///
/// 只在抓取器内部使用，对外表现为 `None`
#[derive(Error, Debug)]
pub enum TransportError {
    /// 请求构造、连接、超时或读取失败
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 非2xx响应
    #[error("Unexpected status {0}")]
    Status(reqwest::StatusCode),

    /// 基础URL无效或无法追加路径段
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// 抓取器已关闭
    #[error("Fetcher is closed")]
    Closed,
}

/// 抓取器配置
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// 数据源基础URL，请求路径拼接在其后
    pub base_url: String,
    /// 同时在途的请求上限
    pub concurrency: usize,
    /// 连接与读取超时
    pub timeout: Duration,
    /// 请求使用的 User-Agent
    pub user_agent: String,
}

/// HTTP抓取器
///
/// 面向单个数据源，所有请求都要先从信号量获取许可，
/// 超出容量的调用会等待直到有许可释放。失败时记录告警并返回 `None`，不做重试。
pub struct Fetcher {
    client: reqwest::Client,
    base_url: Url,
    gate: Arc<Semaphore>,
}

impl Fetcher {
    /// 创建抓取器
    ///
    /// # 参数
    ///
    /// * `config` - 抓取器配置
    ///
    /// # 返回值
    ///
    /// * `Ok(Fetcher)` - 抓取器实例
    /// * `Err(TransportError)` - 基础URL无效或HTTP客户端构建失败
    pub fn new(config: FetcherConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            gate: Arc::new(Semaphore::new(config.concurrency.max(1))),
        })
    }

    /// 获取资源
    ///
    /// # 参数
    ///
    /// * `path` - 相对于基础URL的固定路径
    /// * `query` - 查询参数
    ///
    /// # 返回值
    ///
    /// 成功时返回响应体，任何传输层失败都返回 `None`
    pub async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Option<String> {
        let url = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        self.fetch_url(&url, query).await
    }

    /// 按路径段获取资源
    ///
    /// 每个路径段单独转义，段内的 `/`、`?`、`#` 和 `%` 不会改变请求目标
    ///
    /// # 参数
    ///
    /// * `segments` - 追加到基础URL之后的路径段
    /// * `query` - 查询参数
    pub async fn fetch_segments(&self, segments: &[&str], query: &[(&str, String)]) -> Option<String> {
        match self.segment_url(segments) {
            Ok(url) => self.fetch_url(url.as_str(), query).await,
            Err(e) => {
                warn!(segments = ?segments, error = %e, "Fetch failed");
                metrics::counter!("crawlq_fetch_failures_total").increment(1);
                None
            }
        }
    }

    /// 拼接转义后的路径段
    pub fn segment_url(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut target = self.base_url.clone();
        target
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(target)
    }

    async fn fetch_url(&self, url: &str, query: &[(&str, String)]) -> Option<String> {
        match self.try_fetch(url, query).await {
            Ok(body) => Some(body),
            Err(TransportError::Closed) => {
                debug!("Fetch skipped, fetcher closed: {}", url);
                None
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                metrics::counter!("crawlq_fetch_failures_total").increment(1);
                None
            }
        }
    }

    async fn try_fetch(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| TransportError::Closed)?;

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        Ok(response.text().await?)
    }

    /// 当前可用许可数
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// 关闭抓取器，之后的请求立即返回 `None`
    pub fn close(&self) {
        self.gate.close();
    }

    /// 是否已关闭
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
