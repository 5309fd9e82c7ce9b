// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::job_request::CrawlJobRequestDto;
use crate::application::dto::job_response::{JobStatusDto, JobTicketDto};
use crate::domain::models::job::JobParameters;
use crate::domain::models::record::StoredRecord;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// 单次API请求的超时时间
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 提交失败的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// 超出准入配额（429）
    #[error("rate limited, retry later")]
    RateLimited,

    /// 服务端拒绝了请求
    #[error("submission rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 无法连接到服务端
    #[error("queue unreachable: {0}")]
    Unreachable(String),
}

/// 查询类请求的错误
#[derive(Error, Debug)]
pub enum ApiError {
    /// 连接、超时或响应解码失败
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 非2xx响应
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// 视图访问任务API的接口
#[async_trait]
pub trait JobApi: Send + Sync {
    /// 提交抓取任务
    async fn submit(
        &self,
        variant_name: &str,
        parameters: JobParameters,
    ) -> Result<JobTicketDto, SubmitFailure>;

    /// 查询任务状态
    async fn status(&self, job_id: Uuid) -> Result<JobStatusDto, ApiError>;

    /// 列出某类已存储的记录
    async fn list_records(&self, record_type: &str) -> Result<Vec<StoredRecord>, ApiError>;
}

/// 任务API客户端
///
/// 视图层只通过它访问服务端，不直接接触队列或存储
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// 创建客户端
    ///
    /// # 参数
    ///
    /// * `base_url` - 服务端地址，例如 `http://127.0.0.1:8000`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// 使用已有的HTTP客户端
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 提交抓取任务
    ///
    /// # 参数
    ///
    /// * `variant_name` - 抓取变体名称
    /// * `parameters` - 任务参数
    ///
    /// # 返回值
    ///
    /// * `Ok(JobTicketDto)` - 任务已入队
    /// * `Err(SubmitFailure)` - 被限流、被拒绝或无法连接
    pub async fn submit(
        &self,
        variant_name: &str,
        parameters: JobParameters,
    ) -> Result<JobTicketDto, SubmitFailure> {
        let request = CrawlJobRequestDto {
            variant_name: variant_name.to_string(),
            parameters,
        };

        let response = self
            .client
            .post(format!("{}/jobs/crawl", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SubmitFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SubmitFailure::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitFailure::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<JobTicketDto>()
            .await
            .map_err(|e| SubmitFailure::Unreachable(e.to_string()))
    }

    /// 查询任务状态
    pub async fn status(&self, job_id: Uuid) -> Result<JobStatusDto, ApiError> {
        let url = format!("{}/jobs/status/{}", self.base_url, job_id);
        self.get_json(&url).await
    }

    /// 列出某类已存储的记录，最新的在前
    pub async fn list_records(&self, record_type: &str) -> Result<Vec<StoredRecord>, ApiError> {
        let url = format!("{}/records/{}", self.base_url, record_type);
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl JobApi for ApiClient {
    async fn submit(
        &self,
        variant_name: &str,
        parameters: JobParameters,
    ) -> Result<JobTicketDto, SubmitFailure> {
        ApiClient::submit(self, variant_name, parameters).await
    }

    async fn status(&self, job_id: Uuid) -> Result<JobStatusDto, ApiError> {
        ApiClient::status(self, job_id).await
    }

    async fn list_records(&self, record_type: &str) -> Result<Vec<StoredRecord>, ApiError> {
        ApiClient::list_records(self, record_type).await
    }
}
