// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{RateLimitBackend, RateLimitingSettings};
use crate::infrastructure::cache::redis_client::RedisClient;
use crate::presentation::extractors::client_key::ClientKey;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// 内存中保留的客户端键数量上限，超过后清理已恢复满额的键
const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Error, Debug)]
pub enum RateLimitError {
    /// 请求过多错误
    #[error("Too many requests")]
    TooManyRequests,

    /// 计数后端不可用
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// 配置无效
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),
}

/// 任务提交的准入限流器
///
/// 按客户端键在时间窗口内限制提交次数。
/// 内存后端使用GCRA算法，配额在窗口内均匀恢复；
/// Redis后端使用固定窗口计数，适合多实例共享。
pub enum AdmissionLimiter {
    /// 不限流
    Disabled,
    /// 进程内限流
    Memory(DefaultKeyedRateLimiter<String>),
    /// Redis固定窗口限流
    Redis {
        client: RedisClient,
        limit: u32,
        window_seconds: u64,
    },
}

impl AdmissionLimiter {
    /// 创建内存限流器
    ///
    /// 每 `window / limit` 恢复一次配额，空闲满一个窗口后可再连续提交 `limit` 次
    ///
    /// # 参数
    ///
    /// * `limit` - 每个窗口允许的次数
    /// * `window` - 窗口长度
    pub fn memory(limit: u32, window: Duration) -> Result<Self, RateLimitError> {
        let burst = NonZeroU32::new(limit)
            .ok_or_else(|| RateLimitError::InvalidConfig("limit must be positive".into()))?;
        let quota = Quota::with_period(window / burst.get())
            .ok_or_else(|| RateLimitError::InvalidConfig("window must be positive".into()))?
            .allow_burst(burst);
        Ok(AdmissionLimiter::Memory(RateLimiter::keyed(quota)))
    }

    /// 按配置创建限流器
    ///
    /// # 参数
    ///
    /// * `settings` - 准入限流配置
    /// * `redis_url` - Redis连接URL，仅Redis后端使用
    pub fn from_settings(
        settings: &RateLimitingSettings,
        redis_url: &str,
    ) -> Result<Self, RateLimitError> {
        if !settings.enabled {
            return Ok(AdmissionLimiter::Disabled);
        }

        match settings.backend {
            RateLimitBackend::Memory => Self::memory(
                settings.submissions_per_window,
                Duration::from_secs(settings.window_seconds),
            ),
            RateLimitBackend::Redis => {
                if settings.submissions_per_window == 0 || settings.window_seconds == 0 {
                    return Err(RateLimitError::InvalidConfig(
                        "limit and window must be positive".into(),
                    ));
                }
                let client = RedisClient::new(redis_url)
                    .map_err(|e| RateLimitError::InvalidConfig(e.to_string()))?;
                Ok(AdmissionLimiter::Redis {
                    client,
                    limit: settings.submissions_per_window,
                    window_seconds: settings.window_seconds,
                })
            }
        }
    }

    /// 检查客户端是否可以再提交一次
    ///
    /// # 参数
    ///
    /// * `client_key` - 客户端标识
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 放行，并已计入本次提交
    /// * `Err(RateLimitError)` - 超出配额或计数后端不可用
    pub async fn check(&self, client_key: &str) -> Result<(), RateLimitError> {
        match self {
            AdmissionLimiter::Disabled => Ok(()),
            AdmissionLimiter::Memory(limiter) => {
                if limiter.len() > MAX_TRACKED_CLIENTS {
                    limiter.retain_recent();
                }
                limiter
                    .check_key(&client_key.to_string())
                    .map_err(|_| RateLimitError::TooManyRequests)
            }
            AdmissionLimiter::Redis {
                client,
                limit,
                window_seconds,
            } => {
                let key = format!("crawlq:admission:{}", client_key);
                let count = client
                    .hit_window(&key, *window_seconds)
                    .await
                    .map_err(|e| RateLimitError::InternalError(format!("Redis failed: {}", e)))?;

                if count > i64::from(*limit) {
                    return Err(RateLimitError::TooManyRequests);
                }
                Ok(())
            }
        }
    }
}

/// 准入限流中间件
///
/// 只挂在任务提交路由上，被拒绝的请求不会入队
pub async fn admission_middleware(
    State(limiter): State<Arc<AdmissionLimiter>>,
    ClientKey(client_key): ClientKey,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check(&client_key).await {
        Ok(()) => next.run(request).await,
        Err(RateLimitError::TooManyRequests) => {
            warn!("Rate limit exceeded for client {}", client_key);
            metrics::counter!("crawlq_jobs_rejected_total").increment(1);
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "Too many requests" })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Admission check failed for client {}: {}", client_key, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Admission control is not available" })),
            )
                .into_response()
        }
    }
}
