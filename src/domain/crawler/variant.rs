// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{CandidateRecord, RecordType};
use async_trait::async_trait;
use thiserror::Error;

/// 任务参数校验错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown crawler_name: {0}")]
    UnknownVariant(String),
    #[error("Missing required parameter '{parameter}' for crawler {variant}")]
    MissingParameter {
        variant: &'static str,
        parameter: &'static str,
    },
    #[error("Invalid parameter '{parameter}' for crawler {variant}: {reason}")]
    InvalidParameter {
        variant: &'static str,
        parameter: &'static str,
        reason: String,
    },
    #[error("Failed to initialize crawler {variant}: {reason}")]
    Initialization {
        variant: &'static str,
        reason: String,
    },
}

/// 抓取变体特质
///
/// 数据源与解析策略的组合，对外只暴露 run/close。
/// 抓取和解析阶段的错误在内部吸收，只会减少产出的记录。
#[async_trait]
pub trait CrawlVariant: Send + Sync {
    /// 变体名称
    fn name(&self) -> &'static str;

    /// 产出记录对应的持久化类型
    fn record_type(&self) -> &'static RecordType;

    /// 执行抓取，返回候选记录
    async fn run(&self) -> Vec<CandidateRecord>;

    /// 释放底层连接资源
    async fn close(&self);
}
