// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::JobParameters;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 提交抓取任务的请求
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CrawlJobRequestDto {
    /// 抓取变体名称
    #[validate(length(min = 1, max = 64))]
    pub variant_name: String,
    /// 任务参数，缺省为空对象
    #[serde(default)]
    pub parameters: JobParameters,
}
