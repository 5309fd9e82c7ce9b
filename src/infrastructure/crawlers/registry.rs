// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{divar, quotes, wikipedia};
use crate::config::settings::CrawlerSettings;
use crate::domain::crawler::{CrawlVariant, ValidationError};
use crate::domain::models::job::JobParameters;
use serde_json::Value;
use std::collections::HashMap;

/// 变体构造函数
///
/// 校验参数并构造一个带有独立并发闸门的变体实例
pub type VariantConstructor =
    fn(&JobParameters, &CrawlerSettings) -> Result<Box<dyn CrawlVariant>, ValidationError>;

/// 变体注册表
///
/// 将变体名称映射到构造函数
#[derive(Clone)]
pub struct VariantRegistry {
    constructors: HashMap<&'static str, VariantConstructor>,
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VariantRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// 注册全部内置变体
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(wikipedia::NAME, build_wikipedia);
        registry.register(quotes::NAME, build_quotes);
        registry.register(divar::NAME, build_divar);
        registry
    }

    /// 注册变体，同名时覆盖
    pub fn register(&mut self, name: &'static str, constructor: VariantConstructor) {
        self.constructors.insert(name, constructor);
    }

    /// 是否存在指定变体
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// 已注册的变体名称，按字母排序
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.constructors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// 按名称构造变体
    ///
    /// # 参数
    ///
    /// * `name` - 变体名称
    /// * `parameters` - 任务参数
    /// * `settings` - 数据源配置
    ///
    /// # 返回值
    ///
    /// * `Ok(Box<dyn CrawlVariant>)` - 变体实例
    /// * `Err(ValidationError)` - 名称未知或参数无效
    pub fn build(
        &self,
        name: &str,
        parameters: &JobParameters,
        settings: &CrawlerSettings,
    ) -> Result<Box<dyn CrawlVariant>, ValidationError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ValidationError::UnknownVariant(name.to_string()))?;
        constructor(parameters, settings)
    }
}

fn build_wikipedia(
    parameters: &JobParameters,
    settings: &CrawlerSettings,
) -> Result<Box<dyn CrawlVariant>, ValidationError> {
    let search_term = optional_string(parameters, wikipedia::NAME, "search_term")?.ok_or(
        ValidationError::MissingParameter {
            variant: wikipedia::NAME,
            parameter: "search_term",
        },
    )?;
    Ok(Box::new(wikipedia::WikipediaCrawler::new(search_term, settings)?))
}

fn build_quotes(
    parameters: &JobParameters,
    settings: &CrawlerSettings,
) -> Result<Box<dyn CrawlVariant>, ValidationError> {
    let page = optional_positive_int(parameters, quotes::NAME, "page")?.unwrap_or(1);
    Ok(Box::new(quotes::QuotesCrawler::new(page, settings)?))
}

fn build_divar(
    parameters: &JobParameters,
    settings: &CrawlerSettings,
) -> Result<Box<dyn CrawlVariant>, ValidationError> {
    let city = optional_slug(parameters, divar::NAME, "city")?
        .unwrap_or_else(|| divar::DEFAULT_CITY.to_string());
    let category = optional_slug(parameters, divar::NAME, "category")?
        .unwrap_or_else(|| divar::DEFAULT_CATEGORY.to_string());
    Ok(Box::new(divar::DivarCrawler::new(city, category, settings)?))
}

/// 读取可选的非空字符串参数，`null` 视为缺省
fn optional_string(
    parameters: &JobParameters,
    variant: &'static str,
    parameter: &'static str,
) -> Result<Option<String>, ValidationError> {
    match parameters.get(parameter) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Some(Value::String(_)) => Err(ValidationError::InvalidParameter {
            variant,
            parameter,
            reason: "must not be empty".to_string(),
        }),
        Some(other) => Err(ValidationError::InvalidParameter {
            variant,
            parameter,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

/// 读取可选的URL路径段参数，拒绝会改变请求目标的字符
fn optional_slug(
    parameters: &JobParameters,
    variant: &'static str,
    parameter: &'static str,
) -> Result<Option<String>, ValidationError> {
    let value = optional_string(parameters, variant, parameter)?;
    match value.as_deref() {
        Some("." | "..") => Err(ValidationError::InvalidParameter {
            variant,
            parameter,
            reason: "must not be a relative path segment".to_string(),
        }),
        Some(slug) if slug.contains(['/', '?', '#', '%', '\\']) => {
            Err(ValidationError::InvalidParameter {
                variant,
                parameter,
                reason: "must not contain '/', '?', '#', '%' or '\\'".to_string(),
            })
        }
        _ => Ok(value),
    }
}

/// 读取可选的正整数参数，接受数字或数字字符串
fn optional_positive_int(
    parameters: &JobParameters,
    variant: &'static str,
    parameter: &'static str,
) -> Result<Option<u32>, ValidationError> {
    let invalid = |value: &Value| ValidationError::InvalidParameter {
        variant,
        parameter,
        reason: format!("expected a positive integer, got {}", value),
    };

    let value = match parameters.get(parameter) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let number = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    number
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| invalid(value))
}
