// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::build_fetcher;
use crate::config::settings::CrawlerSettings;
use crate::domain::crawler::{CrawlVariant, ValidationError};
use crate::domain::models::record::{CandidateRecord, RecordType, WIKIPEDIA_ARTICLE};
use crate::engines::fetcher::Fetcher;
use crate::utils::markup::strip_markup;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const NAME: &str = "wikipedia";

const API_PATH: &str = "/w/api.php";

/// Wikipedia 抓取器
///
/// 两轮抓取：先调用搜索接口得到 `{pageid, title, summary}`，
/// 再用一次详情请求批量取回所有页面的正文与URL，按页面ID左合并。
/// 任一阶段为空时直接返回已得到的结果。
pub struct WikipediaCrawler {
    fetcher: Fetcher,
    search_term: String,
    search_limit: u32,
}

impl WikipediaCrawler {
    /// 创建Wikipedia抓取器
    ///
    /// # 参数
    ///
    /// * `search_term` - 搜索关键词
    /// * `settings` - 数据源配置
    ///
    /// # 返回值
    ///
    /// * `Ok(WikipediaCrawler)` - 抓取器实例
    /// * `Err(ValidationError)` - HTTP客户端初始化失败
    pub fn new(search_term: String, settings: &CrawlerSettings) -> Result<Self, ValidationError> {
        let fetcher = build_fetcher(
            NAME,
            &settings.wikipedia.base_url,
            settings.wikipedia.concurrency,
            settings,
        )?;
        Ok(Self {
            fetcher,
            search_term,
            search_limit: settings.wikipedia.search_limit,
        })
    }

    async fn fetch_search(&self) -> Option<String> {
        let params = [
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("list", "search".to_string()),
            ("srsearch", self.search_term.clone()),
            ("srlimit", self.search_limit.to_string()),
        ];
        self.fetcher.fetch(API_PATH, &params).await
    }

    async fn fetch_details(&self, page_ids: &[i64]) -> Option<String> {
        debug!("Fetching details for {} page ids", page_ids.len());
        let joined = page_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join("|");
        let params = [
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("pageids", joined),
            ("prop", "extracts|info".to_string()),
            ("inprop", "url".to_string()),
            ("explaintext", "1".to_string()),
        ];
        self.fetcher.fetch(API_PATH, &params).await
    }
}

/// 解析搜索接口响应
///
/// 遍历 `query.search[]`，摘要去除高亮标记。
/// 缺少标题、页面ID或清理后摘要为空的条目被丢弃。
pub fn parse_search_results(body: &str) -> Vec<CandidateRecord> {
    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to decode Wikipedia search response: {}", e);
            return Vec::new();
        }
    };

    let Some(results) = data.pointer("/query/search").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|item| {
            let pageid = item.get("pageid")?.as_i64().filter(|id| *id != 0)?;
            let title = item.get("title")?.as_str().filter(|t| !t.is_empty())?;
            let summary = strip_markup(item.get("snippet")?.as_str()?);
            if summary.is_empty() {
                return None;
            }

            let mut record = CandidateRecord::new();
            record.insert("pageid".to_string(), Value::from(pageid));
            record.insert("title".to_string(), Value::String(title.to_string()));
            record.insert("summary".to_string(), Value::String(summary));
            Some(record)
        })
        .collect()
}

/// 解析详情接口响应
///
/// `query.pages` 以页面ID字符串为键，结果以数字ID为键，
/// 每项包含 `full_text` 与 `url`，非数字键被跳过
pub fn parse_article_details(body: &str) -> HashMap<i64, CandidateRecord> {
    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to decode Wikipedia details response: {}", e);
            return HashMap::new();
        }
    };

    let Some(pages) = data.pointer("/query/pages").and_then(Value::as_object) else {
        return HashMap::new();
    };

    pages
        .iter()
        .filter_map(|(key, page)| {
            let page_id: i64 = key.parse().ok()?;
            let mut details = CandidateRecord::new();
            details.insert(
                "full_text".to_string(),
                page.get("extract").cloned().unwrap_or(Value::Null),
            );
            details.insert(
                "url".to_string(),
                page.get("fullurl").cloned().unwrap_or(Value::Null),
            );
            Some((page_id, details))
        })
        .collect()
}

/// 将详情左合并到搜索结果
///
/// 保持搜索结果顺序，详情中没有的记录保留原样
pub fn merge_details(
    search_results: Vec<CandidateRecord>,
    details: &HashMap<i64, CandidateRecord>,
) -> Vec<CandidateRecord> {
    search_results
        .into_iter()
        .map(|mut record| {
            let detail = record
                .get("pageid")
                .and_then(Value::as_i64)
                .and_then(|id| details.get(&id));
            if let Some(detail) = detail {
                for (key, value) in detail {
                    record.insert(key.clone(), value.clone());
                }
            }
            record
        })
        .collect()
}

#[async_trait]
impl CrawlVariant for WikipediaCrawler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn record_type(&self) -> &'static RecordType {
        &WIKIPEDIA_ARTICLE
    }

    async fn run(&self) -> Vec<CandidateRecord> {
        let Some(search_body) = self.fetch_search().await else {
            return Vec::new();
        };

        let search_results = parse_search_results(&search_body);
        info!(
            "Found {} Wikipedia articles for '{}'",
            search_results.len(),
            self.search_term
        );
        if search_results.is_empty() {
            return search_results;
        }

        let page_ids: Vec<i64> = search_results
            .iter()
            .filter_map(|r| r.get("pageid").and_then(Value::as_i64))
            .collect();
        if page_ids.is_empty() {
            return search_results;
        }

        let Some(details_body) = self.fetch_details(&page_ids).await else {
            return search_results;
        };

        let details = parse_article_details(&details_body);
        debug!("Parsed details for {} articles", details.len());
        merge_details(search_results, &details)
    }

    async fn close(&self) {
        self.fetcher.close();
    }
}

#[cfg(test)]
#[path = "wikipedia_test.rs"]
mod tests;
