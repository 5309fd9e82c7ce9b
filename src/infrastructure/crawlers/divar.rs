// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::build_fetcher;
use crate::config::settings::CrawlerSettings;
use crate::domain::crawler::{CrawlVariant, ValidationError};
use crate::domain::models::record::{CandidateRecord, RecordType, DIVAR_LISTING};
use crate::engines::fetcher::Fetcher;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

pub const NAME: &str = "divar_listings";
pub const DEFAULT_CITY: &str = "tehran";
pub const DEFAULT_CATEGORY: &str = "laptop-notebook";

const LISTING_URL_PREFIX: &str = "https://divar.ir/v/";

/// Divar 分类广告抓取器
///
/// 单轮抓取：调用搜索接口，按固定路径遍历JSON
pub struct DivarCrawler {
    fetcher: Fetcher,
    city: String,
    category: String,
}

impl DivarCrawler {
    pub fn new(
        city: String,
        category: String,
        settings: &CrawlerSettings,
    ) -> Result<Self, ValidationError> {
        let fetcher = build_fetcher(
            NAME,
            &settings.divar.base_url,
            settings.divar.concurrency,
            settings,
        )?;
        Ok(Self {
            fetcher,
            city,
            category,
        })
    }
}

/// 解析搜索接口响应
///
/// 遍历 `web_widgets.post_list[].data`，缺少 `token` 或 `title` 的条目被丢弃
pub fn parse_listings(body: &str) -> Vec<CandidateRecord> {
    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to decode Divar response: {}", e);
            return Vec::new();
        }
    };

    let Some(posts) = data
        .pointer("/web_widgets/post_list")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let records: Vec<CandidateRecord> = posts
        .iter()
        .filter_map(|post| {
            let item = post.get("data")?;
            let token = item.get("token")?.as_str().filter(|t| !t.is_empty())?;
            let title = item.get("title")?.as_str().filter(|t| !t.is_empty())?;
            let price = item
                .get("middle_description_text")
                .and_then(Value::as_str)
                .map(|p| Value::String(p.to_string()))
                .unwrap_or(Value::Null);

            let mut record = CandidateRecord::new();
            record.insert("token".to_string(), Value::String(token.to_string()));
            record.insert("title".to_string(), Value::String(title.to_string()));
            record.insert("price".to_string(), price);
            record.insert(
                "url".to_string(),
                Value::String(format!("{}{}", LISTING_URL_PREFIX, token)),
            );
            Some(record)
        })
        .collect();

    debug!("Parsed {} Divar listings", records.len());
    records
}

#[async_trait]
impl CrawlVariant for DivarCrawler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn record_type(&self) -> &'static RecordType {
        &DIVAR_LISTING
    }

    async fn run(&self) -> Vec<CandidateRecord> {
        let segments = ["v8", "web-search", self.city.as_str(), self.category.as_str()];
        match self.fetcher.fetch_segments(&segments, &[]).await {
            Some(body) => parse_listings(&body),
            None => Vec::new(),
        }
    }

    async fn close(&self) {
        self.fetcher.close();
    }
}
