// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::build_fetcher;
use crate::config::settings::CrawlerSettings;
use crate::domain::crawler::{CrawlVariant, ValidationError};
use crate::domain::models::record::{CandidateRecord, RecordType, QUOTE};
use crate::engines::fetcher::Fetcher;
use crate::utils::markup::collapse_whitespace;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

pub const NAME: &str = "quotes";

static QUOTE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("div.quote"));
static TEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("span.text"));
static AUTHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("small.author"));
static TAG_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a.tag"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// quotes.toscrape.com 抓取器
///
/// 单轮抓取：取一页HTML，按结构提取名言
pub struct QuotesCrawler {
    fetcher: Fetcher,
    page: u32,
}

impl QuotesCrawler {
    /// # 参数
    ///
    /// * `page` - 页码，从1开始
    /// * `settings` - 数据源配置
    pub fn new(page: u32, settings: &CrawlerSettings) -> Result<Self, ValidationError> {
        let fetcher = build_fetcher(
            NAME,
            &settings.quotes.base_url,
            settings.quotes.concurrency,
            settings,
        )?;
        Ok(Self { fetcher, page })
    }
}

fn element_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

/// 解析名言列表页
///
/// 缺少正文或作者的条目被丢弃，标签以逗号拼接
pub fn parse_quotes(html: &str) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for element in document.select(&QUOTE_SELECTOR) {
        let (Some(text), Some(author)) = (
            element_text(&element, &TEXT_SELECTOR),
            element_text(&element, &AUTHOR_SELECTOR),
        ) else {
            continue;
        };

        let tags: Vec<String> = element
            .select(&TAG_SELECTOR)
            .map(|tag| collapse_whitespace(&tag.text().collect::<String>()))
            .filter(|tag| !tag.is_empty())
            .collect();

        let mut record = CandidateRecord::new();
        record.insert("text".to_string(), Value::String(text));
        record.insert("author".to_string(), Value::String(author));
        record.insert("tags".to_string(), Value::String(tags.join(", ")));
        records.push(record);
    }

    debug!("Parsed {} quotes", records.len());
    records
}

#[async_trait]
impl CrawlVariant for QuotesCrawler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn record_type(&self) -> &'static RecordType {
        &QUOTE
    }

    async fn run(&self) -> Vec<CandidateRecord> {
        let path = format!("/page/{}/", self.page);
        match self.fetcher.fetch(&path, &[]).await {
            Some(body) => parse_quotes(&body),
            None => Vec::new(),
        }
    }

    async fn close(&self) {
        self.fetcher.close();
    }
}
