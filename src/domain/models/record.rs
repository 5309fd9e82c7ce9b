// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 候选记录
///
/// 解析器产出的未持久化数据，字段名到标量值的映射，
/// 形状随抓取变体而不同
pub type CandidateRecord = serde_json::Map<String, serde_json::Value>;

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 64位整数
    Integer,
    /// 文本
    Text,
}

/// 字段定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }
}

/// 记录类型
///
/// 描述一种持久化实体：固定的字段模式、存储表名，
/// 以及用于去重的唯一性字段。写入器拒绝没有唯一性字段的类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordType {
    /// 选择器名称，用于记录列表接口
    pub name: &'static str,
    /// 存储表名
    pub table: &'static str,
    /// 声明字段（不含自增主键和插入时间）
    pub fields: &'static [FieldSpec],
    /// 唯一性字段
    pub uniqueness_field: Option<&'static str>,
}

impl RecordType {
    /// 按名称查找字段定义
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 按名称查找内置记录类型
    pub fn by_name(name: &str) -> Option<&'static RecordType> {
        BUILTIN_RECORD_TYPES.iter().copied().find(|t| t.name == name)
    }

    /// 内置抓取变体产出的记录类型
    pub fn for_variant(variant_name: &str) -> Option<&'static RecordType> {
        match variant_name {
            "wikipedia" => Some(&WIKIPEDIA_ARTICLE),
            "quotes" => Some(&QUOTE),
            "divar_listings" => Some(&DIVAR_LISTING),
            _ => None,
        }
    }
}

pub static WIKIPEDIA_ARTICLE: RecordType = RecordType {
    name: "wikipedia_articles",
    table: "wikipedia_articles",
    fields: &[
        FieldSpec::integer("pageid"),
        FieldSpec::text("title"),
        FieldSpec::text("summary"),
        FieldSpec::text("url"),
        FieldSpec::text("full_text"),
    ],
    uniqueness_field: Some("pageid"),
};

pub static QUOTE: RecordType = RecordType {
    name: "quotes",
    table: "quotes",
    fields: &[
        FieldSpec::text("text"),
        FieldSpec::text("author"),
        FieldSpec::text("tags"),
    ],
    uniqueness_field: Some("text"),
};

pub static DIVAR_LISTING: RecordType = RecordType {
    name: "divar_listings",
    table: "divar_listings",
    fields: &[
        FieldSpec::text("token"),
        FieldSpec::text("title"),
        FieldSpec::text("price"),
        FieldSpec::text("url"),
    ],
    uniqueness_field: Some("token"),
};

/// 所有内置记录类型
pub static BUILTIN_RECORD_TYPES: &[&RecordType] = &[&WIKIPEDIA_ARTICLE, &QUOTE, &DIVAR_LISTING];

/// 已持久化记录
///
/// 带有合成主键的候选记录，写入后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// 合成主键
    pub id: i64,
    /// 插入时间
    pub created_at: Option<DateTime<FixedOffset>>,
    /// 声明字段
    #[serde(flatten)]
    pub fields: CandidateRecord,
}
