// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{CandidateRecord, RecordType, StoredRecord};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// 持久化错误类型
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// 记录类型没有声明唯一性字段，属于编程错误，不应重试
    #[error("Record type {0} does not declare a uniqueness field")]
    MissingUniquenessField(&'static str),

    /// 唯一性字段不在声明字段中
    #[error("Uniqueness field {field} is not declared on record type {record_type}")]
    UnknownField {
        record_type: &'static str,
        field: &'static str,
    },

    /// 语句构造失败
    #[error("Query build error: {0}")]
    Query(String),

    /// 数据库错误，整批已回滚
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// 记录仓库特质
///
/// 只追加：冲突时忽略，从不更新已存在的记录
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// 批量写入候选记录，忽略唯一性字段冲突的行
    ///
    /// 返回实际新插入的行数
    async fn save(
        &self,
        records: &[CandidateRecord],
        record_type: &RecordType,
    ) -> Result<u64, PersistenceError>;

    /// 列出某类型的全部记录，最新插入的在前
    async fn list(&self, record_type: &RecordType) -> Result<Vec<StoredRecord>, PersistenceError>;
}
