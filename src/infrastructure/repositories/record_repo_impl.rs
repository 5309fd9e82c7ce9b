// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::record::{
    CandidateRecord, FieldKind, FieldSpec, RecordType, StoredRecord,
};
use crate::domain::repositories::record_repository::{PersistenceError, RecordRepository};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Alias, OnConflict, Order, Query, SimpleExpr};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryResult, TransactionTrait, Value as DbValue,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ID_COLUMN: &str = "id";
const CREATED_AT_COLUMN: &str = "created_at";

/// 按字段模式规整后的单元格值
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Cell {
    Integer(i64),
    Text(String),
}

impl Cell {
    /// 按字段类型规整JSON值，无法规整时视为空
    fn coerce(value: Option<&Value>, kind: FieldKind) -> Option<Cell> {
        match (kind, value?) {
            (_, Value::Null) => None,
            (FieldKind::Integer, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Cell::Integer),
            (FieldKind::Integer, Value::String(s)) => s.trim().parse().ok().map(Cell::Integer),
            (FieldKind::Integer, _) => None,
            (FieldKind::Text, Value::String(s)) => Some(Cell::Text(s.clone())),
            (FieldKind::Text, other) => Some(Cell::Text(other.to_string())),
        }
    }

    fn into_db_value(cell: Option<Cell>, kind: FieldKind) -> DbValue {
        match (cell, kind) {
            (Some(Cell::Integer(n)), _) => n.into(),
            (Some(Cell::Text(s)), _) => s.into(),
            (None, FieldKind::Integer) => DbValue::BigInt(None),
            (None, FieldKind::Text) => DbValue::String(None),
        }
    }
}

/// 记录仓库实现
///
/// 每种记录类型对应一张表，写入时按唯一性字段忽略冲突，
/// 因此同一批记录重复投递不会产生重复行
#[derive(Clone)]
pub struct RecordRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl RecordRepositoryImpl {
    /// 创建新的记录仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的记录仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn uniqueness_field(record_type: &RecordType) -> Result<&FieldSpec, PersistenceError> {
        let field = record_type
            .uniqueness_field
            .filter(|f| !f.is_empty())
            .ok_or(PersistenceError::MissingUniquenessField(record_type.name))?;

        record_type
            .field(field)
            .ok_or(PersistenceError::UnknownField {
                record_type: record_type.name,
                field,
            })
    }

    /// 规整候选记录：丢弃唯一性值为空的记录，并折叠批内重复
    fn prepare_rows(
        records: &[CandidateRecord],
        record_type: &RecordType,
        unique: &FieldSpec,
    ) -> Vec<Vec<DbValue>> {
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let Some(key) = Cell::coerce(record.get(unique.name), unique.kind) else {
                warn!(
                    record_type = record_type.name,
                    field = unique.name,
                    "Skipping record without uniqueness value"
                );
                continue;
            };

            if !seen.insert(key) {
                continue;
            }

            let row = record_type
                .fields
                .iter()
                .map(|field| {
                    Cell::into_db_value(Cell::coerce(record.get(field.name), field.kind), field.kind)
                })
                .collect();
            rows.push(row);
        }

        rows
    }

    fn read_row(row: &QueryResult, record_type: &RecordType) -> Result<StoredRecord, PersistenceError> {
        let id = row.try_get::<i64>("", ID_COLUMN)?;

        let mut fields = CandidateRecord::new();
        for field in record_type.fields {
            let value = match field.kind {
                FieldKind::Integer => row
                    .try_get::<Option<i64>>("", field.name)?
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                FieldKind::Text => row
                    .try_get::<Option<String>>("", field.name)?
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            };
            fields.insert(field.name.to_string(), value);
        }

        let created_at = row
            .try_get::<Option<DateTime<FixedOffset>>>("", CREATED_AT_COLUMN)
            .ok()
            .flatten();

        Ok(StoredRecord {
            id,
            created_at,
            fields,
        })
    }
}

#[async_trait]
impl RecordRepository for RecordRepositoryImpl {
    async fn save(
        &self,
        records: &[CandidateRecord],
        record_type: &RecordType,
    ) -> Result<u64, PersistenceError> {
        if records.is_empty() {
            return Ok(0);
        }

        let unique = Self::uniqueness_field(record_type)?;
        let rows = Self::prepare_rows(records, record_type, unique);
        if rows.is_empty() {
            debug!(record_type = record_type.name, "No insertable records in batch");
            return Ok(0);
        }
        let batch_size = rows.len();

        let created_at: DateTime<FixedOffset> = Utc::now().into();
        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(record_type.table))
            .columns(
                record_type
                    .fields
                    .iter()
                    .map(|f| Alias::new(f.name))
                    .chain(std::iter::once(Alias::new(CREATED_AT_COLUMN))),
            );

        for row in rows {
            let values = row
                .into_iter()
                .chain(std::iter::once(DbValue::from(created_at)))
                .map(SimpleExpr::Value);
            insert
                .values(values)
                .map_err(|e| PersistenceError::Query(e.to_string()))?;
        }

        insert.on_conflict(
            OnConflict::column(Alias::new(unique.name))
                .do_nothing()
                .to_owned(),
        );

        let txn = self.db.begin().await?;
        let statement = txn.get_database_backend().build(&insert);

        match txn.execute(statement).await {
            Ok(result) => {
                txn.commit().await?;
                let inserted = result.rows_affected();
                metrics::counter!("crawlq_records_saved_total", "record_type" => record_type.name)
                    .increment(inserted);
                info!(
                    record_type = record_type.name,
                    batch = batch_size,
                    inserted,
                    "Records saved"
                );
                Ok(inserted)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn list(&self, record_type: &RecordType) -> Result<Vec<StoredRecord>, PersistenceError> {
        let mut select = Query::select();
        select
            .column(Alias::new(ID_COLUMN))
            .columns(record_type.fields.iter().map(|f| Alias::new(f.name)))
            .column(Alias::new(CREATED_AT_COLUMN))
            .from(Alias::new(record_type.table))
            .order_by(Alias::new(ID_COLUMN), Order::Desc);

        let statement = self.db.get_database_backend().build(&select);
        let rows = self.db.query_all(statement).await?;

        rows.iter()
            .map(|row| Self::read_row(row, record_type))
            .collect()
    }
}

#[cfg(test)]
#[path = "record_repo_impl_test.rs"]
mod tests;
