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

use crate::domain::models::job::{Job, JobParameters, JobResult, JobState};
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::infrastructure::database::entities::job as job_entity;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, LockBehavior, LockType},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的任务数据访问层，`jobs` 表同时承担可靠队列的角色
#[derive(Clone)]
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的任务仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn finish(
        &self,
        id: Uuid,
        state: JobState,
        result: &JobResult,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let outcome = job_entity::Entity::update_many()
            .col_expr(job_entity::Column::Status, Expr::value(state.to_string()))
            .col_expr(
                job_entity::Column::Result,
                Expr::value(Some(serde_json::to_value(result)?)),
            )
            .col_expr(job_entity::Column::CompletedAt, Expr::value(Some(now)))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .col_expr(job_entity::Column::LockToken, Expr::value(Option::<Uuid>::None))
            .col_expr(
                job_entity::Column::LockExpiresAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .filter(job_entity::Column::Id.eq(id))
            // A terminal result is never overwritten
            .filter(job_entity::Column::Status.is_in([
                JobState::Queued.to_string(),
                JobState::Running.to_string(),
            ]))
            .exec(self.db.as_ref())
            .await?;

        if outcome.rows_affected == 0 && self.find_by_id(id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

impl From<job_entity::Model> for Job {
    fn from(model: job_entity::Model) -> Self {
        let parameters = match model.parameters {
            Value::Object(map) => map,
            _ => JobParameters::new(),
        };

        Self {
            id: model.id,
            variant_name: model.variant_name,
            parameters,
            state: model.status.parse().unwrap_or_default(),
            result: model
                .result
                .and_then(|value| serde_json::from_value(value).ok()),
            attempt_count: model.attempt_count,
            lock_token: model.lock_token,
            lock_expires_at: model.lock_expires_at,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<&Job> for job_entity::ActiveModel {
    type Error = RepositoryError;

    fn try_from(job: &Job) -> Result<Self, Self::Error> {
        let result = match &job.result {
            Some(result) => Some(serde_json::to_value(result)?),
            None => None,
        };

        Ok(Self {
            id: Set(job.id),
            variant_name: Set(job.variant_name.clone()),
            parameters: Set(Value::Object(job.parameters.clone())),
            status: Set(job.state.to_string()),
            result: Set(result),
            attempt_count: Set(job.attempt_count),
            lock_token: Set(job.lock_token),
            lock_expires_at: Set(job.lock_expires_at),
            created_at: Set(job.created_at),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            updated_at: Set(job.updated_at),
        })
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let model = job_entity::ActiveModel::try_from(job)?;

        model.insert(self.db.as_ref()).await?;
        Ok(job.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn acquire_next(
        &self,
        worker_id: Uuid,
        lock_duration: Duration,
    ) -> Result<Option<Job>, RepositoryError> {
        let txn = self.db.begin().await?;

        let job = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(JobState::Queued.to_string()))
            .order_by_asc(job_entity::Column::CreatedAt)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .one(&txn)
            .await?;

        let Some(job) = job else {
            txn.commit().await?;
            return Ok(None);
        };

        let now = Utc::now();
        let attempts = job.attempt_count;
        let mut active: job_entity::ActiveModel = job.into();
        active.status = Set(JobState::Running.to_string());
        active.lock_token = Set(Some(worker_id));
        active.lock_expires_at = Set(Some((now + lock_duration).into()));
        active.started_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        active.attempt_count = Set(attempts + 1);

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(Some(updated.into()))
    }

    async fn mark_completed(&self, id: Uuid, result: &JobResult) -> Result<(), RepositoryError> {
        self.finish(id, JobState::Complete, result).await
    }

    async fn mark_failed(&self, id: Uuid, result: &JobResult) -> Result<(), RepositoryError> {
        self.finish(id, JobState::Failed, result).await
    }

    async fn requeue_expired(&self) -> Result<u64, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobState::Queued.to_string()),
            )
            .col_expr(job_entity::Column::LockToken, Expr::value(Option::<Uuid>::None))
            .col_expr(
                job_entity::Column::LockExpiresAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Status.eq(JobState::Running.to_string()))
            .filter(job_entity::Column::LockExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[path = "job_repo_impl_test.rs"]
mod tests;
