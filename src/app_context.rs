// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::job_orchestrator::JobOrchestrator;
use crate::config::settings::Settings;
use crate::domain::repositories::record_repository::RecordRepository;
use crate::infrastructure::crawlers::registry::VariantRegistry;
use crate::infrastructure::database::connection;
use crate::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use crate::infrastructure::repositories::record_repo_impl::RecordRepositoryImpl;
use crate::presentation::middleware::rate_limit_middleware::AdmissionLimiter;
use crate::presentation::routes;
use crate::queue::job_queue::{DatabaseJobQueue, JobQueue};
use crate::workers::dispatcher::JobDispatcher;
use crate::workers::manager::WorkerManager;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

/// 应用上下文
///
/// 在启动时构建一次，显式传入HTTP服务和工作器池，关闭时随进程释放
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub db: Arc<DatabaseConnection>,
    pub queue: Arc<dyn JobQueue>,
    pub records: Arc<dyn RecordRepository>,
    pub registry: Arc<VariantRegistry>,
    pub dispatcher: Arc<JobDispatcher>,
    pub orchestrator: Arc<JobOrchestrator>,
    pub limiter: Arc<AdmissionLimiter>,
}

impl AppContext {
    /// 连接数据库、执行迁移并组装所有组件
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let db = connection::connect_and_migrate(&settings.database).await?;
        info!("Database connection established");
        Self::from_parts(settings, db, VariantRegistry::builtin())
    }

    /// 基于已迁移的连接组装组件
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `db` - 已完成迁移的数据库连接
    /// * `registry` - 抓取变体注册表
    pub fn from_parts(
        settings: Settings,
        db: DatabaseConnection,
        registry: VariantRegistry,
    ) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);
        let db = Arc::new(db);

        let job_repo = Arc::new(JobRepositoryImpl::new(db.clone()));
        let lock_duration = chrono::Duration::seconds(settings.workers.lock_duration_seconds);
        let queue: Arc<dyn JobQueue> = Arc::new(DatabaseJobQueue::new(job_repo, lock_duration));
        let records: Arc<dyn RecordRepository> = Arc::new(RecordRepositoryImpl::new(db.clone()));

        let registry = Arc::new(registry);
        let dispatcher = Arc::new(JobDispatcher::new(
            registry.clone(),
            records.clone(),
            Arc::new(settings.crawlers.clone()),
        ));
        let orchestrator = Arc::new(JobOrchestrator::new(queue.clone(), records.clone()));

        let limiter = Arc::new(AdmissionLimiter::from_settings(
            &settings.rate_limiting,
            &settings.redis.url,
        )?);
        info!(
            "Admission limiter initialized (enabled: {}, backend: {:?})",
            settings.rate_limiting.enabled, settings.rate_limiting.backend
        );

        Ok(Self {
            settings,
            db,
            queue,
            records,
            registry,
            dispatcher,
            orchestrator,
            limiter,
        })
    }

    /// HTTP路由
    pub fn router(&self) -> Router {
        routes::routes(self.orchestrator.clone(), self.limiter.clone())
    }

    /// 创建尚未启动的工作器管理器
    pub fn worker_manager(&self) -> WorkerManager {
        WorkerManager::new(
            self.queue.clone(),
            self.dispatcher.clone(),
            self.settings.workers.clone(),
        )
    }
}
