// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::job_request::CrawlJobRequestDto;
use crate::application::use_cases::job_orchestrator::{JobOrchestrator, OrchestratorError};
use crate::presentation::errors::AppError;
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

/// 提交抓取任务
///
/// 受理后返回 202 和任务回执
pub async fn submit_job(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
    Json(payload): Json<CrawlJobRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = orchestrator.submit(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(ticket)))
}

/// 查询任务状态
///
/// 未知ID或无法解析的ID都返回 404
pub async fn get_job_status(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job_id = Uuid::parse_str(&job_id).map_err(|_| OrchestratorError::JobNotFound)?;
    let status = orchestrator.status(job_id).await?;
    Ok(Json(status))
}
