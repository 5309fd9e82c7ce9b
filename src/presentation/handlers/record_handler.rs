// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::job_orchestrator::JobOrchestrator;
use crate::presentation::errors::AppError;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use std::sync::Arc;

/// 列出某类已保存记录，最新的在前
pub async fn list_records(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
    Path(record_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let records = orchestrator.list_records(&record_type).await?;
    Ok(Json(records))
}
