// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::job_orchestrator::OrchestratorError;

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self.0.downcast_ref::<OrchestratorError>() {
            Some(OrchestratorError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string())
            }
            Some(OrchestratorError::JobNotFound) | Some(OrchestratorError::UnknownRecordType(_)) => {
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            Some(OrchestratorError::Queue(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Job queue is not available".to_string(),
            ),
            Some(OrchestratorError::Persistence(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Record storage is not available".to_string(),
            ),
            None => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
