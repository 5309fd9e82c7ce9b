// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::observability::metrics as prometheus;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// 导出Prometheus文本格式指标
pub async fn metrics() -> Response {
    match prometheus::render() {
        Some(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
