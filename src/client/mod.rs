// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP API 客户端
pub mod api_client;
/// 提交并轮询任务状态的循环
pub mod poll_loop;
