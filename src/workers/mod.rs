// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 任务分发、出队循环和工作器池管理
pub mod dispatcher;
pub mod job_worker;
pub mod manager;
