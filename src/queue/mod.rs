// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供可靠任务队列和锁过期恢复调度
pub mod job_queue;
pub mod scheduler;
