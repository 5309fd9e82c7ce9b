// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 任务（job）：一次抓取请求及其生命周期与结果
/// - 记录（record）：候选记录、记录类型与已持久化记录
pub mod job;
pub mod record;
