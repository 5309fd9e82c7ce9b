// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// - 任务仓库（job_repository）：任务表即可靠队列
/// - 记录仓库（record_repository）：按唯一性字段去重的只追加写入
pub mod job_repository;
pub mod record_repository;
