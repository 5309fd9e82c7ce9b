// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 抓取变体（crawler）：数据源的统一 run/close 契约
/// - 领域模型（models）：任务与记录
/// - 仓库接口（repositories）：任务队列与记录写入的持久化抽象
///
/// 领域层不依赖于任何外部实现。
pub mod crawler;
pub mod models;
pub mod repositories;
