// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，提供对外部系统的抽象和封装，
/// 包括数据库、Redis、上游数据源和指标导出。
///
/// 包含的子模块：
/// - 缓存（cache）：Redis客户端，用于共享准入计数
/// - 抓取变体（crawlers）：各数据源的抓取与解析实现及注册表
/// - 数据库（database）：数据库连接和实体映射
/// - 可观测性（observability）：Prometheus指标
/// - 仓库实现（repositories）：领域仓库接口的具体实现
///
/// 基础设施层依赖于领域层的抽象接口，领域层不感知具体技术实现。
pub mod cache;
pub mod crawlers;
pub mod database;
pub mod observability;
pub mod repositories;
