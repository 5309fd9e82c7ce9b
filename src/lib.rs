// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用上下文
///
/// 启动时构建一次的组件集合，显式传入服务和工作器
pub mod app_context;

/// 应用程序模块
///
/// 包含任务编排用例和数据传输对象
pub mod application;

/// 客户端模块
///
/// 提交任务、轮询状态和浏览已存储记录
pub mod client;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含任务与记录实体、抓取变体契约和仓库接口
pub mod domain;

/// 引擎模块
///
/// 带并发上限的HTTP抓取器
pub mod engines;

/// 基础设施模块
///
/// 提供数据库、缓存、指标和各数据源抓取变体的实现
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和中间件
pub mod presentation;

/// 队列模块
///
/// 实现任务队列和恢复调度
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台任务处理和工作器管理
pub mod workers;
