// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义数据库表对应的实体结构，使用SeaORM框架进行对象关系映射。
/// 记录表的模式由 `RecordType` 在运行时描述，不在此定义实体。
pub mod job;
