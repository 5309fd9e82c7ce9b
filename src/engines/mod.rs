// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 受并发闸门约束的HTTP抓取器
pub mod fetcher;
