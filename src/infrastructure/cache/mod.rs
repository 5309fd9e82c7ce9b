// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Redis客户端，用于跨实例共享的准入计数
pub mod redis_client;
