// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抓取变体抽象
pub mod variant;

pub use variant::{CrawlVariant, ValidationError};
