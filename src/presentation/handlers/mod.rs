// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod job_handler;
pub mod metrics_handler;
pub mod record_handler;
