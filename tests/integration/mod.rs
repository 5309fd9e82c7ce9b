// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod client_test;
pub mod health_check;
pub mod helpers;
pub mod job_api_test;
pub mod pipeline_test;
pub mod scheduler_test;
