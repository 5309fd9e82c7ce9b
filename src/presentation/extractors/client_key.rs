// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;

static FORWARDED_FOR: &str = "x-forwarded-for";

/// 未能识别客户端时使用的键
pub const ANONYMOUS: &str = "anonymous";

/// 准入限流使用的客户端标识
///
/// 优先取 `X-Forwarded-For` 的第一跳，其次取对端地址，都没有时为 `anonymous`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl ClientKey {
    fn from_parts(parts: &Parts) -> Self {
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        if let Some(hop) = forwarded {
            return ClientKey(hop.to_string());
        }

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return ClientKey(addr.ip().to_string());
        }

        ClientKey(ANONYMOUS.to_string())
    }
}

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientKey::from_parts(parts))
    }
}
