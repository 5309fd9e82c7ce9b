// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;

/// Redis客户端
///
/// 多实例部署时为准入限流提供共享计数
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// 只解析URL，连接在首次使用时建立
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(anyhow::Error)` - URL无效
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 在固定窗口内计数一次
    ///
    /// 窗口键带过期时间创建后再自增，两步在同一个事务中执行，
    /// 计数键总会在窗口结束时过期
    ///
    /// # 参数
    ///
    /// * `key` - 计数键
    /// * `window_seconds` - 窗口长度（秒）
    ///
    /// # 返回值
    ///
    /// 当前窗口内的累计次数
    pub async fn hit_window(&self, key: &str, window_seconds: u64) -> Result<i64> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let (count,): (i64,) = window_pipeline(key, window_seconds)
            .query_async(&mut con)
            .await?;
        Ok(count)
    }
}

/// 固定窗口计数事务：`SET key 0 EX window NX` 后 `INCR key`
fn window_pipeline(key: &str, window_seconds: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window_seconds)
        .arg("NX")
        .ignore()
        .incr(key, 1);
    pipe
}
