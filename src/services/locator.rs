//! 图片定位能力
//!
//! 给定查询和候选索引，返回远程图片地址或内联图片数据。
//! 每次调用都是一次昂贵的浏览器会话，调用方必须串行调用，不能并发。

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AcquireResult;
use crate::models::{ImageCandidate, Query};

#[async_trait]
pub trait ImageLocator: Send + Sync {
    /// 定位第 `candidate_index` 张候选图片
    ///
    /// 该索引处没有图片时返回 `NotFound`，图片未在 `timeout` 内出现时返回 `Timeout`。
    async fn locate(
        &self,
        query: &Query,
        candidate_index: usize,
        timeout: Duration,
    ) -> AcquireResult<ImageCandidate>;
}
