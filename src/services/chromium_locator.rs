//! 基于 Chromium 的图片定位服务 - 业务能力层
//!
//! 每次定位都在共享的浏览器上打开一个新页面：
//! 搜索 → 点击第 N 张缩略图 → 等待大图出现 → 读取 `src` → 关闭页面

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::Browser;
use tokio::time::sleep;
use tracing::debug;

use crate::config::Config;
use crate::error::{AcquireError, AcquireResult, BrowserError};
use crate::infrastructure::JsExecutor;
use crate::models::{ImageCandidate, Query};
use crate::services::locator::ImageLocator;
use crate::utils::logging::truncate_text;

/// 轮询大图 `src` 的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chromium 图片定位服务
pub struct ChromiumLocator {
    browser: Browser,
    search_url: String,
    thumbnail_selector: String,
    full_image_selector: String,
    navigation_timeout: Duration,
}

impl ChromiumLocator {
    /// 创建新的定位服务（接管浏览器）
    pub fn new(browser: Browser, config: &Config) -> Self {
        Self {
            browser,
            search_url: config.search_url.clone(),
            thumbnail_selector: config.thumbnail_selector.clone(),
            full_image_selector: config.full_image_selector.clone(),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
        }
    }

    /// 搜索结果页地址，token 已经是 URL 安全的
    pub fn search_url_for(&self, query: &Query) -> String {
        format!("{}{}", self.search_url, query.token())
    }

    async fn locate_in(
        &self,
        executor: &JsExecutor,
        query: &Query,
        index: usize,
        timeout: Duration,
    ) -> AcquireResult<ImageCandidate> {
        let session_err = |e: BrowserError| AcquireError::browser(query.raw(), index, e);

        let url = self.search_url_for(query);
        debug!("打开搜索页: {}", url);
        executor
            .goto(&url, self.navigation_timeout)
            .await
            .map_err(session_err)?;

        let thumbnails = executor
            .page()
            .find_elements(self.thumbnail_selector.as_str())
            .await
            .map_err(|e| session_err(BrowserError::Cdp(e)))?;
        debug!("找到 {} 张缩略图", thumbnails.len());

        let thumbnail = thumbnails
            .into_iter()
            .nth(index)
            .ok_or_else(|| AcquireError::NotFound {
                query: query.raw().to_string(),
                index,
            })?;

        thumbnail
            .click()
            .await
            .map_err(|e| session_err(BrowserError::Cdp(e)))?;

        let src = self
            .wait_for_full_image(executor, query, index, timeout)
            .await?;
        debug!("大图地址: {}", truncate_text(&src, 80));

        ImageCandidate::from_src(&src, query.raw(), index)
    }

    /// 轮询直到大图元素出现且 `src` 非空
    async fn wait_for_full_image(
        &self,
        executor: &JsExecutor,
        query: &Query,
        index: usize,
        timeout: Duration,
    ) -> AcquireResult<String> {
        let selector = serde_json::to_string(&self.full_image_selector)
            .map_err(|e| AcquireError::browser(query.raw(), index, e))?;
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return el ? (el.getAttribute("src") || "") : "";
            }})()
            "#,
            selector
        );

        let deadline = Instant::now() + timeout;
        loop {
            let src: String = executor
                .eval_as(script.as_str())
                .await
                .map_err(|e| AcquireError::browser(query.raw(), index, e))?;

            if !src.trim().is_empty() {
                return Ok(src);
            }

            if Instant::now() >= deadline {
                return Err(AcquireError::Timeout {
                    query: query.raw().to_string(),
                    index,
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl ImageLocator for ChromiumLocator {
    async fn locate(
        &self,
        query: &Query,
        candidate_index: usize,
        timeout: Duration,
    ) -> AcquireResult<ImageCandidate> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AcquireError::browser(query.raw(), candidate_index, e))?;
        let executor = JsExecutor::new(page);

        let result = self
            .locate_in(&executor, query, candidate_index, timeout)
            .await;

        // 无论成功与否都关闭本次会话
        if let Err(e) = executor.close().await {
            debug!("关闭页面失败: {}", e);
        }

        result
    }
}
