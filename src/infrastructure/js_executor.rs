//! JS 执行器 - 基础设施层
//!
//! 持有一次定位会话的 page，只暴露"导航 / 执行 JS / 关闭"的能力

use std::time::Duration;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::BrowserError;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识查询和候选图片
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于元素查找、点击等操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定地址
    pub async fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Cdp(e)),
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, BrowserError> {
        let result = self.page.evaluate(js_code.into()).await?;
        result
            .into_value::<JsonValue>()
            .map_err(|e| BrowserError::InvalidScriptResult {
                reason: e.to_string(),
            })
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, BrowserError> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value).map_err(|e| BrowserError::InvalidScriptResult {
            reason: e.to_string(),
        })
    }

    /// 关闭页面，结束本次会话
    pub async fn close(self) -> Result<(), BrowserError> {
        self.page.close().await?;
        Ok(())
    }
}
