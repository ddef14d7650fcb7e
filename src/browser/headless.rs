use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppResult, BrowserError};

/// 启动无头浏览器
///
/// 未指定可执行文件时由 chromiumoxide 自动查找本机的 Chrome/Chromium。
pub async fn launch_headless_browser(chrome_executable: Option<&str>) -> AppResult<Browser> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-extensions",
    ]);
    if let Some(path) = chrome_executable {
        debug!("浏览器路径: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        BrowserError::LaunchFailed { reason: e }
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            reason: e.to_string(),
        }
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok(browser)
}
