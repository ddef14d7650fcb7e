pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;

use chromiumoxide::Browser;

use crate::config::Config;
use crate::error::AppResult;

/// 按配置连接已有浏览器或启动无头浏览器
pub async fn open_browser(config: &Config) -> AppResult<Browser> {
    match config.browser_debug_port {
        Some(port) => connect_to_browser(port).await,
        None => launch_headless_browser(config.chrome_executable.as_deref()).await,
    }
}
