use anyhow::Result;
use image_grabber::utils::logging;
use image_grabber::{App, CancelSignal, Config};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.quiet);

    // Ctrl-C 时在下一个检查点停止
    let cancel = CancelSignal::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到 Ctrl-C，正在停止");
            signal.cancel();
        }
    });

    // 初始化并运行应用
    App::initialize(config).await?.run(cancel).await?;

    Ok(())
}
