//! 应用生命周期 - 编排层
//!
//! ## 核心功能
//!
//! 1. **配置检查**：输出目录不可用时在处理任何查询之前失败
//! 2. **加载查询**：读取查询列表文件
//! 3. **资源管理**：启动或连接浏览器，持有定位器和保存服务
//! 4. **委托执行**：交给 `BatchOrchestrator` 逐个处理
//! 5. **全局统计**：输出整次运行的结果

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::browser;
use crate::config::Config;
use crate::models::{load_queries_from_file, BatchRun, Query};
use crate::orchestrator::{BatchOrchestrator, CancelSignal};
use crate::services::{ensure_dir, ChromiumLocator, ImagePersister};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    queries: Vec<Query>,
    locator: ChromiumLocator,
    persister: ImagePersister,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        ensure_dir(&config.output_dir())?;

        logging::log_startup(&config);

        let queries = load_queries_from_file(Path::new(&config.queries_file_path)).await?;

        let persister = ImagePersister::new(Duration::from_millis(config.download_timeout_ms))?;

        let browser = browser::open_browser(&config)
            .await
            .context("无法打开浏览器")?;
        let locator = ChromiumLocator::new(browser, &config);

        Ok(Self {
            config,
            queries,
            locator,
            persister,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(self, cancel: CancelSignal) -> Result<BatchRun> {
        let Self {
            config,
            queries,
            locator,
            persister,
        } = self;

        if queries.is_empty() {
            warn!("⚠️ 查询列表为空，程序结束");
            return Ok(BatchRun::default());
        }

        logging::log_queries_loaded(queries.len(), &config);

        let orchestrator = BatchOrchestrator::new(&locator, &persister, &config).with_cancel(cancel);
        let run = orchestrator.run(queries).await;

        logging::print_final_stats(&run, &config);

        Ok(run)
    }
}
