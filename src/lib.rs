//! # Image Grabber
//!
//! 为每个查询从图片搜索服务获取一张代表图片并保存到本地，遵守搜索服务的频率限制
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 连接或启动浏览器
//! - `infrastructure/` - `JsExecutor` 持有一次会话的 Page，提供导航和 eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个查询
//! - `ImageLocator` / `ChromiumLocator` - 定位第 N 张候选图片
//! - `ImagePersister` - 下载或解码并原子写入图片
//! - `DelayScheduler` - 计算查询间等待时间
//! - `artifact_exists` - 检查已有结果
//! - `FailureWriter` - 写失败查询列表
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个查询"的完整获取流程
//! - `QueryCtx` - 上下文封装（序号 + token）
//! - `ResultEscalator` - 候选索引递进（locate → persist → 下一张）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 批量查询编排器，顺序处理、等待、取消
//! - `orchestrator/batch_processor` - 应用生命周期和全局统计
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AcquireError, AppError, AppResult, ConfigError};
pub use infrastructure::JsExecutor;
pub use models::{normalize, AcquisitionOutcome, BatchRun, ImageCandidate, OutcomeStatus, Query};
pub use orchestrator::{App, BatchOrchestrator, CancelSignal};
pub use services::{ImageLocator, ImagePersister};
pub use workflow::{EscalationPolicy, QueryCtx, ResultEscalator};
