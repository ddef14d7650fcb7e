//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用生命周期
//! - 检查配置、准备输出目录
//! - 加载查询列表
//! - 持有浏览器（定位器）和 HTTP 客户端（保存服务）
//! - 输出全局统计信息
//!
//! ### `batch_runner` - 批量查询编排器
//! - 按顺序遍历查询，跳过已有结果
//! - 委托 `ResultEscalator` 处理单个查询
//! - 查询之间按调度等待，响应取消信号（`utils::cancel`）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App)
//!     ↓
//! batch_runner (处理 Vec<Query>)
//!     ↓
//! workflow::ResultEscalator (处理单个 Query)
//!     ↓
//! services (能力层：locate / persist / delay / existing)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```

pub mod batch_processor;
pub mod batch_runner;

// 重新导出主要类型
pub use batch_processor::App;
pub use batch_runner::BatchOrchestrator;
pub use crate::utils::cancel::CancelSignal;
