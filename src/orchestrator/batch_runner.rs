//! 批量查询编排器 - 编排层
//!
//! ## 职责
//!
//! 按输入顺序逐个处理查询：规范化 → 检查已有图片 → 递进获取并保存 → 等待 → 下一个。
//!
//! ## 状态
//!
//! ```text
//! Idle → Processing(i) → {Skipped, Succeeded, Failed}(i) → Processing(i+1) | Done
//! ```
//!
//! - 单个查询失败只记录，不中止整批
//! - 跳过的查询不发请求、不等待
//! - 最后一个查询之后不等待
//! - 每次迭代开始时、候选递进期间和每次等待期间检查取消信号

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::models::{AcquisitionOutcome, BatchRun, OutcomeStatus, Query};
use crate::services::{artifact_exists, DelayScheduler, FailureWriter, ImageLocator, ImagePersister};
use crate::utils::cancel::CancelSignal;
use crate::workflow::{EscalationPolicy, QueryCtx, ResultEscalator};

/// 批量查询编排器
pub struct BatchOrchestrator<'a, L: ImageLocator> {
    escalator: ResultEscalator<'a, L>,
    scheduler: DelayScheduler,
    output_dir: PathBuf,
    skip_existing: bool,
    failure_writer: Option<FailureWriter>,
    cancel: CancelSignal,
}

impl<'a, L: ImageLocator> BatchOrchestrator<'a, L> {
    pub fn new(locator: &'a L, persister: &'a ImagePersister, config: &Config) -> Self {
        Self {
            escalator: ResultEscalator::new(locator, persister, EscalationPolicy::from_config(config)),
            scheduler: DelayScheduler::new(config.base_delay_ms(), config.randomize_delay),
            output_dir: config.output_dir(),
            skip_existing: config.skip_existing,
            failure_writer: config
                .failed_queries_file
                .as_ref()
                .map(FailureWriter::with_path),
            cancel: CancelSignal::new(),
        }
    }

    /// 使用外部取消信号
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.escalator = self.escalator.with_cancel(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 依次处理所有查询
    pub async fn run(&self, queries: Vec<Query>) -> BatchRun {
        let total = queries.len();
        let mut run = BatchRun::default();

        for (i, query) in queries.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("⚠️ 收到终止信号，剩余 {} 个查询未处理", total - i);
                run.cancelled = true;
                break;
            }

            let ctx = QueryCtx::new(i + 1, total, query.token());
            info!("{} of {}...", i + 1, total);

            if self.skip_existing && artifact_exists(&self.output_dir, query.token()) {
                info!("{} ⏭ 已存在，跳过", ctx);
                run.outcomes.push(AcquisitionOutcome::skipped(query));
                continue;
            }

            let outcome = self
                .escalator
                .acquire_and_persist(query, &self.output_dir, &ctx)
                .await;
            self.report(&ctx, &outcome);
            run.outcomes.push(outcome);

            if self.cancel.is_cancelled() {
                warn!("⚠️ 处理期间收到终止信号，剩余 {} 个查询未处理", total - i - 1);
                run.cancelled = true;
                break;
            }

            if ctx.is_last() {
                break;
            }

            let delay = self.scheduler.next();
            info!("Waiting {:.1} minutes...", delay.as_secs_f64() / 60.0);
            if !self.cancel.sleep(delay).await {
                warn!("⚠️ 等待期间收到终止信号，剩余 {} 个查询未处理", total - i - 1);
                run.cancelled = true;
                break;
            }
            run.delays.push(delay);
        }

        info!("Done");
        run
    }

    fn report(&self, ctx: &QueryCtx, outcome: &AcquisitionOutcome) {
        match &outcome.status {
            OutcomeStatus::Succeeded { .. } => info!("{} Saved.", ctx),
            OutcomeStatus::Skipped => {}
            OutcomeStatus::Failed { attempts, error } => {
                info!("{} ❌ {} 次尝试均失败: {}", ctx, attempts, error);
                if let Some(writer) = &self.failure_writer {
                    if let Err(e) = writer.write(&outcome.query, error) {
                        warn!("写入失败列表失败 ({}): {}", writer.path().display(), e);
                    }
                }
            }
        }
    }
}
