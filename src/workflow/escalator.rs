//! 候选索引递进 - 流程层
//!
//! 核心职责：定义"一个查询"的完整获取流程
//!
//! 流程顺序：
//! 1. 定位第 0 张候选 → 保存
//! 2. 失败则等待，定位第 1 张 → 保存
//! 3. ... 直到 `max_index`，仍失败则记录最后一次错误
//!
//! 收到终止信号后不再发起新的尝试，以最后一次错误结束。

use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::AcquireResult;
use crate::models::{AcquisitionOutcome, OutcomeStatus, Query};
use crate::services::{ImageLocator, ImagePersister};
use crate::utils::cancel::CancelSignal;
use crate::workflow::query_ctx::QueryCtx;

/// 递进策略
#[derive(Debug, Clone, Copy)]
pub struct EscalationPolicy {
    /// 最大候选索引（含），最多尝试 `max_index + 1` 次
    pub max_index: usize,
    /// 单次定位超时
    pub lookup_timeout: Duration,
    /// 两次尝试之间的等待
    pub inter_attempt_delay: Duration,
}

impl EscalationPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_index: config.max_candidate_index,
            lookup_timeout: Duration::from_millis(config.lookup_timeout_ms),
            inter_attempt_delay: Duration::from_millis(config.inter_attempt_delay_ms),
        }
    }
}

/// 候选索引递进器
///
/// - 不持有任何资源，只借用定位器和保存服务
/// - 同一时间只发起一次定位
pub struct ResultEscalator<'a, L: ImageLocator> {
    locator: &'a L,
    persister: &'a ImagePersister,
    policy: EscalationPolicy,
    cancel: CancelSignal,
}

impl<'a, L: ImageLocator> ResultEscalator<'a, L> {
    pub fn new(locator: &'a L, persister: &'a ImagePersister, policy: EscalationPolicy) -> Self {
        Self {
            locator,
            persister,
            policy,
            cancel: CancelSignal::new(),
        }
    }

    /// 使用外部取消信号
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// 获取并保存一个查询的图片
    ///
    /// 成功时立即返回所用索引；在 `max_index` 处仍失败时返回该次尝试的错误。
    pub async fn acquire_and_persist(
        &self,
        query: Query,
        dest_dir: &Path,
        ctx: &QueryCtx,
    ) -> AcquisitionOutcome {
        let mut index = 0;

        loop {
            match self.attempt(&query, dest_dir, index).await {
                Ok(artifact) => {
                    info!("{} ✓ 已保存 (候选 #{}): {}", ctx, index, artifact.display());
                    return AcquisitionOutcome {
                        query,
                        status: OutcomeStatus::Succeeded {
                            candidate_index: index,
                            artifact,
                        },
                    };
                }
                Err(error) if index >= self.policy.max_index || self.cancel.is_cancelled() => {
                    return AcquisitionOutcome {
                        query,
                        status: OutcomeStatus::Failed {
                            attempts: index + 1,
                            error,
                        },
                    };
                }
                Err(error) => {
                    let stage = if error.is_locator_error() { "定位" } else { "保存" };
                    info!(
                        "{} 候选 #{} {}失败: {}，尝试下一张 ({}/{})",
                        ctx,
                        index,
                        stage,
                        error,
                        index + 1,
                        self.policy.max_index
                    );
                    if !self.cancel.sleep(self.policy.inter_attempt_delay).await {
                        return AcquisitionOutcome {
                            query,
                            status: OutcomeStatus::Failed {
                                attempts: index + 1,
                                error,
                            },
                        };
                    }
                    index += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        query: &Query,
        dest_dir: &Path,
        index: usize,
    ) -> AcquireResult<std::path::PathBuf> {
        let candidate = self
            .locator
            .locate(query, index, self.policy.lookup_timeout)
            .await?;
        self.persister
            .persist(candidate, dest_dir, query.token())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquireError;
    use crate::models::ImageCandidate;
    use async_trait::async_trait;
    use base64::{engine::general_purpose, Engine};
    use std::sync::Mutex;

    /// 在 `succeed_at` 之前的索引都返回 NotFound
    struct ScriptedLocator {
        succeed_at: Option<usize>,
        calls: Mutex<Vec<usize>>,
    }

    impl ScriptedLocator {
        fn new(succeed_at: Option<usize>) -> Self {
            Self {
                succeed_at,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageLocator for ScriptedLocator {
        async fn locate(
            &self,
            query: &Query,
            candidate_index: usize,
            _timeout: Duration,
        ) -> AcquireResult<ImageCandidate> {
            self.calls.lock().unwrap().push(candidate_index);
            if Some(candidate_index) == self.succeed_at {
                Ok(ImageCandidate::InlineData {
                    mime_type: "image/png".to_string(),
                    payload: general_purpose::STANDARD.encode(b"png"),
                })
            } else {
                Err(AcquireError::NotFound {
                    query: query.raw().to_string(),
                    index: candidate_index,
                })
            }
        }
    }

    fn policy(max_index: usize) -> EscalationPolicy {
        EscalationPolicy {
            max_index,
            lookup_timeout: Duration::from_millis(10),
            inter_attempt_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_single_attempt_when_max_index_zero() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ScriptedLocator::new(None);
        let persister = ImagePersister::new(Duration::from_secs(1)).unwrap();
        let escalator = ResultEscalator::new(&locator, &persister, policy(0));

        let outcome = escalator
            .acquire_and_persist(Query::new("cat"), dir.path(), &QueryCtx::new(1, 1, "cat"))
            .await;

        assert_eq!(locator.calls(), vec![0]);
        assert!(matches!(
            outcome.status,
            OutcomeStatus::Failed {
                attempts: 1,
                error: AcquireError::NotFound { index: 0, .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_error_is_last_attempt_error() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ScriptedLocator::new(None);
        let persister = ImagePersister::new(Duration::from_secs(1)).unwrap();
        let escalator = ResultEscalator::new(&locator, &persister, policy(3));

        let outcome = escalator
            .acquire_and_persist(Query::new("cat"), dir.path(), &QueryCtx::new(1, 1, "cat"))
            .await;

        assert_eq!(locator.calls(), vec![0, 1, 2, 3]);
        assert!(matches!(
            outcome.error(),
            Some(AcquireError::NotFound { index: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ScriptedLocator::new(Some(1));
        let persister = ImagePersister::new(Duration::from_secs(1)).unwrap();
        let escalator = ResultEscalator::new(&locator, &persister, policy(5));

        let outcome = escalator
            .acquire_and_persist(Query::new("cat"), dir.path(), &QueryCtx::new(1, 1, "cat"))
            .await;

        assert_eq!(locator.calls(), vec![0, 1]);
        assert_eq!(outcome.candidate_index_used(), Some(1));
        assert!(dir.path().join("cat.png").is_file());
    }

    #[tokio::test]
    async fn test_cancel_during_attempt_delay_stops_escalation() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ScriptedLocator::new(None);
        let persister = ImagePersister::new(Duration::from_secs(1)).unwrap();
        let cancel = CancelSignal::new();
        let escalator = ResultEscalator::new(
            &locator,
            &persister,
            EscalationPolicy {
                inter_attempt_delay: Duration::from_secs(60),
                ..policy(4)
            },
        )
        .with_cancel(cancel.clone());

        let remote = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.cancel();
        });

        let outcome = escalator
            .acquire_and_persist(Query::new("cat"), dir.path(), &QueryCtx::new(1, 1, "cat"))
            .await;

        assert_eq!(locator.calls(), vec![0]);
        assert!(matches!(
            outcome.status,
            OutcomeStatus::Failed {
                attempts: 1,
                error: AcquireError::NotFound { index: 0, .. }
            }
        ));
    }
}
