use std::path::PathBuf;
use std::time::Duration;

use crate::error::AcquireError;
use crate::models::query::Query;

/// 单个查询的最终状态
#[derive(Debug)]
pub enum OutcomeStatus {
    /// 已有图片，未做任何网络请求
    Skipped,
    /// 保存成功
    Succeeded {
        candidate_index: usize,
        artifact: PathBuf,
    },
    /// 所有候选索引都失败，`error` 为最后一次尝试的错误
    Failed { attempts: usize, error: AcquireError },
}

/// 单个查询的处理结果，每次运行每个查询只产生一次
#[derive(Debug)]
pub struct AcquisitionOutcome {
    pub query: Query,
    pub status: OutcomeStatus,
}

impl AcquisitionOutcome {
    pub fn skipped(query: Query) -> Self {
        Self {
            query,
            status: OutcomeStatus::Skipped,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped)
    }

    /// 成功时使用的候选索引
    pub fn candidate_index_used(&self) -> Option<usize> {
        match self.status {
            OutcomeStatus::Succeeded { candidate_index, .. } => Some(candidate_index),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AcquireError> {
        match &self.status {
            OutcomeStatus::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// 一次运行的所有结果（按输入顺序），只在内存中使用
#[derive(Debug, Default)]
pub struct BatchRun {
    pub outcomes: Vec<AcquisitionOutcome>,
    /// 实际执行过的查询间等待
    pub delays: Vec<Duration>,
    /// 是否被外部信号提前终止
    pub cancelled: bool,
}

impl BatchRun {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error().is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
