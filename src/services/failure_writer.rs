//! 失败查询记录服务 - 业务能力层
//!
//! 只负责"写失败列表"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::error::AcquireError;
use crate::models::Query;

/// 失败查询记录服务
///
/// 每行写一个原始查询，文件可以直接作为下一次运行的查询列表。
pub struct FailureWriter {
    file_path: PathBuf,
}

impl FailureWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    /// 追加一条失败记录
    pub fn write(&self, query: &Query, error: &AcquireError) -> Result<()> {
        debug!("记录失败查询: {} | {}", query.raw(), error);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        writeln!(file, "{}", query.raw())?;

        Ok(())
    }
}
