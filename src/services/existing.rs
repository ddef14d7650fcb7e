//! 已有结果检查 - 业务能力层
//!
//! 只读探测输出目录，不修改任何文件

use std::path::{Path, PathBuf};

/// 输出目录中以 `<token>.` 开头的所有文件
///
/// 目录不存在或无法读取时返回空列表。
pub fn find_artifacts(output_dir: &Path, token: &str) -> Vec<PathBuf> {
    let prefix = format!("{}.", token);
    let Ok(entries) = std::fs::read_dir(output_dir) else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        // 跟随符号链接
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
        .map(|entry| entry.path())
        .collect()
}

/// 之前的运行是否已经为该 token 生成过图片
pub fn artifact_exists(output_dir: &Path, token: &str) -> bool {
    !find_artifacts(output_dir, token).is_empty()
}
