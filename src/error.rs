use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（致命，在处理任何查询之前中止）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动无头浏览器失败
    #[error("启动无头浏览器失败: {reason}")]
    LaunchFailed { reason: String },
    /// 页面导航超时
    #[error("导航到 {url} 超时 ({timeout_ms}ms)")]
    NavigationTimeout { url: String, timeout_ms: u64 },
    /// 脚本返回值无法解析
    #[error("脚本返回值无效: {reason}")]
    InvalidScriptResult { reason: String },
    /// 执行 CDP 命令失败
    #[error("执行浏览器命令失败: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

/// 单个查询在定位或保存阶段的错误
///
/// 全部可以通过提升候选索引来恢复，只有在索引用尽后才会记录到结果里。
#[derive(Debug, Error)]
pub enum AcquireError {
    /// 指定索引处没有候选图片
    #[error("未找到候选图片 (查询: {query}, 索引: {index})")]
    NotFound { query: String, index: usize },
    /// 候选图片未在超时时间内出现
    #[error("等待候选图片超时 (查询: {query}, 索引: {index}, 超时: {timeout_ms}ms)")]
    Timeout {
        query: String,
        index: usize,
        timeout_ms: u64,
    },
    /// 浏览器会话内部失败
    #[error("浏览器会话失败 (查询: {query}, 索引: {index}): {reason}")]
    Browser {
        query: String,
        index: usize,
        reason: String,
    },
    /// 下载远程图片失败
    #[error("下载失败 ({url}): {reason}")]
    Download { url: String, reason: String },
    /// 内联图片数据无法解码
    #[error("解码失败: {reason}")]
    Decode { reason: String },
    /// 写入图片文件失败
    #[error("写入文件失败 ({}): {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 输出目录为空
    #[error("输出目录不能为空")]
    EmptyOutputPath,
    /// 输出路径存在但不是目录
    #[error("{} 不是目录", path.display())]
    NotADirectory { path: PathBuf },
    /// 创建输出目录失败
    #[error("无法创建目录 ({}): {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 查询列表文件无法读取
    #[error("无法读取查询列表 ({}): {source}", path.display())]
    QueriesFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件无法读取或解析
    #[error("配置文件无效 ({}): {reason}", path.display())]
    InvalidConfigFile { path: PathBuf, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Cdp(err))
    }
}

// ========== 便捷构造函数 ==========

impl AcquireError {
    /// 创建下载错误
    pub fn download(url: impl Into<String>, reason: impl ToString) -> Self {
        AcquireError::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建解码错误
    pub fn decode(reason: impl ToString) -> Self {
        AcquireError::Decode {
            reason: reason.to_string(),
        }
    }

    /// 创建浏览器会话错误
    pub fn browser(query: impl Into<String>, index: usize, reason: impl ToString) -> Self {
        AcquireError::Browser {
            query: query.into(),
            index,
            reason: reason.to_string(),
        }
    }

    /// 该错误是否来自定位阶段（而非保存阶段）
    pub fn is_locator_error(&self) -> bool {
        matches!(
            self,
            AcquireError::NotFound { .. } | AcquireError::Timeout { .. } | AcquireError::Browser { .. }
        )
    }
}

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(port: u16, source: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed { port, source })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 单次获取结果类型
pub type AcquireResult<T> = Result<T, AcquireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_errors_are_classified() {
        let not_found = AcquireError::NotFound {
            query: "cat".to_string(),
            index: 0,
        };
        assert!(not_found.is_locator_error());
        assert!(!AcquireError::decode("bad").is_locator_error());
        assert!(!AcquireError::download("http://x", "404").is_locator_error());
    }

    #[test]
    fn test_config_error_wraps_into_app_error() {
        let err: AppError = ConfigError::EmptyOutputPath.into();
        assert!(matches!(err, AppError::Config(ConfigError::EmptyOutputPath)));
        assert!(err.to_string().contains("输出目录"));
    }
}
