use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// 配置文件路径所在的环境变量
pub const CONFIG_FILE_ENV: &str = "IMAGE_GRABBER_CONFIG";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 查询列表文件（逗号和/或换行分隔）
    pub queries_file_path: String,
    /// 图片输出目录
    pub output_images_dir: String,
    /// 两次查询之间的基础等待时间（分钟）
    pub minutes_delay: f64,
    /// 单次定位等待大图出现的超时（毫秒）
    pub lookup_timeout_ms: u64,
    /// 页面导航超时（毫秒）
    pub navigation_timeout_ms: u64,
    /// 下载远程图片的超时（毫秒）
    pub download_timeout_ms: u64,
    /// 最大候选索引（0 表示只尝试第一张）
    pub max_candidate_index: usize,
    /// 两次候选尝试之间的等待（毫秒）
    pub inter_attempt_delay_ms: u64,
    /// 已存在图片时跳过查询
    pub skip_existing: bool,
    /// 在 [delay/2, delay] 内随机化等待时间
    pub randomize_delay: bool,
    /// 安静模式，不输出进度
    pub quiet: bool,
    /// 浏览器调试端口，未设置时启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 图片搜索地址前缀，查询词直接拼接在后面
    pub search_url: String,
    /// 缩略图选择器
    pub thumbnail_selector: String,
    /// 大图选择器
    pub full_image_selector: String,
    /// 失败查询记录文件
    pub failed_queries_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queries_file_path: "queries.txt".to_string(),
            output_images_dir: "images".to_string(),
            minutes_delay: 12.0,
            lookup_timeout_ms: 2000,
            navigation_timeout_ms: 30_000,
            download_timeout_ms: 30_000,
            max_candidate_index: 2,
            inter_attempt_delay_ms: 1500,
            skip_existing: true,
            randomize_delay: false,
            quiet: false,
            browser_debug_port: None,
            chrome_executable: None,
            search_url: "https://www.google.com/search?tbm=isch&q=".to_string(),
            thumbnail_selector: "img.Q4LuWd".to_string(),
            full_image_selector: "img.n3VNCb".to_string(),
            failed_queries_file: Some("failed_queries.txt".to_string()),
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 按顺序解析：默认值 → 配置文件（若设置了 `IMAGE_GRABBER_CONFIG`）→ 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidConfigFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        toml::from_str(&content).map_err(|e| ConfigError::InvalidConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn with_env_overrides(self) -> Self {
        let d = self;
        Self {
            queries_file_path: env_string("QUERIES_FILE_PATH").unwrap_or(d.queries_file_path),
            output_images_dir: env_string("OUTPUT_IMAGES_DIR").unwrap_or(d.output_images_dir),
            minutes_delay: env_parse("MINUTES_DELAY").unwrap_or(d.minutes_delay),
            lookup_timeout_ms: env_parse("LOOKUP_TIMEOUT_MS").unwrap_or(d.lookup_timeout_ms),
            navigation_timeout_ms: env_parse("NAVIGATION_TIMEOUT_MS").unwrap_or(d.navigation_timeout_ms),
            download_timeout_ms: env_parse("DOWNLOAD_TIMEOUT_MS").unwrap_or(d.download_timeout_ms),
            max_candidate_index: env_parse("MAX_CANDIDATE_INDEX").unwrap_or(d.max_candidate_index),
            inter_attempt_delay_ms: env_parse("INTER_ATTEMPT_DELAY_MS").unwrap_or(d.inter_attempt_delay_ms),
            skip_existing: env_parse("SKIP_EXISTING").unwrap_or(d.skip_existing),
            randomize_delay: env_parse("RANDOMIZE_DELAY").unwrap_or(d.randomize_delay),
            quiet: env_parse("QUIET").unwrap_or(d.quiet),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").or(d.browser_debug_port),
            chrome_executable: env_string("CHROME_EXECUTABLE").or(d.chrome_executable),
            search_url: env_string("SEARCH_URL").unwrap_or(d.search_url),
            thumbnail_selector: env_string("THUMBNAIL_SELECTOR").unwrap_or(d.thumbnail_selector),
            full_image_selector: env_string("FULL_IMAGE_SELECTOR").unwrap_or(d.full_image_selector),
            failed_queries_file: env_string("FAILED_QUERIES_FILE").or(d.failed_queries_file),
        }
    }

    /// 基础等待时间（毫秒）
    pub fn base_delay_ms(&self) -> u64 {
        if self.minutes_delay.is_finite() && self.minutes_delay > 0.0 {
            (self.minutes_delay * 60.0 * 1000.0).round() as u64
        } else {
            0
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output_images_dir)
    }

    /// 在处理任何查询之前检查配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_images_dir.trim().is_empty() {
            return Err(ConfigError::EmptyOutputPath);
        }
        Ok(())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
