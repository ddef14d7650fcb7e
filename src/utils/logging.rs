/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::BatchRun;

/// 默认日志级别
///
/// 每个查询的进度、成功和失败都记在 `info`，安静模式用 `warn` 把它们全部屏蔽，
/// 只保留运行级别的警告。
pub fn default_level(quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else {
        "info"
    }
}

/// 初始化日志
///
/// 设置了 `RUST_LOG` 时以其为准，否则使用 [`default_level`]。
pub fn init(quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 图片批量获取");
    info!("📁 输出目录: {}", config.output_images_dir);
    info!(
        "⏱ 查询间隔: {} 分钟{}",
        config.minutes_delay,
        if config.randomize_delay { " (随机化)" } else { "" }
    );
    info!("🔢 最大候选索引: {}", config.max_candidate_index);
    info!("{}", "=".repeat(60));
}

/// 记录查询加载信息
pub fn log_queries_loaded(total: usize, config: &Config) {
    info!("✓ 找到 {} 个待处理的查询", total);
    if config.skip_existing {
        info!("💡 已存在图片的查询将被跳过\n");
    }
}

/// 打印最终统计信息
pub fn print_final_stats(run: &BatchRun, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", run.succeeded(), run.len());
    info!("⏭ 跳过: {}", run.skipped());
    info!("❌ 失败: {}", run.failed());
    if run.cancelled {
        info!("⚠️ 运行被提前终止");
    }
    info!("{}", "=".repeat(60));
    if run.failed() > 0 {
        if let Some(path) = &config.failed_queries_file {
            info!("\n失败的查询已保存至: {}", path);
        }
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("图片搜索", 2), "图片...");
    }
}
