/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, HarvestSettings};
use crate::models::{Session, SessionResult};

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则 `verbose` 为真时使用 debug，默认 info。
/// 重复调用（如多个测试）不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 海报采集模式");
    info!("🌐 落地页: {}", config.landing_url);
    info!(
        "📊 最大页数: {} | 步进: {:?} | 翻页: {:?} | 内容: {:?}",
        config.max_pages, config.step_policy, config.navigation, config.content
    );
    info!("{}", "=".repeat(60));
}

/// 记录会话开始信息
pub fn log_session_start(session: &Session, settings: &HarvestSettings) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始会话: {}", session.key);
    info!("🔗 首页: {}", session.start);
    if let Some(label) = &session.date_label {
        info!("📅 日期文本: {}", truncate_text(label, 60));
    }
    info!("📁 数据目录: {}", settings.base_path.display());
    info!("{}", "=".repeat(60));
}

/// 记录单页开始
pub fn log_page_start(session: &Session, page_index: u32) {
    info!("[会话 {}] {}", session.key, "─".repeat(30));
    info!("[会话 {}] 处理第 {} 页", session.key, page_index);
}

/// 记录会话完成信息
pub fn log_session_complete(result: &SessionResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 会话 {} 完成: 访问 {} 页, 写入 {} 个产物, 跳过 {} 个",
        result.session_key.as_deref().unwrap_or("-"),
        result.pages_visited,
        result.artifacts_written(),
        result.skipped
    );
    info!("🏁 结束原因: {}", result.termination);
    if !result.incidents.is_empty() {
        info!("⚠️ 记录事件: {} 条", result.incidents.len());
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(result: &SessionResult, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 采集完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match &result.error {
        None => {
            info!("✅ 页数: {} ({:?})", result.pages_visited, result.visited_indices);
            info!("✅ 产物: {}", result.artifacts_written());
            info!("⏭️ 跳过: {}", result.skipped);
        }
        Some(e) => info!("❌ 会话失败: {}", e),
    }
    for incident in &result.incidents {
        info!("  {}", incident);
    }
    info!("{}", "=".repeat(60));
    info!("\n状态日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
