use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 常见的 chromium 安装位置
const CHROMIUM_CANDIDATES: &[&str] = &["/usr/bin/chromium-browser", "/usr/bin/chromium"];

/// 查找浏览器可执行文件：优先使用配置，其次探测常见位置
fn resolve_executable(configured: Option<&Path>) -> Option<PathBuf> {
    configured.map(Path::to_path_buf).or_else(|| {
        CHROMIUM_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    })
}

/// 启动无头浏览器并打开一个空白页面
pub async fn launch_headless_browser(chrome_executable: Option<&Path>) -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .no_sandbox()
        .window_size(1920, 1080)
        .args(vec![
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--disable-gpu",
        ]);
    if let Some(path) = resolve_executable(chrome_executable) {
        debug!("浏览器可执行文件: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        anyhow::anyhow!("配置无头浏览器失败: {}", e)
    })?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .context("启动无头浏览器失败")?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page("about:blank")
        .await
        .context("创建页面失败")?;
    info!("✅ 无头浏览器已就绪");

    Ok((browser, page))
}
