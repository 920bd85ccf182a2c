use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info};

/// 连接到已运行的浏览器（`--remote-debugging-port`）
///
/// 若已有页面的地址以 `reuse_prefix` 开头则复用它，否则新建空白页面。
pub async fn connect_to_browser_and_page(port: u16, reuse_prefix: Option<&str>) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url)
        .await
        .with_context(|| format!("连接浏览器失败 (端口: {})", port))?;
    debug!("浏览器连接成功");

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

    if let Some(prefix) = reuse_prefix {
        let pages = browser.pages().await?;
        debug!("获取到 {} 个页面", pages.len());
        for p in pages {
            if let Ok(Some(url)) = p.url().await {
                if url.starts_with(prefix) {
                    info!("✓ 复用已打开的页面: {}", url);
                    return Ok((browser, p));
                }
            }
        }
    }

    let page = browser
        .new_page("about:blank")
        .await
        .context("创建空白页面失败")?;
    Ok((browser, page))
}
