//! 浏览器页面来源 - 基础设施层
//!
//! 通过 `JsExecutor` 驱动海报查看器：
//! - 在落地页上找到第一份海报，读取日期文本和链接
//! - 按 `{海报链接}/{页码}` 导航，或点击"下一页"按钮
//! - 读取商品按钮的 aria-label 或海报图片地址

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{ContentStyle, SiteSelectors};
use crate::error::SourceError;
use crate::infrastructure::{JsExecutor, PageSource};
use crate::models::{Anchor, PageIdentity, RawContent};
use crate::workflow::NavigationStyle;

/// 落地页上第一份海报的信息
#[derive(Debug, Deserialize)]
struct PublicationInfo {
    href: Option<String>,
    alt: Option<String>,
    date: Option<String>,
}

const DEFAULT_OUTER_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(500);

pub struct BrowserPageSource {
    executor: JsExecutor,
    landing_url: String,
    selectors: SiteSelectors,
    content: ContentStyle,
    navigation: NavigationStyle,
    wait_retries: u32,
    wait_interval: Duration,
    flyer_link: Option<String>,
    overlay_failures: Vec<SourceError>,
}

impl BrowserPageSource {
    pub fn new(
        executor: JsExecutor,
        landing_url: impl Into<String>,
        selectors: SiteSelectors,
        content: ContentStyle,
        navigation: NavigationStyle,
    ) -> Self {
        Self {
            executor,
            landing_url: landing_url.into(),
            selectors,
            content,
            navigation,
            wait_retries: wait_retries_within(DEFAULT_OUTER_TIMEOUT, DEFAULT_WAIT_INTERVAL),
            wait_interval: DEFAULT_WAIT_INTERVAL,
            flyer_link: None,
            overlay_failures: Vec::new(),
        }
    }

    /// 按编排层的单步超时设置内部等待（等待海报入口、等待翻页后地址变化）
    ///
    /// 内部等待总时长不超过 `outer_timeout` 的一半，保证先于外层超时结束。
    pub fn with_wait(mut self, outer_timeout: Duration, interval: Duration) -> Self {
        self.wait_retries = wait_retries_within(outer_timeout, interval);
        self.wait_interval = interval;
        self
    }

    async fn find_publication(&self) -> Result<PublicationInfo, SourceError> {
        let js_code = format!(
            r#"
            (() => {{
                const link = document.querySelector({link});
                if (!link) return null;
                const img = link.querySelector('img');
                const date = link.querySelector({date});
                return {{
                    href: link.href || link.getAttribute('href'),
                    alt: img ? img.getAttribute('alt') : null,
                    date: date ? date.textContent.trim() : null
                }};
            }})()
            "#,
            link = js_str(&self.selectors.publication_link),
            date = js_str(&self.selectors.date_text),
        );

        for attempt in 0..self.wait_retries.max(1) {
            if attempt > 0 {
                sleep(self.wait_interval).await;
            }
            match self.executor.eval_as::<Option<PublicationInfo>>(js_code.as_str()).await? {
                Some(info) => return Ok(info),
                None => debug!(
                    "等待海报入口出现 (尝试 {}/{})",
                    attempt + 1,
                    self.wait_retries
                ),
            }
        }
        Err(SourceError::MissingElement(self.selectors.publication_link.clone()))
    }

    fn flyer_link(&self) -> Result<&str, SourceError> {
        self.flyer_link.as_deref().ok_or(SourceError::NoAnchor)
    }
}

#[async_trait]
impl PageSource for BrowserPageSource {
    async fn anchor(&mut self) -> Result<Anchor, SourceError> {
        self.executor.navigate(&self.landing_url).await?;
        if let Err(e) = self.dismiss_overlays().await {
            warn!("⚠️ 落地页 cookie 遮罩移除失败: {}", e);
            self.overlay_failures.push(e);
        }

        let info = self.find_publication().await?;
        let href = info
            .href
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| SourceError::MissingElement("publication href".to_string()))?;

        match info.alt.as_deref() {
            Some(alt) if alt.contains(&self.selectors.week_marker) => {
                info!("✅ 找到海报: {}", alt)
            }
            other => warn!(
                "❌ 第一份海报的标题为 {:?}，不包含 '{}'",
                other, self.selectors.week_marker
            ),
        }

        let link = href.trim().trim_end_matches('/').to_string();
        info!("🔗 海报链接: {}", link);
        if self.navigation == NavigationStyle::ClickNext {
            self.executor.navigate(&link).await?;
        }
        self.flyer_link = Some(link.clone());

        Ok(Anchor {
            start: PageIdentity::new(link),
            date_label: info.date,
        })
    }

    async fn goto(&mut self, index: u32) -> Result<(), SourceError> {
        let url = format!("{}/{}", self.flyer_link()?, index);
        self.executor.navigate(&url).await
    }

    async fn click_next(&mut self) -> Result<bool, SourceError> {
        let before = self.executor.url().await?;
        let js_code = format!(
            r#"
            (() => {{
                const button = document.querySelector({next});
                if (!button || button.disabled || button.getAttribute('aria-disabled') === 'true') {{
                    return false;
                }}
                button.click();
                return true;
            }})()
            "#,
            next = js_str(&self.selectors.next_button),
        );
        if !self.executor.eval_as::<bool>(js_code).await? {
            return Ok(false);
        }

        // 等待地址变化；等待耗尽不算失败，由重复检测兜底
        for _ in 0..self.wait_retries {
            if self.executor.url().await? != before {
                break;
            }
            sleep(self.wait_interval).await;
        }
        Ok(true)
    }

    async fn current_identity(&mut self) -> Result<PageIdentity, SourceError> {
        self.executor
            .url()
            .await?
            .map(PageIdentity::new)
            .ok_or_else(|| SourceError::MissingElement("page url".to_string()))
    }

    async fn current_content_items(&mut self) -> Result<Vec<RawContent>, SourceError> {
        match self.content {
            ContentStyle::Labels => {
                let js_code = format!(
                    "Array.from(document.querySelectorAll({})).map(b => b.getAttribute('aria-label')).filter(Boolean)",
                    js_str(&self.selectors.offer)
                );
                let labels: Vec<String> = self.executor.eval_as(js_code).await?;
                Ok(labels.into_iter().map(RawContent::Label).collect())
            }
            ContentStyle::Images => {
                let js_code = format!(
                    "Array.from(document.querySelectorAll({})).map(i => i.currentSrc || i.src).filter(Boolean)",
                    js_str(&self.selectors.flyer_image)
                );
                let urls: Vec<String> = self.executor.eval_as(js_code).await?;
                Ok(urls.into_iter().map(RawContent::ImageUrl).collect())
            }
        }
    }

    async fn dismiss_overlays(&mut self) -> Result<(), SourceError> {
        let js_code = format!(
            r#"
            (() => {{
                const overlay = document.getElementById({id});
                if (overlay) {{ overlay.remove(); return true; }}
                return false;
            }})()
            "#,
            id = js_str(&self.selectors.cookie_overlay_id),
        );
        if self.executor.eval_as::<bool>(js_code).await? {
            debug!("已移除 cookie 遮罩");
            sleep(Duration::from_millis(500)).await;
        }
        Ok(())
    }
    fn take_overlay_failures(&mut self) -> Vec<SourceError> {
        std::mem::take(&mut self.overlay_failures)
    }
}

/// 在 `outer_timeout / 2` 内能容纳的轮询次数，至少 1 次
fn wait_retries_within(outer_timeout: Duration, interval: Duration) -> u32 {
    let budget = outer_timeout / 2;
    if interval.is_zero() {
        return 1;
    }
    u32::try_from(budget.as_millis() / interval.as_millis().max(1))
        .unwrap_or(u32::MAX)
        .max(1)
}

/// 把 Rust 字符串编码为 JS 字符串字面量
fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
