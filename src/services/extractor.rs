//! 内容提取服务 - 业务能力层
//!
//! 异步查看器翻页后，新一页的内容可能还没有渲染出来。
//! 提取时按固定次数、固定间隔轮询，直到"新"内容出现且条数稳定，或重试耗尽。

use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::ContentStyle;
use crate::infrastructure::PageSource;
use crate::models::{ContentItem, Incident, IncidentKind, PageIdentity, RawContent};
use crate::services::SeenSet;

/// 轮询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 出现了新内容
    Fresh(Vec<ContentItem>),
    /// 重试耗尽，没有新内容；携带最后一次看到的全部内容
    Exhausted { present: Vec<ContentItem> },
}

pub struct Extractor {
    content: ContentStyle,
    poll_retries: u32,
    poll_interval: Duration,
    timeout: Duration,
}

impl Extractor {
    pub fn new(content: ContentStyle, poll_retries: u32, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            content,
            poll_retries,
            poll_interval,
            timeout,
        }
    }

    /// 将原始内容转换为内容条目，页内序号按出现顺序编号
    pub fn extract(&self, raw: Vec<RawContent>, page_index: u32, identity: &PageIdentity) -> Vec<ContentItem> {
        raw.into_iter()
            .enumerate()
            .map(|(ordinal, r)| ContentItem::from_raw(r, page_index, identity.clone(), ordinal))
            .collect()
    }

    /// 是否为当前内容形式要采集的内容
    fn wanted(&self, raw: &RawContent) -> bool {
        matches!(
            (self.content, raw),
            (ContentStyle::Labels, RawContent::Label(_)) | (ContentStyle::Images, RawContent::ImageUrl(_))
        )
    }

    /// 轮询当前页面，返回尚未在 `content_seen` 中出现过的内容
    ///
    /// 商品标签没有去重键，只要存在即视为新内容。
    /// 出现新内容后继续轮询，直到新内容条数在相邻两次读取中保持不变（或重试耗尽），
    /// 以免同一页上尚未渲染完的图片被漏掉。
    /// 单次查询失败或超时记为 `Transient` 事件并继续重试。
    pub async fn poll_new(
        &self,
        source: &mut dyn PageSource,
        content_seen: &SeenSet<String>,
        page_index: u32,
        identity: &PageIdentity,
        incidents: &mut Vec<Incident>,
    ) -> PollOutcome {
        let mut present = Vec::new();
        let mut fresh_so_far: Option<Vec<RawContent>> = None;

        for attempt in 0..=self.poll_retries {
            if attempt > 0 {
                sleep(self.poll_interval).await;
            }

            let raw = match timeout(self.timeout, source.current_content_items()).await {
                Ok(Ok(raw)) => raw,
                Ok(Err(e)) => {
                    warn!("第 {} 页读取内容失败 (尝试 {}/{}): {}", page_index, attempt + 1, self.poll_retries + 1, e);
                    incidents.push(Incident::new(IncidentKind::Transient, Some(page_index), e.to_string()));
                    continue;
                }
                Err(_) => {
                    warn!("第 {} 页读取内容超时 (尝试 {}/{})", page_index, attempt + 1, self.poll_retries + 1);
                    incidents.push(Incident::new(
                        IncidentKind::Transient,
                        Some(page_index),
                        format!("读取内容超时 ({:?})", self.timeout),
                    ));
                    continue;
                }
            };

            let raw: Vec<RawContent> = raw.into_iter().filter(|r| self.wanted(r)).collect();
            let fresh: Vec<RawContent> = raw
                .iter()
                .filter(|r| match r {
                    RawContent::ImageUrl(url) => !content_seen.seen(url.as_str()),
                    RawContent::Label(_) => true,
                })
                .cloned()
                .collect();
            present = raw;

            if fresh.is_empty() {
                debug!("第 {} 页暂无新内容 (尝试 {}/{})", page_index, attempt + 1, self.poll_retries + 1);
                continue;
            }
            match &fresh_so_far {
                Some(previous) if previous.len() == fresh.len() => {
                    debug!("第 {} 页发现 {} 条新内容 (尝试 {})", page_index, fresh.len(), attempt + 1);
                    return PollOutcome::Fresh(self.extract(fresh, page_index, identity));
                }
                _ => {
                    debug!("第 {} 页新内容 {} 条，等待渲染稳定", page_index, fresh.len());
                    fresh_so_far = Some(fresh);
                }
            }
        }

        match fresh_so_far {
            Some(fresh) => PollOutcome::Fresh(self.extract(fresh, page_index, identity)),
            None => PollOutcome::Exhausted {
                present: self.extract(present, page_index, identity),
            },
        }
    }
}
