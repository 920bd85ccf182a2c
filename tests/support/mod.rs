//! 集成测试用的脚本化页面来源、内存存储和下载器
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use flyer_harvest::{
    Anchor, ContentStyle, Downloader, FetchError, HarvestSettings, NavigationStyle, PageIdentity,
    PageSource, RawContent, SourceError, StepPolicy, Storage, StorageError,
};

/// 一页脚本
#[derive(Debug, Clone)]
pub struct ScriptedPage {
    pub identity: String,
    pub items: Vec<RawContent>,
    /// 到达该页后，前几次读取内容仍返回上一页的内容
    pub stale_polls: usize,
    /// 残留内容之后、完整内容之前依次显示的渲染中间状态
    pub frames: Vec<Vec<RawContent>>,
}

impl ScriptedPage {
    pub fn labels(identity: &str, labels: &[&str]) -> Self {
        Self {
            identity: identity.to_string(),
            items: labels.iter().map(|l| RawContent::Label(l.to_string())).collect(),
            stale_polls: 0,
            frames: Vec::new(),
        }
    }

    pub fn image(identity: &str, url: &str) -> Self {
        Self {
            identity: identity.to_string(),
            items: vec![RawContent::ImageUrl(url.to_string())],
            stale_polls: 0,
            frames: Vec::new(),
        }
    }

    pub fn images(identity: &str, urls: &[&str]) -> Self {
        Self {
            identity: identity.to_string(),
            items: urls.iter().map(|u| RawContent::ImageUrl(u.to_string())).collect(),
            stale_polls: 0,
            frames: Vec::new(),
        }
    }

    /// 完整内容出现前，先显示 `partial`（只渲染了一部分）
    pub fn rendering(mut self, partial: &[RawContent]) -> Self {
        self.frames.push(partial.to_vec());
        self
    }

    pub fn stale_for(mut self, polls: usize) -> Self {
        self.stale_polls = polls;
        self
    }
}

enum Layout {
    /// 按页码寻址；不存在的页码回到第一页
    Indexed(Vec<(u32, ScriptedPage)>),
    /// 按顺序点击翻页
    Sequential(Vec<ScriptedPage>),
    /// 任意页码都有一个唯一页面
    Endless,
}

pub struct ScriptedSource {
    layout: Layout,
    anchor: Option<Anchor>,
    anchor_delay: Option<Duration>,
    overlay_fails: bool,
    landing_overlay_fails: bool,
    overlay_failures: Vec<SourceError>,
    failing_gotos: Vec<u32>,
    goto_delays: Vec<(u32, Duration)>,
    /// 第几次读取标识失败（从 1 开始计数）
    failing_identity_reads: Vec<usize>,
    failing_clicks: Vec<usize>,
    click_delays: Vec<(usize, Duration)>,
    /// 第几次点击开始按钮不可用（从 1 开始计数）
    next_disabled_from: Option<usize>,
    current: Option<ScriptedPage>,
    previous_items: Vec<RawContent>,
    stale_remaining: usize,
    pending_frames: VecDeque<Vec<RawContent>>,
    position: usize,
    identity_reads: usize,
    pub goto_calls: Vec<u32>,
    pub click_calls: usize,
    pub content_queries: usize,
}

impl ScriptedSource {
    fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            anchor: Some(Anchor {
                start: PageIdentity::new("https://rema1000.dk/avis/uge-50"),
                date_label: Some("6. - 12. december".to_string()),
            }),
            anchor_delay: None,
            overlay_fails: false,
            landing_overlay_fails: false,
            overlay_failures: Vec::new(),
            failing_gotos: Vec::new(),
            goto_delays: Vec::new(),
            failing_identity_reads: Vec::new(),
            failing_clicks: Vec::new(),
            click_delays: Vec::new(),
            next_disabled_from: None,
            current: None,
            previous_items: Vec::new(),
            stale_remaining: 0,
            pending_frames: VecDeque::new(),
            position: 0,
            identity_reads: 0,
            goto_calls: Vec::new(),
            click_calls: 0,
            content_queries: 0,
        }
    }

    pub fn indexed(pages: Vec<(u32, ScriptedPage)>) -> Self {
        Self::with_layout(Layout::Indexed(pages))
    }

    pub fn sequential(pages: Vec<ScriptedPage>) -> Self {
        Self::with_layout(Layout::Sequential(pages))
    }

    pub fn endless() -> Self {
        Self::with_layout(Layout::Endless)
    }

    pub fn with_date_label(mut self, label: Option<&str>) -> Self {
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.date_label = label.map(str::to_string);
        }
        self
    }

    pub fn without_anchor(mut self) -> Self {
        self.anchor = None;
        self
    }

    pub fn with_anchor_delay(mut self, delay: Duration) -> Self {
        self.anchor_delay = Some(delay);
        self
    }

    pub fn with_failing_overlay(mut self) -> Self {
        self.overlay_fails = true;
        self
    }

    /// 落地页上的遮罩无法移除（定位首页本身仍然成功）
    pub fn with_failing_landing_overlay(mut self) -> Self {
        self.landing_overlay_fails = true;
        self
    }

    pub fn with_goto_delay(mut self, index: u32, delay: Duration) -> Self {
        self.goto_delays.push((index, delay));
        self
    }

    /// 第 `read` 次读取页面标识失败（从 1 开始计数）
    pub fn with_failing_identity(mut self, read: usize) -> Self {
        self.failing_identity_reads.push(read);
        self
    }

    /// 第 `click` 次点击返回错误（从 1 开始计数）
    pub fn with_click_error(mut self, click: usize) -> Self {
        self.failing_clicks.push(click);
        self
    }

    pub fn with_click_delay(mut self, click: usize, delay: Duration) -> Self {
        self.click_delays.push((click, delay));
        self
    }

    pub fn with_failing_goto(mut self, index: u32) -> Self {
        self.failing_gotos.push(index);
        self
    }

    pub fn with_next_disabled_from_click(mut self, click: usize) -> Self {
        self.next_disabled_from = Some(click);
        self
    }

    fn arrive(&mut self, page: ScriptedPage) {
        self.previous_items = self
            .current
            .as_ref()
            .map(|p| p.items.clone())
            .unwrap_or_default();
        self.stale_remaining = page.stale_polls;
        self.pending_frames = page.frames.iter().cloned().collect();
        self.current = Some(page);
    }

    fn first_page(&self) -> ScriptedPage {
        match &self.layout {
            Layout::Indexed(pages) => pages[0].1.clone(),
            Layout::Sequential(pages) => pages[0].clone(),
            Layout::Endless => endless_page(1),
        }
    }
}

fn endless_page(index: u32) -> ScriptedPage {
    ScriptedPage::labels(&format!("https://flyer/endless/{}", index), &["Tilbud"])
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn anchor(&mut self) -> Result<Anchor, SourceError> {
        if let Some(delay) = self.anchor_delay {
            tokio::time::sleep(delay).await;
        }
        if self.landing_overlay_fails {
            self.overlay_failures
                .push(SourceError::Script("coiOverlay is not defined".to_string()));
        }
        let anchor = self
            .anchor
            .clone()
            .ok_or_else(|| SourceError::MissingElement("a.group\\/publication".to_string()))?;
        let first = self.first_page();
        self.arrive(first);
        Ok(anchor)
    }

    async fn goto(&mut self, index: u32) -> Result<(), SourceError> {
        self.goto_calls.push(index);
        if let Some((_, delay)) = self.goto_delays.iter().find(|(i, _)| *i == index) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_gotos.contains(&index) {
            return Err(SourceError::Navigation {
                url: format!("https://flyer/{}", index),
                message: "net::ERR_ABORTED".to_string(),
            });
        }
        let page = match &self.layout {
            Layout::Indexed(pages) => pages
                .iter()
                .find(|(i, _)| *i == index)
                .map(|(_, p)| p.clone())
                .unwrap_or_else(|| pages[0].1.clone()),
            Layout::Endless => endless_page(index),
            Layout::Sequential(_) => panic!("sequential source does not support goto"),
        };
        self.arrive(page);
        Ok(())
    }

    async fn click_next(&mut self) -> Result<bool, SourceError> {
        self.click_calls += 1;
        if let Some((_, delay)) = self.click_delays.iter().find(|(n, _)| *n == self.click_calls) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_clicks.contains(&self.click_calls) {
            return Err(SourceError::Script("button.click is not a function".to_string()));
        }
        if self.next_disabled_from.is_some_and(|n| self.click_calls >= n) {
            return Ok(false);
        }
        let next = match &self.layout {
            Layout::Sequential(pages) => pages.get(self.position + 1).cloned(),
            _ => panic!("only sequential sources support clicking"),
        };
        match next {
            Some(page) => {
                self.position += 1;
                self.arrive(page);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn current_identity(&mut self) -> Result<PageIdentity, SourceError> {
        self.identity_reads += 1;
        if self.failing_identity_reads.contains(&self.identity_reads) {
            return Err(SourceError::MissingElement("page url".to_string()));
        }
        self.current
            .as_ref()
            .map(|p| PageIdentity::new(&p.identity))
            .ok_or(SourceError::NoAnchor)
    }

    async fn current_content_items(&mut self) -> Result<Vec<RawContent>, SourceError> {
        self.content_queries += 1;
        if self.stale_remaining > 0 {
            self.stale_remaining -= 1;
            return Ok(self.previous_items.clone());
        }
        if let Some(frame) = self.pending_frames.pop_front() {
            return Ok(frame);
        }
        Ok(self.current.as_ref().map(|p| p.items.clone()).unwrap_or_default())
    }

    async fn dismiss_overlays(&mut self) -> Result<(), SourceError> {
        if self.overlay_fails {
            Err(SourceError::Script("coiOverlay is not defined".to_string()))
        } else {
            Ok(())
        }
    }

    fn take_overlay_failures(&mut self) -> Vec<SourceError> {
        std::mem::take(&mut self.overlay_failures)
    }
}

/// 内存存储，记录写入次数
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    lines: Mutex<HashMap<PathBuf, Vec<String>>>,
    writes: AtomicUsize,
    exists_fails: bool,
}

impl MemoryStorage {
    /// 存在性检查总是返回 I/O 错误
    pub fn with_failing_exists() -> Self {
        Self {
            exists_fails: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn lines(&self, path: impl AsRef<Path>) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .get(path.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty() && self.lines.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        if self.exists_fails {
            return Err(StorageError::new(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    async fn append_line(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        self.lines
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default()
            .push(text.to_string());
        Ok(())
    }
}

/// 按地址返回固定内容的下载器；未登记的地址返回 404
#[derive(Default)]
pub struct ScriptedDownloader {
    bodies: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl ScriptedDownloader {
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for ScriptedDownloader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.bodies.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

pub fn settings(policy: StepPolicy, navigation: NavigationStyle, content: ContentStyle) -> HarvestSettings {
    HarvestSettings {
        max_pages: 60,
        step_policy: policy,
        navigation,
        content,
        base_path: PathBuf::from("data"),
        store: "rema".to_string(),
        timeout: Duration::from_millis(200),
        poll_retries: 3,
        poll_interval: Duration::from_millis(1),
    }
}

/// 2025-12-05 09:00，用于生成确定的会话键
pub fn december_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, 5)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}
