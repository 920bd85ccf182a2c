//! 单次会话采集器 - 编排层
//!
//! ## 职责
//!
//! 把导航器、两个去重集合、提取器和持久化服务组合成一次完整的会话：
//!
//! 1. **定位首页**：失败即致命，返回带错误的结果，不产生任何产物
//! 2. **逐页迭代**：按导航方式翻页，读取页面标识，重复即结束
//! 3. **提取与持久化**：轮询新内容，逐条保存；单条失败只记录
//! 4. **结果汇总**：无论成功失败都返回 `SessionResult`
//!
//! 每一步都严格串行：查看器同一时间只显示一页。

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::HarvestSettings;
use crate::error::HarvestError;
use crate::infrastructure::PageSource;
use crate::models::{
    Artifact, Incident, IncidentKind, PageIdentity, PersistOutcome, Session, SessionResult,
    TerminationReason,
};
use crate::services::{Downloader, Extractor, Persister, PollOutcome, SeenSet, Storage};
use crate::utils::logging::{log_page_start, log_session_complete, log_session_start};
use crate::workflow::{Navigator, Step};

pub struct Harvester {
    settings: HarvestSettings,
    extractor: Extractor,
    persister: Persister,
}

/// 会话内的可变状态
struct SessionState {
    content_seen: SeenSet<String>,
    artifacts: Vec<Artifact>,
    skipped: usize,
    incidents: Vec<Incident>,
}

impl Harvester {
    pub fn new(settings: HarvestSettings, storage: Arc<dyn Storage>, downloader: Arc<dyn Downloader>) -> Self {
        let extractor = Extractor::new(
            settings.content,
            settings.poll_retries,
            settings.poll_interval,
            settings.timeout,
        );
        let persister = Persister::new(storage, downloader, settings.base_path.clone(), &settings.store);
        Self {
            settings,
            extractor,
            persister,
        }
    }

    /// 执行一次会话
    pub async fn run(&self, source: &mut dyn PageSource) -> SessionResult {
        self.run_at(source, chrono::Local::now().naive_local()).await
    }

    /// 以指定时间执行一次会话（时间只用于生成会话键）
    pub async fn run_at(&self, source: &mut dyn PageSource, now: NaiveDateTime) -> SessionResult {
        let mut nav = Navigator::new(
            self.settings.step_policy,
            self.settings.navigation,
            self.settings.max_pages,
        );
        let mut state = SessionState {
            content_seen: SeenSet::new(),
            artifacts: Vec::new(),
            skipped: 0,
            incidents: Vec::new(),
        };

        // ========== 定位首页 ==========
        nav.begin();
        let anchor = match timeout(self.settings.timeout, source.anchor()).await {
            Ok(Ok(anchor)) => anchor,
            Ok(Err(e)) => {
                error!("❌ 无法定位海报首页: {}", e);
                nav.anchor_failed();
                record_overlay_failures(source, &mut state.incidents);
                return SessionResult::failed(HarvestError::AnchorNotFound(e), state.incidents);
            }
            Err(_) => {
                error!("❌ 定位海报首页超时 ({:?})", self.settings.timeout);
                nav.anchor_failed();
                record_overlay_failures(source, &mut state.incidents);
                return SessionResult::failed(
                    HarvestError::AnchorTimeout(self.settings.timeout),
                    state.incidents,
                );
            }
        };
        nav.anchor_located();
        record_overlay_failures(source, &mut state.incidents);
        self.dismiss_overlays(source, Some(1), &mut state.incidents).await;

        let session = Session::open(&anchor, self.settings.max_pages, now);
        if session.key.is_synthetic() {
            warn!(
                "⚠️ 无法解析日期文本 {:?}，使用合成会话键 {}",
                anchor.date_label, session.key
            );
            state.incidents.push(Incident::new(
                IncidentKind::Cosmetic,
                None,
                format!("date label {:?} not parsed, using {}", anchor.date_label, session.key),
            ));
        }
        log_session_start(&session, &self.settings);

        // ========== 逐页迭代 ==========
        loop {
            let Some(page_index) = self.present_next_page(source, &mut nav, &mut state.incidents).await
            else {
                break;
            };
            log_page_start(&session, page_index);

            let identity = match self.read_identity(source, page_index, &mut state.incidents).await {
                Some(identity) => identity,
                // 第 1 页读取失败时以首页链接作为标识
                None if nav.pages_visited() == 0 => session.start.clone(),
                None => {
                    nav.terminate(TerminationReason::NoNewContent);
                    break;
                }
            };

            if !nav.observe(&identity) {
                info!("[会话 {}] 第 {} 页与已访问页面重复，海报结束", session.key, page_index);
                break;
            }

            let items = match self
                .extractor
                .poll_new(source, &state.content_seen, page_index, &identity, &mut state.incidents)
                .await
            {
                PollOutcome::Fresh(items) => items,
                // 第一步容忍：接受已显示的内容并继续翻页
                PollOutcome::Exhausted { present } if nav.pages_visited() == 0 => {
                    warn!(
                        "[会话 {}] 第 {} 页重试后没有新内容，接受已显示的 {} 条并继续",
                        session.key,
                        page_index,
                        present.len()
                    );
                    state.incidents.push(Incident::new(
                        IncidentKind::Transient,
                        Some(page_index),
                        "no new content on first step, continuing",
                    ));
                    present
                }
                PollOutcome::Exhausted { present } => {
                    info!(
                        "[会话 {}] 第 {} 页没有新内容 (可见 {} 条)，海报结束",
                        session.key,
                        page_index,
                        present.len()
                    );
                    nav.terminate(TerminationReason::NoNewContent);
                    break;
                }
            };

            for item in &items {
                match self.persister.persist(item, &session).await {
                    Ok(outcome) => {
                        if let Some(key) = item.dedup_key() {
                            state.content_seen.record(key.to_string());
                        }
                        match outcome {
                            PersistOutcome::Written(artifact) | PersistOutcome::Appended(artifact) => {
                                state.artifacts.push(artifact)
                            }
                            PersistOutcome::Skipped(_) => state.skipped += 1,
                        }
                    }
                    Err(e) => {
                        warn!("[会话 {}] ⚠️ 第 {} 页内容保存失败: {}", session.key, page_index, e);
                        state.incidents.push(Incident::new(
                            IncidentKind::NonFatal,
                            Some(page_index),
                            e.to_string(),
                        ));
                    }
                }
            }

            nav.complete_page(identity);
        }

        let result = SessionResult {
            session_key: Some(session.key.to_string()),
            artifacts: state.artifacts,
            skipped: state.skipped,
            pages_visited: nav.pages_visited(),
            visited_indices: nav.visited_indices().to_vec(),
            termination: nav.termination().unwrap_or(TerminationReason::NoNewContent),
            incidents: state.incidents,
            error: None,
        };
        log_session_complete(&result);
        result
    }

    /// 让查看器显示下一页，返回其页码；会话结束时返回 `None`
    async fn present_next_page(
        &self,
        source: &mut dyn PageSource,
        nav: &mut Navigator,
        incidents: &mut Vec<Incident>,
    ) -> Option<u32> {
        match nav.next_step() {
            Step::Stop(_) => None,
            Step::Current(index) => Some(index),
            Step::Goto(index) => {
                // 导航失败不终止：随后读到的标识会是上一页，由重复检测结束会话
                match timeout(self.settings.timeout, source.goto(index)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!("⚠️ 导航到第 {} 页失败: {}", index, e);
                        incidents.push(Incident::new(IncidentKind::Transient, Some(index), e.to_string()));
                    }
                    Err(_) => {
                        warn!("⚠️ 导航到第 {} 页超时", index);
                        incidents.push(Incident::new(
                            IncidentKind::Transient,
                            Some(index),
                            format!("navigation timed out after {:?}", self.settings.timeout),
                        ));
                    }
                }
                self.dismiss_overlays(source, Some(index), incidents).await;
                Some(index)
            }
            Step::ClickNext(index) => match timeout(self.settings.timeout, source.click_next()).await {
                Ok(Ok(true)) => Some(index),
                Ok(Ok(false)) => {
                    info!("\"下一页\"按钮不可用，海报结束");
                    nav.terminate(TerminationReason::AffordanceDisabled);
                    None
                }
                Ok(Err(e)) => {
                    warn!("⚠️ 点击下一页失败: {}", e);
                    incidents.push(Incident::new(IncidentKind::Transient, Some(index), e.to_string()));
                    nav.terminate(TerminationReason::NoNewContent);
                    None
                }
                Err(_) => {
                    warn!("⚠️ 点击下一页超时");
                    incidents.push(Incident::new(
                        IncidentKind::Transient,
                        Some(index),
                        format!("next click timed out after {:?}", self.settings.timeout),
                    ));
                    nav.terminate(TerminationReason::NoNewContent);
                    None
                }
            },
        }
    }

    async fn read_identity(
        &self,
        source: &mut dyn PageSource,
        page_index: u32,
        incidents: &mut Vec<Incident>,
    ) -> Option<PageIdentity> {
        match timeout(self.settings.timeout, source.current_identity()).await {
            Ok(Ok(identity)) => Some(identity),
            Ok(Err(e)) => {
                warn!("⚠️ 读取第 {} 页标识失败: {}", page_index, e);
                incidents.push(Incident::new(IncidentKind::Transient, Some(page_index), e.to_string()));
                None
            }
            Err(_) => {
                warn!("⚠️ 读取第 {} 页标识超时", page_index);
                incidents.push(Incident::new(
                    IncidentKind::Transient,
                    Some(page_index),
                    "identity read timed out",
                ));
                None
            }
        }
    }

    async fn dismiss_overlays(
        &self,
        source: &mut dyn PageSource,
        page_index: Option<u32>,
        incidents: &mut Vec<Incident>,
    ) {
        let failure = match timeout(self.settings.timeout, source.dismiss_overlays()).await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "overlay removal timed out".to_string(),
        };
        warn!("⚠️ 无法移除 cookie 遮罩: {}", failure);
        incidents.push(Incident::new(
            IncidentKind::Cosmetic,
            page_index,
            format!("Was not able to handle cookies properly: {}", failure),
        ));
    }
}

/// 把页面来源内部容忍的遮罩移除失败记为 `Cosmetic` 事件
fn record_overlay_failures(source: &mut dyn PageSource, incidents: &mut Vec<Incident>) {
    for failure in source.take_overlay_failures() {
        incidents.push(Incident::new(
            IncidentKind::Cosmetic,
            None,
            format!("Was not able to handle cookies properly: {}", failure),
        ));
    }
}
