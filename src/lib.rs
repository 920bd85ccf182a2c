//! # Flyer Harvest
//!
//! 逐页采集每周促销海报，并保证每页内容只持久化一次
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageSource` - 海报查看器抽象：定位首页、翻页、读取标识和内容
//! - `BrowserPageSource` / `JsExecutor` - 基于 chromiumoxide 的实现
//!
//! ### ② 业务能力层（Services）
//! - `SeenSet` - 去重集合（页面标识 / 内容地址）
//! - `Extractor` - 带有限重试的内容轮询
//! - `Persister` - 幂等的图片保存与标签追加
//! - `Storage` / `Downloader` - 存储与下载能力
//! - `RunLog` - 写状态日志能力
//!
//! ### ③ 流程层（Workflow）
//! - `Navigator` - 翻页状态机
//! - `StepPolicy` - 页码步进策略
//!
//! ### ④ 编排层（Orchestration）
//! - `Harvester` - 单次会话
//! - `App` - 浏览器生命周期与结果记录

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, ContentStyle, HarvestSettings, SiteSelectors};
pub use error::{FetchError, HarvestError, PersistError, Result, SourceError, StorageError};
pub use infrastructure::{BrowserPageSource, JsExecutor, PageSource};
pub use models::{
    Anchor, Artifact, ArtifactKind, ContentItem, Incident, IncidentKind, PageIdentity, PersistOutcome, RawContent,
    Session, SessionKey, SessionResult, TerminationReason,
};
pub use orchestrator::{App, Harvester};
pub use services::{Downloader, FsStorage, Persister, ReqwestDownloader, SeenSet, Storage};
pub use workflow::{NavigationStyle, Navigator, StepPolicy};
