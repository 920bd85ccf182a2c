//! 会话结果

use std::fmt;

use crate::error::HarvestError;

use super::Artifact;

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// 页面标识重复（翻页回到了已访问过的页面）
    RepeatedIdentity,
    /// "下一页"按钮不可用或不存在
    AffordanceDisabled,
    /// 达到最大页数上限
    PageCapReached,
    /// 重试后仍没有新内容，视为海报结束
    NoNewContent,
    /// 无法定位首页
    AnchorNotFound,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::RepeatedIdentity => "repeated identity",
            TerminationReason::AffordanceDisabled => "affordance disabled",
            TerminationReason::PageCapReached => "page cap reached",
            TerminationReason::NoNewContent => "no new content",
            TerminationReason::AnchorNotFound => "anchor not found",
        };
        f.write_str(text)
    }
}

/// 被记录下来而未中断会话的失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentKind {
    /// 等待页面或轮询内容失败，按"本步无新内容"处理
    Transient,
    /// 单条内容下载或写入失败
    NonFatal,
    /// 关闭 cookie 弹窗等装饰性操作失败
    Cosmetic,
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IncidentKind::Transient => "Transient",
            IncidentKind::NonFatal => "Error",
            IncidentKind::Cosmetic => "Cosmetic",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub kind: IncidentKind,
    pub page_index: Option<u32>,
    pub message: String,
}

impl Incident {
    pub fn new(kind: IncidentKind, page_index: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            kind,
            page_index,
            message: message.into(),
        }
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page_index {
            Some(index) => write!(f, "[{}] 第 {} 页: {}", self.kind, index, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// 一次会话的结果，即使致命失败也总会返回
#[derive(Debug)]
pub struct SessionResult {
    pub session_key: Option<String>,
    pub artifacts: Vec<Artifact>,
    pub skipped: usize,
    pub pages_visited: usize,
    /// 实际处理过的页码序列
    pub visited_indices: Vec<u32>,
    pub termination: TerminationReason,
    pub incidents: Vec<Incident>,
    pub error: Option<HarvestError>,
}

impl SessionResult {
    pub fn failed(error: HarvestError, incidents: Vec<Incident>) -> Self {
        Self {
            session_key: None,
            artifacts: Vec::new(),
            skipped: 0,
            pages_visited: 0,
            visited_indices: Vec::new(),
            termination: TerminationReason::AnchorNotFound,
            incidents,
            error: Some(error),
        }
    }

    pub fn artifacts_written(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
