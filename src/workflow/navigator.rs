//! 翻页导航器 - 流程层
//!
//! 状态机：`Init → LocatingFirst → Iterating → Terminated`，或在首页定位失败时进入 `Failed`。
//! 导航器不做任何 IO，只决定下一步做什么；终止状态不可恢复。

use tracing::{debug, warn};

use crate::models::{PageIdentity, TerminationReason};
use crate::services::SeenSet;
use crate::workflow::{NavigationStyle, StepPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Init,
    LocatingFirst,
    Iterating { page_index: u32 },
    Terminated(TerminationReason),
    Failed,
}

/// 下一步动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// 查看器已停留在该页（点击翻页方式的第 1 页）
    Current(u32),
    /// 直接导航到该页
    Goto(u32),
    /// 点击"下一页"，到达该页
    ClickNext(u32),
    /// 会话结束
    Stop(TerminationReason),
}

pub struct Navigator {
    state: NavState,
    policy: StepPolicy,
    style: NavigationStyle,
    max_pages: u32,
    pages_seen: SeenSet<PageIdentity>,
    visited: Vec<u32>,
}

impl Navigator {
    pub fn new(policy: StepPolicy, style: NavigationStyle, max_pages: u32) -> Self {
        Self {
            state: NavState::Init,
            policy,
            style,
            max_pages,
            pages_seen: SeenSet::new(),
            visited: Vec::new(),
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, NavState::Terminated(_) | NavState::Failed)
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        match self.state {
            NavState::Terminated(reason) => Some(reason),
            NavState::Failed => Some(TerminationReason::AnchorNotFound),
            _ => None,
        }
    }

    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }

    pub fn visited_indices(&self) -> &[u32] {
        &self.visited
    }

    /// 开始定位首页
    pub fn begin(&mut self) {
        self.transition(NavState::Init, NavState::LocatingFirst);
    }

    /// 首页定位成功，从第 1 页开始迭代
    pub fn anchor_located(&mut self) {
        self.transition(NavState::LocatingFirst, NavState::Iterating { page_index: 1 });
    }

    /// 首页定位失败（致命）
    pub fn anchor_failed(&mut self) {
        self.transition(NavState::LocatingFirst, NavState::Failed);
    }

    /// 决定下一步；页码超过上限时直接终止
    pub fn next_step(&mut self) -> Step {
        let page_index = match self.state {
            NavState::Iterating { page_index } => page_index,
            NavState::Terminated(reason) => return Step::Stop(reason),
            NavState::Init | NavState::LocatingFirst | NavState::Failed => {
                return Step::Stop(TerminationReason::AnchorNotFound)
            }
        };

        if page_index > self.max_pages {
            debug!("页码 {} 超过上限 {}，停止翻页", page_index, self.max_pages);
            self.terminate(TerminationReason::PageCapReached);
            return Step::Stop(TerminationReason::PageCapReached);
        }

        match (self.style, page_index) {
            (NavigationStyle::ClickNext, 1) => Step::Current(1),
            (NavigationStyle::ClickNext, i) => Step::ClickNext(i),
            (NavigationStyle::Indexed, i) => Step::Goto(i),
        }
    }

    /// 检查当前页标识；已访问过则终止并返回 `false`
    pub fn observe(&mut self, identity: &PageIdentity) -> bool {
        if self.is_terminal() {
            return false;
        }
        if self.pages_seen.seen(identity) {
            debug!("页面 {} 已访问过，停止翻页", identity);
            self.terminate(TerminationReason::RepeatedIdentity);
            return false;
        }
        true
    }

    /// 当前页处理完成：记录标识并按步进策略前进
    pub fn complete_page(&mut self, identity: PageIdentity) {
        let NavState::Iterating { page_index } = self.state else {
            warn!("导航器处于 {:?}，忽略页面完成事件", self.state);
            return;
        };
        self.pages_seen.record(identity);
        self.visited.push(page_index);
        self.state = NavState::Iterating {
            page_index: self.policy.next(page_index),
        };
    }

    /// 结束迭代；只有迭代中的会话可以终止
    pub fn terminate(&mut self, reason: TerminationReason) {
        if let NavState::Iterating { .. } = self.state {
            self.state = NavState::Terminated(reason);
        } else {
            warn!("导航器处于 {:?}，忽略终止请求 ({})", self.state, reason);
        }
    }

    fn transition(&mut self, from: NavState, to: NavState) {
        if self.state == from {
            self.state = to;
        } else {
            warn!("非法状态转换: {:?} → {:?} (当前 {:?})", from, to, self.state);
        }
    }
}
