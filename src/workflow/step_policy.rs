//! 翻页步进策略

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 页码步进策略
///
/// - `Uniform`：每步 +1，`1, 2, 3, 4, …`
/// - `WarmStart`：封面之后按双页展开，`1, 2, 4, 6, 8, …`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    Uniform,
    #[default]
    WarmStart,
}

impl StepPolicy {
    pub fn next(self, index: u32) -> u32 {
        match self {
            StepPolicy::Uniform => index.saturating_add(1),
            StepPolicy::WarmStart if index <= 1 => index.saturating_add(1),
            StepPolicy::WarmStart => index.saturating_add(2),
        }
    }

    /// 从第 1 页开始的前 `count` 个页码
    pub fn sequence(self, count: usize) -> Vec<u32> {
        std::iter::successors(Some(1u32), |&i| Some(self.next(i)))
            .take(count)
            .collect()
    }
}

impl FromStr for StepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(StepPolicy::Uniform),
            "warm_start" | "warmstart" | "warm-start" => Ok(StepPolicy::WarmStart),
            other => Err(format!("未知的步进策略: {}", other)),
        }
    }
}

/// 翻页方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStyle {
    /// 直接按页码导航（`{海报链接}/{页码}`）
    #[default]
    Indexed,
    /// 点击"下一页"按钮
    ClickNext,
}

impl FromStr for NavigationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indexed" => Ok(NavigationStyle::Indexed),
            "click_next" | "clicknext" | "click-next" => Ok(NavigationStyle::ClickNext),
            other => Err(format!("未知的翻页方式: {}", other)),
        }
    }
}
