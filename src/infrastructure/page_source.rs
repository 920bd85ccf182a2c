//! 页面来源 - 基础设施层
//!
//! 海报查看器的抽象：一次只显示一页，所有调用必须串行。
//! 具体实现可以是浏览器（`BrowserPageSource`），也可以是测试中的脚本化来源。

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::{Anchor, PageIdentity, RawContent};

#[async_trait]
pub trait PageSource: Send {
    /// 定位海报首页，成功后查看器停留在第 1 页
    async fn anchor(&mut self) -> Result<Anchor, SourceError>;

    /// 直接导航到第 `index` 页
    async fn goto(&mut self, index: u32) -> Result<(), SourceError>;

    /// 点击"下一页"；按钮不存在或不可用时返回 `false`
    async fn click_next(&mut self) -> Result<bool, SourceError>;

    /// 当前页面标识
    async fn current_identity(&mut self) -> Result<PageIdentity, SourceError>;

    /// 当前页面上可见的原始内容
    async fn current_content_items(&mut self) -> Result<Vec<RawContent>, SourceError>;

    /// 移除 cookie 遮罩等干扰层
    async fn dismiss_overlays(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// 取出来源内部容忍下来的遮罩移除失败（例如定位首页时落地页上的遮罩）
    fn take_overlay_failures(&mut self) -> Vec<SourceError> {
        Vec::new()
    }
}
