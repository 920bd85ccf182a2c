//! 编排层（Orchestration Layer）
//!
//! ### `app` - 应用入口
//! - 管理浏览器资源和状态日志
//! - 构造页面来源，运行会话，输出统计
//!
//! ### `harvester` - 单次会话采集器
//! - 组合导航器、去重集合、提取器和持久化服务
//! - 总是返回 `SessionResult`，不向外抛出错误
//!
//! ```text
//! app (持有 Browser)
//!     ↓
//! harvester (一次会话)
//!     ↓
//! workflow::Navigator (翻页状态机)
//!     ↓
//! services (能力层：dedup / extract / persist / storage / download)
//!     ↓
//! infrastructure (基础设施：PageSource / JsExecutor)
//! ```
//!
//! 不同海报的会话必须使用各自的 `Harvester` 和页面来源，不能共享同一个查看器。

pub mod app;
pub mod harvester;

pub use app::App;
pub use harvester::Harvester;
