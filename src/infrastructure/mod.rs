pub mod browser_source;
pub mod js_executor;
pub mod page_source;

pub use browser_source::BrowserPageSource;
pub use js_executor::JsExecutor;
pub use page_source::PageSource;
