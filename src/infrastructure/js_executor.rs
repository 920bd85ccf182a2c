//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航 / 读取地址 / 执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::SourceError;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 navigate() / url() / eval() 能力
/// - 不认识海报、页码或会话
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 导航到指定地址并等待加载完成
    pub async fn navigate(&self, url: &str) -> Result<(), SourceError> {
        debug!("导航到: {}", url);
        let to_navigation_error = |e: chromiumoxide::error::CdpError| SourceError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };
        self.page.goto(url).await.map_err(to_navigation_error)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(to_navigation_error)?;
        Ok(())
    }

    /// 当前页面地址
    pub async fn url(&self) -> Result<Option<String>, SourceError> {
        Ok(self.page.url().await?)
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, SourceError> {
        let result = self.page.evaluate(js_code.into()).await?;
        result
            .into_value()
            .map_err(|e| SourceError::Script(e.to_string()))
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T, SourceError> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value).map_err(|e| SourceError::Script(e.to_string()))
    }
}
