//! 错误类型
//!
//! 按照会话内的失败等级划分：
//! - `HarvestError`：会话级致命错误（无法定位首页）
//! - `SourceError` / `FetchError` / `StorageError` / `PersistError`：单步或单条内容的错误，
//!   由编排层记录为 `Incident` 后继续
//! - `ConfigError`：配置加载错误

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// 页面来源（浏览器）相关错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 导航失败
    #[error("导航到 {url} 失败: {message}")]
    Navigation { url: String, message: String },
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    Script(String),
    /// 页面上缺少预期元素
    #[error("未找到元素: {0}")]
    MissingElement(String),
    /// 尚未定位到海报首页
    #[error("尚未定位海报首页")]
    NoAnchor,
}

impl From<chromiumoxide::error::CdpError> for SourceError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SourceError::Script(err.to_string())
    }
}

/// 图片下载错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 服务器返回非成功状态码
    #[error("下载 {url} 失败: HTTP {status}")]
    Status { url: String, status: u16 },
    /// 网络请求失败
    #[error("下载 {url} 失败: {message}")]
    Network { url: String, message: String },
    /// 请求超时
    #[error("下载 {url} 超时")]
    Timeout { url: String },
}

/// 存储错误
#[derive(Debug, Error)]
#[error("存储操作失败 ({}): {source}", .path.display())]
pub struct StorageError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl StorageError {
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// 单条内容持久化错误
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// 会话级致命错误
#[derive(Debug, Error)]
pub enum HarvestError {
    /// 无法定位海报首页，会话无法开始
    #[error("无法定位海报首页: {0}")]
    AnchorNotFound(#[source] SourceError),
    /// 定位海报首页超时
    #[error("定位海报首页超时 ({0:?})")]
    AnchorTimeout(Duration),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 解析配置文件失败
    #[error("解析配置文件失败 ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 应用程序结果类型
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;
