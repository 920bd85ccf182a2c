//! 页面内容与持久化产物

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::PageIdentity;

/// 页面来源报告的原始内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContent {
    /// 商品标签（aria-label 文本）
    Label(String),
    /// 海报图片地址
    ImageUrl(String),
}

/// 图片扩展名，由图片地址推断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageExt {
    Webp,
    Jpg,
}

impl ImageExt {
    /// 地址中包含 `.webp` 时为 webp，否则一律按 jpg 保存
    pub fn from_url(url: &str) -> Self {
        if url.to_ascii_lowercase().contains(".webp") {
            ImageExt::Webp
        } else {
            ImageExt::Jpg
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageExt::Webp => "webp",
            ImageExt::Jpg => "jpg",
        }
    }
}

impl fmt::Display for ImageExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条内容的类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Offer { label: String },
    Image { url: String, ext: ImageExt },
}

/// 从页面中提取出的一条内容
///
/// 以 `(page_index, identity)` 定位来源页；`ordinal` 为该条内容在页内的序号（从 0 开始）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub page_index: u32,
    pub identity: PageIdentity,
    pub ordinal: usize,
    pub kind: ContentKind,
}

impl ContentItem {
    pub fn from_raw(raw: RawContent, page_index: u32, identity: PageIdentity, ordinal: usize) -> Self {
        let kind = match raw {
            RawContent::Label(label) => ContentKind::Offer { label },
            RawContent::ImageUrl(url) => {
                let ext = ImageExt::from_url(&url);
                ContentKind::Image { url, ext }
            }
        };
        Self {
            page_index,
            identity,
            ordinal,
            kind,
        }
    }

    /// 内容去重键
    ///
    /// 只有图片按地址去重；商品标签没有去重键。
    pub fn dedup_key(&self) -> Option<&str> {
        match &self.kind {
            ContentKind::Image { url, .. } => Some(url),
            ContentKind::Offer { .. } => None,
        }
    }
}

/// 产物类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// 整个图片文件
    ImageFile,
    /// 追加到日志文件中的一行
    LogLine,
}

/// 已持久化的产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub page_index: u32,
}

/// 持久化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// 新写入的图片
    Written(Artifact),
    /// 追加的一行标签
    Appended(Artifact),
    /// 目标已存在，未做任何写入
    Skipped(PathBuf),
}

impl PersistOutcome {
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            PersistOutcome::Written(a) | PersistOutcome::Appended(a) => Some(a),
            PersistOutcome::Skipped(_) => None,
        }
    }
}
