use std::fmt;

use serde::{Deserialize, Serialize};

/// 页面标识
///
/// 通常是规范化后的 URL：去掉首尾空白和末尾的 `/`，
/// 使 `https://x/avis/3/` 与 `https://x/avis/3` 视为同一页。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageIdentity(String);

impl PageIdentity {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PageIdentity {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_separators_are_stripped() {
        let a = PageIdentity::new("https://rema1000.dk/avis/abc/3/");
        let b = PageIdentity::new("https://rema1000.dk/avis/abc/3");
        let c = PageIdentity::new("  https://rema1000.dk/avis/abc/3//  ");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "https://rema1000.dk/avis/abc/3");
    }

    #[test]
    fn test_different_pages_differ() {
        assert_ne!(
            PageIdentity::new("https://x/avis/2"),
            PageIdentity::new("https://x/avis/4")
        );
    }
}
