//! 去重集合 - 业务能力层
//!
//! 同一会话内使用两个互相独立的实例：
//! - 页面标识集合：检测翻页是否回到已访问页面（终止条件）
//! - 内容地址集合：页面切换过程中旧图片可能短暂残留，避免重复下载

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::PageIdentity;

/// 只增不减的已见集合
#[derive(Debug, Clone)]
pub struct SeenSet<K = PageIdentity> {
    seen: HashSet<K>,
}

impl<K: Eq + Hash> SeenSet<K> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    pub fn seen<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.seen.contains(key)
    }

    /// 记录一个键，返回它是否第一次出现
    pub fn record(&mut self, key: K) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<K: Eq + Hash> Default for SeenSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
