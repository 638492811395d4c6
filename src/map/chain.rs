// src/map/chain.rs
//! 链实现 - 单个桶内的有序条目序列

use std::{borrow::Borrow, fmt, slice};

/// 单个桶的冲突链
///
/// 链内键两两不同，条目保持插入顺序，原位更新不移动条目。
#[derive(Clone, PartialEq, Eq)]
pub struct Chain<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for Chain<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Chain<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K, V> Chain<K, V> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 按链内顺序迭代
    pub fn iter(&self) -> slice::Iter<'_, (K, V)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<K: Eq, V> Chain<K, V> {
    /// 线性扫描，返回匹配键的位置
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries.iter().position(|(k, _)| k.borrow() == key)
    }

    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries
            .iter_mut()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// 插入或更新
    ///
    /// 键已存在时原位替换值并返回旧值，否则追加到链尾并返回 `None`。
    pub fn upsert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// 删除匹配键的条目，保持其余条目的相对顺序
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }
}

impl<'a, K, V> IntoIterator for &'a Chain<K, V> {
    type Item = &'a (K, V);
    type IntoIter = slice::Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(chain: &Chain<&'static str, i32>) -> Vec<&'static str> {
        chain.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_upsert_appends_and_updates_in_place() {
        let mut chain = Chain::new();
        assert_eq!(chain.upsert("a", 1), None);
        assert_eq!(chain.upsert("b", 2), None);
        assert_eq!(chain.upsert("c", 3), None);
        assert_eq!(chain.len(), 3);

        // 更新不移动条目
        assert_eq!(chain.upsert("a", 10), Some(1));
        assert_eq!(chain.len(), 3);
        assert_eq!(keys(&chain), vec!["a", "b", "c"]);
        assert_eq!(chain.find("a"), Some(&10));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut chain = Chain::new();
        for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
            chain.upsert(k, i as i32);
        }

        assert_eq!(chain.remove("b"), Some(1));
        assert_eq!(keys(&chain), vec!["a", "c", "d"]);

        // 删除不存在的键不改变链
        assert_eq!(chain.remove("b"), None);
        assert_eq!(keys(&chain), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_find_mut_and_borrowed_lookup() {
        let mut chain: Chain<String, i32> = Chain::new();
        chain.upsert("key".to_string(), 1);

        if let Some(v) = chain.find_mut("key") {
            *v += 1;
        }
        assert_eq!(chain.find("key"), Some(&2));
        assert_eq!(chain.position("missing"), None);

        chain.clear();
        assert!(chain.is_empty());
    }
}
