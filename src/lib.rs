//! Rust固定桶数拉链哈希表库
//!
//! 以 `hash(key) % bucket_count` 定位桶，桶内按插入顺序线性扫描解决冲突。
//!
//! ## 主要特性
//! - 桶数在构造时确定，之后不扩容、不重哈希
//! - 可选哈希算法 (AHash / XxHash64 / SipHash)，也可传入任意 `BuildHasher`
//! - 键不存在时返回 `KeyNotFound` 错误而不是 panic
//! - 操作统计与Prometheus格式导出
//! - 可选的分段锁并发版本 `StripedMap`
//!
//! ## 快速开始
//!
//! ```rust
//! use chained_hashtable::*;
//!
//! fn main() -> Result<(), ChainedError> {
//!     // 创建100个桶的哈希表
//!     let mut map = ChainedMap::new(100)?;
//!
//!     // 插入键值对
//!     map.insert("a", 1);
//!     map.insert("b", 2);
//!
//!     // 获取值
//!     assert_eq!(map.get("a")?, &1);
//!
//!     // 删除键
//!     map.delete("b")?;
//!     assert!(map.get("b").unwrap_err().is_key_not_found());
//!
//!     // 打印统计信息
//!     println!("{:?}", map.stats());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

// 核心模块导出
pub mod concurrent;
pub mod error;
pub mod hash;
pub mod map;
pub mod stats;
pub mod types;

use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
};

// 公共接口导出
pub use crate::{
    concurrent::StripedMap,
    error::ChainedError,
    hash::{calculate_bucket, default_hash_strategy, HashAlgorithm, HashStrategy},
    map::{Chain, ChainedMap, ChainedMapConfig, ChainedMapStats, DEFAULT_BUCKET_COUNT},
    stats::{OperationRecorder, OperationStatsSnapshot},
    types::{BucketCount, ByteKey, OperationType},
};

// 便捷功能函数

/// 批量插入，返回新增条目数 (更新已有键不计入)
pub fn batch_insert<K, V, S>(map: &mut ChainedMap<K, V, S>, items: impl IntoIterator<Item = (K, V)>) -> usize
where
    K: Hash + Eq,
    S: BuildHasher,
{
    let mut count = 0;
    for (k, v) in items {
        if map.insert(k, v).is_none() {
            count += 1;
        }
    }
    log_debug!("batch insert: {} new entries", count);
    count
}

/// 批量查询，不存在的键对应 `None`
pub fn batch_get<'a, K, V, S, Q>(
    map: &'a ChainedMap<K, V, S>,
    keys: impl IntoIterator<Item = &'a Q>,
) -> Vec<Option<&'a V>>
where
    K: Hash + Eq + Borrow<Q>,
    S: BuildHasher,
    Q: Hash + Eq + fmt::Debug + ?Sized + 'a,
{
    keys.into_iter().map(|k| map.get(k).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_helpers() {
        let mut map: ChainedMap<String, String> = ChainedMap::new(8).unwrap();
        let items = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "3".to_string()),
        ];
        assert_eq!(batch_insert(&mut map, items), 2);

        let values = batch_get(&map, ["a", "b", "c"]);
        assert_eq!(values, vec![Some(&"3".to_string()), Some(&"2".to_string()), None]);
    }
}
