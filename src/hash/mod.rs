//! 哈希模块 - 统一管理哈希相关功能

pub mod strategy;

pub use strategy::{HashAlgorithm, HashStrategy, StrategyHasher};

/// 默认哈希策略
pub fn default_hash_strategy() -> HashStrategy {
    HashStrategy::default()
}

/// 哈希工具函数
#[inline]
pub fn calculate_bucket(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}
