//! 哈希策略模块 - 定义键到哈希值的映射
//!
//! 三种算法都只保证同一个策略实例内相等的键得到相同的哈希值，
//! 不提供密码学强度，也不抵抗针对性的碰撞攻击。
//! - `AHash`: 速度最快，分布均匀，种子固定后进程内确定
//! - `XxHash`: XxHash64，种子相同时跨进程、跨平台结果一致
//! - `Default`: 标准库 SipHash-1-3 (零密钥)，跨进程一致

use ahash::RandomState;
use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{BuildHasher, Hasher},
};
use twox_hash::XxHash64;

/// 哈希算法选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    AHash,
    XxHash,
    Default,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::AHash => "ahash",
            HashAlgorithm::XxHash => "xxhash64",
            HashAlgorithm::Default => "siphash",
        }
    }
}

/// 哈希策略 - 按选定算法构建哈希器
#[derive(Clone)]
pub struct HashStrategy {
    algorithm: HashAlgorithm,
    seed: u64,
    ahash_state: RandomState,
}

impl HashStrategy {
    /// 创建新哈希策略
    pub fn new(algorithm: HashAlgorithm, seed: u64) -> Self {
        Self {
            algorithm,
            seed,
            ahash_state: RandomState::with_seed(seed as usize),
        }
    }

    /// 获取算法类型
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// 获取种子
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for HashStrategy {
    fn default() -> Self {
        Self::new(HashAlgorithm::AHash, 42)
    }
}

impl fmt::Debug for HashStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashStrategy")
            .field("algorithm", &self.algorithm)
            .field("seed", &self.seed)
            .finish()
    }
}

impl BuildHasher for HashStrategy {
    type Hasher = StrategyHasher;

    fn build_hasher(&self) -> Self::Hasher {
        match self.algorithm {
            HashAlgorithm::AHash => StrategyHasher::AHash(self.ahash_state.build_hasher()),
            HashAlgorithm::XxHash => StrategyHasher::XxHash(XxHash64::with_seed(self.seed)),
            HashAlgorithm::Default => StrategyHasher::Sip(DefaultHasher::new()),
        }
    }
}

/// 策略哈希器 - 按算法分派
pub enum StrategyHasher {
    AHash(ahash::AHasher),
    XxHash(XxHash64),
    Sip(DefaultHasher),
}

impl Hasher for StrategyHasher {
    #[inline]
    fn finish(&self) -> u64 {
        match self {
            StrategyHasher::AHash(h) => h.finish(),
            StrategyHasher::XxHash(h) => h.finish(),
            StrategyHasher::Sip(h) => h.finish(),
        }
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        match self {
            StrategyHasher::AHash(h) => h.write(bytes),
            StrategyHasher::XxHash(h) => h.write(bytes),
            StrategyHasher::Sip(h) => h.write(bytes),
        }
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;

    /// 相同策略对相同键必须得到相同哈希
    fn check_deterministic(algorithm: HashAlgorithm) {
        let strategy = HashStrategy::new(algorithm, 7);
        let a = strategy.hash_one("test_key");
        let b = strategy.hash_one("test_key");
        assert_eq!(a, b, "相同键哈希应一致");

        let cloned = strategy.clone();
        assert_eq!(cloned.hash_one("test_key"), a, "克隆后的策略哈希应一致");
        assert_ne!(strategy.hash_one("other_key"), a);
    }

    #[test]
    fn test_ahash_deterministic() {
        check_deterministic(HashAlgorithm::AHash);
    }

    #[test]
    fn test_xxhash_deterministic() {
        check_deterministic(HashAlgorithm::XxHash);
    }

    #[test]
    fn test_default_deterministic() {
        check_deterministic(HashAlgorithm::Default);
    }

    #[test]
    fn test_xxhash_seed_changes_hash() {
        let a = HashStrategy::new(HashAlgorithm::XxHash, 1).hash_one(b"key".as_slice());
        let b = HashStrategy::new(HashAlgorithm::XxHash, 2).hash_one(b"key".as_slice());
        assert_ne!(a, b, "不同种子应产生不同哈希");
    }

    #[test]
    fn test_default_strategy() {
        let strategy = HashStrategy::default();
        assert_eq!(strategy.algorithm(), HashAlgorithm::AHash);
        assert_eq!(strategy.seed(), 42);
        assert_eq!(HashAlgorithm::XxHash.as_str(), "xxhash64");
    }
}
