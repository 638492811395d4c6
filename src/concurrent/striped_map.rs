// src/concurrent/striped_map.rs
//! 分段锁哈希表 - 每个桶一把读写锁

use crate::{
    error::ChainedError,
    hash::{calculate_bucket, HashStrategy},
    log_debug, log_warn,
    map::{Chain, ChainedMap, ChainedMapConfig, ChainedParts},
    stats::{AtomicOperationStats, OperationRecorder, OperationStatsSnapshot},
    types::{BucketCount, OperationType},
};
use parking_lot::RwLock;
use rayon::prelude::*;
use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// 分段锁哈希表
///
/// 语义与 [`ChainedMap`] 相同，但每个桶由独立的 `RwLock` 保护，
/// 不同桶上的操作可以并发执行。桶数同样固定不变。
pub struct StripedMap<K, V, S = HashStrategy> {
    buckets: Vec<RwLock<Chain<K, V>>>,
    bucket_count: BucketCount,
    hash_builder: S,
    len: AtomicUsize,
    load_warn_threshold: f32,
    load_warned: AtomicBool,
    stats: AtomicOperationStats,
}

impl<K, V> StripedMap<K, V, HashStrategy> {
    pub fn new(bucket_count: usize) -> Result<Self, ChainedError> {
        Self::with_config(ChainedMapConfig {
            bucket_count,
            ..ChainedMapConfig::default()
        })
    }

    pub fn with_config(config: ChainedMapConfig) -> Result<Self, ChainedError> {
        let bucket_count = config.validate()?;
        log_debug!(
            "created striped map: buckets={}, algorithm={}",
            bucket_count,
            config.hash_algorithm.as_str()
        );
        let mut parts = ChainedParts::empty(bucket_count, config.hash_strategy());
        parts.load_warn_threshold = config.load_warn_threshold;
        Ok(Self::from_parts(parts))
    }
}

impl<K, V, S> StripedMap<K, V, S> {
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Result<Self, ChainedError> {
        let bucket_count = BucketCount::new(bucket_count)?;
        Ok(Self::from_parts(ChainedParts::empty(bucket_count, hash_builder)))
    }

    fn from_parts(parts: ChainedParts<K, V, S>) -> Self {
        let len = parts.chains.iter().map(Chain::len).sum();
        Self {
            buckets: parts.chains.into_iter().map(RwLock::new).collect(),
            bucket_count: parts.bucket_count,
            hash_builder: parts.hash_builder,
            len: AtomicUsize::new(len),
            load_warn_threshold: parts.load_warn_threshold,
            load_warned: AtomicBool::new(parts.load_warned),
            stats: AtomicOperationStats::from_snapshot(&parts.operations),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count.get()
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.bucket_count() as f32
    }

    pub fn load_warn_threshold(&self) -> f32 {
        self.load_warn_threshold
    }

    /// 当前是否处于超阈值告警状态
    pub fn load_warned(&self) -> bool {
        self.load_warned.load(Ordering::Acquire)
    }

    /// 获取操作统计快照
    pub fn operation_stats(&self) -> OperationStatsSnapshot {
        self.stats.snapshot()
    }

    /// 转回单线程哈希表，保留阈值、告警状态与操作统计
    pub fn into_inner(self) -> ChainedMap<K, V, S> {
        ChainedMap::from_parts(ChainedParts {
            operations: self.stats.snapshot(),
            bucket_count: self.bucket_count,
            hash_builder: self.hash_builder,
            chains: self.buckets.into_iter().map(RwLock::into_inner).collect(),
            load_warn_threshold: self.load_warn_threshold,
            load_warned: self.load_warned.into_inner(),
        })
    }

    fn check_load(&self) {
        let load_factor = self.load_factor();
        if load_factor > self.load_warn_threshold && !self.load_warned.swap(true, Ordering::AcqRel) {
            log_warn!(
                "load factor {:.2} exceeds threshold {:.2} (entries={}, buckets={}); table does not resize",
                load_factor,
                self.load_warn_threshold,
                self.len(),
                self.bucket_count()
            );
        }
    }
}

impl<K, V, S> StripedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn index_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        calculate_bucket(self.hash_builder.hash_one(key), self.bucket_count())
    }

    /// 插入或更新，返回旧值
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let index = self.index_of(&key);
        let previous = self.buckets[index].write().upsert(key, value);

        if previous.is_some() {
            self.stats.record(OperationType::Update, true);
        } else {
            self.len.fetch_add(1, Ordering::AcqRel);
            self.stats.record(OperationType::Insert, true);
            self.check_load();
        }
        previous
    }

    /// 在读锁内访问值
    pub fn with_value<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Result<R, ChainedError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let chain = self.buckets[self.index_of(key)].read();
        let found = chain.find(key);
        self.stats.record(OperationType::Get, found.is_some());
        found.map(f).ok_or_else(|| ChainedError::key_not_found(&key))
    }

    /// 查询并克隆值
    pub fn get<Q>(&self, key: &Q) -> Result<V, ChainedError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        V: Clone,
    {
        self.with_value(key, V::clone)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets[self.index_of(key)].read().position(key).is_some()
    }

    pub fn delete<Q>(&self, key: &Q) -> Result<V, ChainedError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let removed = self.buckets[self.index_of(key)].write().remove(key);
        match removed {
            Some(value) => {
                self.len.fetch_sub(1, Ordering::AcqRel);
                if self.load_factor() <= self.load_warn_threshold {
                    self.load_warned.store(false, Ordering::Release);
                }
                self.stats.record(OperationType::Remove, true);
                Ok(value)
            }
            None => {
                self.stats.record(OperationType::Remove, false);
                Err(ChainedError::key_not_found(&key))
            }
        }
    }
}

impl<K, V, S> StripedMap<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Sync,
{
    /// 并行批量插入，返回新增条目数
    pub fn par_insert(&self, items: Vec<(K, V)>) -> usize {
        let total = items.len();
        let inserted = items
            .into_par_iter()
            .map(|(k, v)| usize::from(self.insert(k, v).is_none()))
            .sum();
        log_debug!("parallel insert: {} items, {} new", total, inserted);
        inserted
    }
}

impl<K, V, S> From<ChainedMap<K, V, S>> for StripedMap<K, V, S> {
    fn from(map: ChainedMap<K, V, S>) -> Self {
        Self::from_parts(map.into_parts())
    }
}

impl<K, V, S> fmt::Debug for StripedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripedMap")
            .field("size", &self.len())
            .field("bucket_count", &self.bucket_count())
            .field("load_factor", &self.load_factor())
            .finish()
    }
}
