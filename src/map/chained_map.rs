//! 拉链哈希表 - 固定桶数，桶内线性扫描解决冲突

use crate::{
    error::ChainedError,
    hash::{calculate_bucket, HashAlgorithm, HashStrategy},
    log_debug, log_warn,
    map::chain::Chain,
    stats::{AtomicOperationStats, OperationRecorder, OperationStatsSnapshot},
    types::{BucketCount, OperationType},
};
use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
    iter::FusedIterator,
    slice,
};

/// 哈希表配置
#[derive(Clone, Debug, PartialEq)]
pub struct ChainedMapConfig {
    /// 桶数量，构造后不可变
    pub bucket_count: usize,
    pub hash_algorithm: HashAlgorithm,
    pub seed: u64,
    /// 平均链长超过该值时记录一次警告；删除或清空使负载回落到阈值以内后，
    /// 再次越过阈值会重新告警
    pub load_warn_threshold: f32,
}

impl Default for ChainedMapConfig {
    fn default() -> Self {
        Self {
            bucket_count: super::DEFAULT_BUCKET_COUNT,
            hash_algorithm: HashAlgorithm::AHash,
            seed: 42,
            load_warn_threshold: 2.0,
        }
    }
}

impl ChainedMapConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<BucketCount, ChainedError> {
        if !self.load_warn_threshold.is_finite() || self.load_warn_threshold <= 0.0 {
            return Err(ChainedError::invalid_config(format!(
                "负载告警阈值必须为正有限数，实际为 {}",
                self.load_warn_threshold
            )));
        }
        BucketCount::new(self.bucket_count)
    }

    /// 按配置构建哈希策略
    pub fn hash_strategy(&self) -> HashStrategy {
        HashStrategy::new(self.hash_algorithm, self.seed)
    }
}

/// 哈希表统计信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChainedMapStats {
    pub size: usize,
    pub bucket_count: usize,
    pub load_factor: f32,
    pub longest_chain: usize,
    pub empty_buckets: usize,
    /// 当前是否处于超阈值告警状态
    pub load_warned: bool,
    pub operations: OperationStatsSnapshot,
}

/// 哈希表的完整内部状态，用于与 [`StripedMap`](crate::concurrent::StripedMap) 互相转换
pub(crate) struct ChainedParts<K, V, S> {
    pub(crate) bucket_count: BucketCount,
    pub(crate) hash_builder: S,
    pub(crate) chains: Vec<Chain<K, V>>,
    pub(crate) load_warn_threshold: f32,
    pub(crate) load_warned: bool,
    pub(crate) operations: OperationStatsSnapshot,
}

impl<K, V, S> ChainedParts<K, V, S> {
    /// 空链，阈值取默认配置
    pub(crate) fn empty(bucket_count: BucketCount, hash_builder: S) -> Self {
        Self {
            bucket_count,
            hash_builder,
            chains: (0..bucket_count.get()).map(|_| Chain::new()).collect(),
            load_warn_threshold: ChainedMapConfig::default().load_warn_threshold,
            load_warned: false,
            operations: OperationStatsSnapshot::default(),
        }
    }
}

/// 固定桶数的拉链哈希表
///
/// 桶索引为 `hash(key) % bucket_count`，桶数在构造后不再变化，不做扩容或重哈希。
/// 哈希分布良好时各操作平均 O(1)；所有键落入同一个桶时退化为 O(n)。
///
/// 不做内部同步，多线程访问需由调用方串行化，或使用
/// [`StripedMap`](crate::concurrent::StripedMap)。
pub struct ChainedMap<K, V, S = HashStrategy> {
    buckets: Vec<Chain<K, V>>,
    bucket_count: BucketCount,
    hash_builder: S,
    len: usize,
    load_warn_threshold: f32,
    load_warned: bool,
    stats: AtomicOperationStats,
}

impl<K, V> ChainedMap<K, V, HashStrategy> {
    /// 以默认哈希策略创建，`bucket_count` 为 0 时返回无效配置错误
    pub fn new(bucket_count: usize) -> Result<Self, ChainedError> {
        Self::with_config(ChainedMapConfig {
            bucket_count,
            ..ChainedMapConfig::default()
        })
    }

    /// 按配置创建
    pub fn with_config(config: ChainedMapConfig) -> Result<Self, ChainedError> {
        let bucket_count = config.validate()?;
        let mut parts = ChainedParts::empty(bucket_count, config.hash_strategy());
        parts.load_warn_threshold = config.load_warn_threshold;
        let map = Self::from_parts(parts);
        log_debug!(
            "created chained map: buckets={}, algorithm={}, seed={}",
            bucket_count,
            config.hash_algorithm.as_str(),
            config.seed
        );
        Ok(map)
    }
}

impl<K, V, S> ChainedMap<K, V, S> {
    /// 使用调用方提供的哈希构建器创建
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Result<Self, ChainedError> {
        let bucket_count = BucketCount::new(bucket_count)?;
        log_debug!("created chained map with custom hasher: buckets={}", bucket_count);
        Ok(Self::from_parts(ChainedParts::empty(bucket_count, hash_builder)))
    }

    /// 由完整状态重建，链数必须等于桶数
    pub(crate) fn from_parts(parts: ChainedParts<K, V, S>) -> Self {
        debug_assert_eq!(parts.chains.len(), parts.bucket_count.get());
        Self {
            len: parts.chains.iter().map(Chain::len).sum(),
            buckets: parts.chains,
            bucket_count: parts.bucket_count,
            hash_builder: parts.hash_builder,
            load_warn_threshold: parts.load_warn_threshold,
            load_warned: parts.load_warned,
            stats: AtomicOperationStats::from_snapshot(&parts.operations),
        }
    }

    /// 拆分为完整状态
    pub(crate) fn into_parts(self) -> ChainedParts<K, V, S> {
        ChainedParts {
            operations: self.stats.snapshot(),
            bucket_count: self.bucket_count,
            hash_builder: self.hash_builder,
            chains: self.buckets,
            load_warn_threshold: self.load_warn_threshold,
            load_warned: self.load_warned,
        }
    }

    /// 桶数量
    pub fn bucket_count(&self) -> usize {
        self.bucket_count.get()
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 负载因子 (条目数 / 桶数)
    pub fn load_factor(&self) -> f32 {
        self.len as f32 / self.bucket_count() as f32
    }

    /// 指定桶的链长，索引越界返回 `None`
    pub fn chain_len(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(Chain::len)
    }

    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// 负载告警阈值
    pub fn load_warn_threshold(&self) -> f32 {
        self.load_warn_threshold
    }

    /// 清空所有条目，桶数不变
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
        self.load_warned = false;
    }

    /// 按桶顺序、链内顺序迭代
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// 获取统计信息
    pub fn stats(&self) -> ChainedMapStats {
        let mut longest_chain = 0;
        let mut empty_buckets = 0;
        for chain in &self.buckets {
            longest_chain = longest_chain.max(chain.len());
            if chain.is_empty() {
                empty_buckets += 1;
            }
        }

        ChainedMapStats {
            size: self.len,
            bucket_count: self.bucket_count(),
            load_factor: self.load_factor(),
            longest_chain,
            empty_buckets,
            load_warned: self.load_warned,
            operations: self.stats.snapshot(),
        }
    }

    /// 导出Prometheus格式指标
    pub fn export_prometheus(&self) -> String {
        let mut out = self.stats.export_prometheus();
        out.push_str("# TYPE chained_hashtable_entries gauge\n");
        out.push_str(&format!("chained_hashtable_entries {}\n", self.len));
        out.push_str("# TYPE chained_hashtable_buckets gauge\n");
        out.push_str(&format!("chained_hashtable_buckets {}\n", self.bucket_count()));
        out
    }
}

impl<K, V, S> ChainedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// 计算键所在的桶索引
    pub fn index_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        calculate_bucket(self.hash_builder.hash_one(key), self.bucket_count())
    }

    /// 插入或更新
    ///
    /// 键已存在时原位替换值并返回旧值，条目数不变；否则追加到链尾并返回 `None`。
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = self.index_of(&key);
        let previous = self.buckets[index].upsert(key, value);

        if previous.is_some() {
            self.stats.record(OperationType::Update, true);
        } else {
            self.len += 1;
            self.stats.record(OperationType::Insert, true);
            self.check_load();
        }
        previous
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets[self.index_of(key)].position(key).is_some()
    }

    fn check_load(&mut self) {
        if !self.load_warned && self.load_factor() > self.load_warn_threshold {
            self.load_warned = true;
            log_warn!(
                "load factor {:.2} exceeds threshold {:.2} (entries={}, buckets={}); table does not resize",
                self.load_factor(),
                self.load_warn_threshold,
                self.len,
                self.bucket_count()
            );
        }
    }

    /// 查询键对应的值，不存在时返回 `KeyNotFound`
    pub fn get<Q>(&self, key: &Q) -> Result<&V, ChainedError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let found = self.buckets[self.index_of(key)].find(key);
        self.stats.record(OperationType::Get, found.is_some());
        found.ok_or_else(|| ChainedError::key_not_found(&key))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, ChainedError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let index = self.index_of(key);
        let found = self.buckets[index].find_mut(key);
        self.stats.record(OperationType::Get, found.is_some());
        found.ok_or_else(|| ChainedError::key_not_found(&key))
    }

    /// 删除键并返回其值，不存在时返回 `KeyNotFound` 且不修改表
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V, ChainedError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let index = self.index_of(key);
        match self.buckets[index].remove(key) {
            Some(value) => {
                self.len -= 1;
                if self.load_factor() <= self.load_warn_threshold {
                    self.load_warned = false;
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

impl<K, V, S> fmt::Debug for ChainedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Clone for ChainedMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            bucket_count: self.bucket_count,
            hash_builder: self.hash_builder.clone(),
            len: self.len,
            load_warn_threshold: self.load_warn_threshold,
            load_warned: self.load_warned,
            stats: self.stats.clone(),
        }
    }
}

impl<K, V> Default for ChainedMap<K, V, HashStrategy> {
    fn default() -> Self {
        let config = &*super::DEFAULT_CONFIG;
        let bucket_count =
            BucketCount::new(config.bucket_count).unwrap_or(BucketCount::DEFAULT);
        let mut parts = ChainedParts::empty(bucket_count, config.hash_strategy());
        parts.load_warn_threshold = config.load_warn_threshold;
        Self::from_parts(parts)
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for ChainedMap<K, V, HashStrategy> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// 哈希表迭代器
pub struct Iter<'a, K, V> {
    buckets: slice::Iter<'a, Chain<K, V>>,
    current: Option<slice::Iter<'a, (K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, v)) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((k, v));
            }
            self.current = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a ChainedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::{BuildHasherDefault, Hasher};

    /// 所有键哈希为同一值，强制冲突
    #[derive(Default)]
    struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            7
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    type CollidingMap<K, V> = ChainedMap<K, V, BuildHasherDefault<ConstantHasher>>;

    #[test]
    fn test_concrete_scenario() {
        let mut map = ChainedMap::new(100).unwrap();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("c", 3);

        assert_eq!(map.get("a"), Ok(&1));
        assert_eq!(map.get("b"), Ok(&2));

        assert_eq!(map.delete("b"), Ok(2));
        let err = map.get("b").unwrap_err();
        assert!(err.is_key_not_found());
        assert_eq!(map.get("a"), Ok(&1));
        assert_eq!(map.get("c"), Ok(&3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_construction_validation() {
        assert!(matches!(
            ChainedMap::<u64, u64>::new(0),
            Err(ChainedError::InvalidConfiguration { .. })
        ));
        let map = ChainedMap::<u64, u64>::new(1).unwrap();
        assert_eq!(map.bucket_count(), 1);
        assert!(map.is_empty());

        let config = ChainedMapConfig {
            load_warn_threshold: f32::NAN,
            ..ChainedMapConfig::default()
        };
        assert!(ChainedMap::<u64, u64>::with_config(config).is_err());
        assert!(ChainedMap::<u64, u64, HashStrategy>::with_hasher(0, HashStrategy::default()).is_err());
    }

    #[test]
    fn test_update_does_not_grow() {
        let mut map = ChainedMap::new(8).unwrap();
        assert_eq!(map.insert("k".to_string(), 1), None);
        assert_eq!(map.insert("k".to_string(), 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("k"), Ok(&2));

        let stats = map.stats();
        assert_eq!(stats.operations.insert_count, 1);
        assert_eq!(stats.operations.update_count, 1);
    }

    #[test]
    fn test_single_bucket_collisions() {
        let mut map = ChainedMap::new(1).unwrap();
        map.insert("x", 10);
        map.insert("y", 20);
        map.insert("z", 30);

        assert_eq!(map.chain_len(0), Some(3));
        assert_eq!(map.get("x"), Ok(&10));
        assert_eq!(map.get("y"), Ok(&20));
        assert_eq!(map.get("z"), Ok(&30));
    }

    #[test]
    fn test_custom_hasher_collisions_preserve_order() {
        let mut map: CollidingMap<u32, &str> =
            ChainedMap::with_hasher(16, BuildHasherDefault::default()).unwrap();
        for (k, v) in [(1, "one"), (2, "two"), (3, "three"), (4, "four")] {
            map.insert(k, v);
        }
        assert_eq!(map.chain_len(7), Some(4));

        map.insert(2, "TWO");
        map.delete(&3).unwrap();
        let order: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(order, vec![(1, "one"), (2, "TWO"), (4, "four")]);

        // 删除失败时链不变
        assert!(map.delete(&3).is_err());
        assert_eq!(map.len(), 3);
        assert_eq!(map.chain_len(7), Some(3));
    }

    #[test]
    fn test_get_mut_and_contains() {
        let mut map = ChainedMap::new(4).unwrap();
        map.insert("counter".to_string(), 0);
        *map.get_mut("counter").unwrap() += 5;
        assert_eq!(map.get("counter"), Ok(&5));
        assert!(map.contains_key("counter"));
        assert!(!map.contains_key("missing"));
        assert!(map.get_mut("missing").is_err());
    }

    #[test]
    fn test_index_of_is_stable() {
        let mut map = ChainedMap::new(13).unwrap();
        let before = map.index_of("stable");
        for i in 0..100 {
            map.insert(format!("k{}", i), i);
        }
        assert_eq!(map.index_of("stable"), before);
        assert!(before < 13);
        assert_eq!(map.bucket_count(), 13);
    }

    #[test]
    fn test_stats_and_clear() {
        let mut map = ChainedMap::new(1).unwrap();
        map.insert(1u64, "a");
        map.insert(2u64, "b");
        let _ = map.get(&3u64);

        let stats = map.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.bucket_count, 1);
        assert_eq!(stats.longest_chain, 2);
        assert_eq!(stats.empty_buckets, 0);
        assert!((stats.load_factor - 2.0).abs() < f32::EPSILON);
        assert_eq!(stats.operations.get_miss_count, 1);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 1);
        assert_eq!(map.stats().empty_buckets, 1);
    }

    #[test]
    fn test_load_warning_fires_once_and_rearms() {
        let config = ChainedMapConfig {
            bucket_count: 1,
            load_warn_threshold: 2.0,
            ..ChainedMapConfig::default()
        };
        let mut map = ChainedMap::with_config(config).unwrap();
        assert_eq!(map.load_warn_threshold(), 2.0);
        map.insert(1u32, ());
        map.insert(2, ());
        assert!(!map.stats().load_warned, "负载等于阈值时不告警");

        map.insert(3, ());
        assert!(map.stats().load_warned);
        map.insert(4, ());
        map.insert(3, ());
        assert!(map.stats().load_warned, "告警只触发一次，状态保持");

        // 删除后负载仍高于阈值，不重置
        map.delete(&4).unwrap();
        assert!(map.stats().load_warned);
        map.delete(&3).unwrap();
        assert!(!map.stats().load_warned, "负载回落到阈值以内后重置");

        map.insert(3, ());
        assert!(map.stats().load_warned, "再次越过阈值重新告警");

        map.clear();
        assert!(!map.stats().load_warned, "清空后重置");
        for i in 0..3 {
            map.insert(i, ());
        }
        assert!(map.stats().load_warned, "清空后再次越过阈值重新告警");
        assert!(map.clone().stats().load_warned, "克隆保留告警状态");
    }

    #[test]
    fn test_iterators_and_traits() {
        let map: ChainedMap<u32, u32> = (0..50).map(|i| (i, i * 2)).collect();
        assert_eq!(map.len(), 50);
        assert_eq!(map.bucket_count(), crate::map::DEFAULT_BUCKET_COUNT);
        assert_eq!(map.iter().len(), 50);

        let mut keys: Vec<_> = map.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..50).collect::<Vec<_>>());
        assert_eq!(map.values().sum::<u32>(), (0..50).map(|i| i * 2).sum::<u32>());

        let cloned = map.clone();
        assert_eq!(cloned.get(&10), Ok(&20));

        let mut single = ChainedMap::new(2).unwrap();
        single.insert("k", 1);
        assert_eq!(format!("{:?}", single), "{\"k\": 1}");
    }

    #[test]
    fn test_export_prometheus() {
        let mut map = ChainedMap::new(4).unwrap();
        map.insert(1u8, 1u8);
        let text = map.export_prometheus();
        assert!(text.contains("chained_hashtable_entries 1"));
        assert!(text.contains("chained_hashtable_buckets 4"));
    }
}
