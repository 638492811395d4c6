//! 哈希表核心模块 - 拉链哈希表及其链组件

pub mod chain;
pub mod chained_map;

pub use chain::Chain;
pub use chained_map::{ChainedMap, ChainedMapConfig, ChainedMapStats, Iter};
pub(crate) use chained_map::ChainedParts;

use once_cell::sync::Lazy;

use crate::types::BucketCount;

/// 全局默认配置
pub static DEFAULT_CONFIG: Lazy<ChainedMapConfig> = Lazy::new(ChainedMapConfig::default);

/// 默认桶数量
pub const DEFAULT_BUCKET_COUNT: usize = BucketCount::DEFAULT.get();
