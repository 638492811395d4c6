//! 并发访问模块 - 为拉链哈希表提供外部串行化

pub mod striped_map;

pub use striped_map::StripedMap;
