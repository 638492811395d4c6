// src/stats/operation.rs
//! 操作统计 - 跟踪哈希表操作次数

use crate::types::OperationType;
use std::{
    fmt::Write,
    sync::atomic::{AtomicU64, Ordering},
};

/// 操作统计接口
pub trait OperationRecorder: Send + Sync {
    /// 记录操作，`success` 为 false 表示键不存在
    fn record(&self, op_type: OperationType, success: bool);

    /// 获取操作统计快照
    fn snapshot(&self) -> OperationStatsSnapshot;

    /// 重置统计
    fn reset(&self);

    /// 导出Prometheus格式指标
    fn export_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();
        let _ = writeln!(out, "# TYPE chained_hashtable_operations_total counter");
        for (op, count) in [
            (OperationType::Insert, snapshot.insert_count),
            (OperationType::Update, snapshot.update_count),
            (OperationType::Get, snapshot.get_count),
            (OperationType::Remove, snapshot.remove_count),
        ] {
            let _ = writeln!(
                out,
                "chained_hashtable_operations_total{{op=\"{}\"}} {}",
                op.as_str(),
                count
            );
        }
        let _ = writeln!(out, "# TYPE chained_hashtable_misses_total counter");
        let _ = writeln!(
            out,
            "chained_hashtable_misses_total{{op=\"get\"}} {}",
            snapshot.get_miss_count
        );
        let _ = writeln!(
            out,
            "chained_hashtable_misses_total{{op=\"remove\"}} {}",
            snapshot.remove_miss_count
        );
        out
    }
}

/// 操作统计快照
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationStatsSnapshot {
    pub insert_count: u64,
    pub update_count: u64,
    pub get_count: u64,
    pub get_miss_count: u64,
    pub remove_count: u64,
    pub remove_miss_count: u64,
}

/// 原子操作统计
#[derive(Debug, Default)]
pub struct AtomicOperationStats {
    insert_count: AtomicU64,
    update_count: AtomicU64,
    get_count: AtomicU64,
    get_miss_count: AtomicU64,
    remove_count: AtomicU64,
    remove_miss_count: AtomicU64,
}

impl AtomicOperationStats {
    /// 创建新统计
    pub fn new() -> Self {
        Self::default()
    }

    /// 从快照恢复计数
    pub fn from_snapshot(s: &OperationStatsSnapshot) -> Self {
        Self {
            insert_count: AtomicU64::new(s.insert_count),
            update_count: AtomicU64::new(s.update_count),
            get_count: AtomicU64::new(s.get_count),
            get_miss_count: AtomicU64::new(s.get_miss_count),
            remove_count: AtomicU64::new(s.remove_count),
            remove_miss_count: AtomicU64::new(s.remove_miss_count),
        }
    }
}

impl Clone for AtomicOperationStats {
    fn clone(&self) -> Self {
        Self::from_snapshot(&self.snapshot())
    }
}

impl OperationRecorder for AtomicOperationStats {
    fn record(&self, op_type: OperationType, success: bool) {
        match op_type {
            OperationType::Insert => self.insert_count.fetch_add(1, Ordering::Relaxed),
            OperationType::Update => self.update_count.fetch_add(1, Ordering::Relaxed),
            OperationType::Get => self.get_count.fetch_add(1, Ordering::Relaxed),
            OperationType::Remove => self.remove_count.fetch_add(1, Ordering::Relaxed),
        };

        if !success {
            match op_type {
                OperationType::Get => {
                    self.get_miss_count.fetch_add(1, Ordering::Relaxed);
                }
                OperationType::Remove => {
                    self.remove_miss_count.fetch_add(1, Ordering::Relaxed);
                }
                // 插入总会成功
                OperationType::Insert | OperationType::Update => {}
            }
        }
    }

    fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot {
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            get_count: self.get_count.load(Ordering::Relaxed),
            get_miss_count: self.get_miss_count.load(Ordering::Relaxed),
            remove_count: self.remove_count.load(Ordering::Relaxed),
            remove_miss_count: self.remove_miss_count.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.insert_count.store(0, Ordering::Relaxed);
        self.update_count.store(0, Ordering::Relaxed);
        self.get_count.store(0, Ordering::Relaxed);
        self.get_miss_count.store(0, Ordering::Relaxed);
        self.remove_count.store(0, Ordering::Relaxed);
        self.remove_miss_count.store(0, Ordering::Relaxed);
    }
}
