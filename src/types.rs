//! 核心类型定义 - 共享类型和接口

use core::fmt;
use std::{
    fmt::{Debug, Display},
    num::NonZeroUsize,
};

use crate::error::ChainedError;

/// 桶数量 - 构造后不可变的正整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BucketCount(NonZeroUsize);

impl BucketCount {
    /// 默认桶数量
    pub const DEFAULT: Self = match NonZeroUsize::new(100) {
        Some(count) => Self(count),
        None => unreachable!(),
    };

    /// 创建桶数量，0 返回无效配置错误
    pub fn new(count: usize) -> Result<Self, ChainedError> {
        NonZeroUsize::new(count)
            .map(Self)
            .ok_or_else(|| ChainedError::invalid_config(format!("桶数量必须为正数，实际为 {}", count)))
    }

    /// 获取桶数量
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for BucketCount {
    type Error = ChainedError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl TryFrom<i64> for BucketCount {
    type Error = ChainedError;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        if count <= 0 {
            return Err(ChainedError::invalid_config(format!(
                "桶数量必须为正数，实际为 {}",
                count
            )));
        }
        let count = usize::try_from(count)
            .map_err(|_| ChainedError::invalid_config(format!("桶数量超出平台范围: {}", count)))?;
        Self::new(count)
    }
}

impl From<BucketCount> for usize {
    fn from(count: BucketCount) -> Self {
        count.get()
    }
}

impl Display for BucketCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 字节键包装类型
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteKey(pub Vec<u8>);

impl ByteKey {
    /// 创建新字节键
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// 获取内部字节
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for ByteKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Debug for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteKey(")?;
        for byte in &self.0 {
            write!(f, "{:02X}", byte)?;
        }
        write!(f, ")")
    }
}

impl Display for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// 哈希表操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// 插入新条目
    Insert,
    /// 原位更新已有条目
    Update,
    /// 查询操作
    Get,
    /// 删除操作
    Remove,
}

impl OperationType {
    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Insert => "insert",
            OperationType::Update => "update",
            OperationType::Get => "get",
            OperationType::Remove => "remove",
        }
    }
}
