//! 统一错误处理 - 哈希表可能返回的错误类型

/// 拉链哈希表可能发生的错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainedError {
    #[error("无效配置: {reason}")]
    InvalidConfiguration {
        reason: String,
    },

    #[error("键不存在: {key}")]
    KeyNotFound {
        key: String,
    },
}

impl ChainedError {
    /// 构造键不存在错误
    pub(crate) fn key_not_found(key: &impl std::fmt::Debug) -> Self {
        Self::KeyNotFound {
            key: format!("{:?}", key),
        }
    }

    /// 构造无效配置错误
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// 获取错误恢复建议
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfiguration { .. } => Some("检查配置参数，桶数量必须为正数"),
            Self::KeyNotFound { .. } => Some("确认键是否存在，或使用默认值"),
        }
    }

    /// 判断错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfiguration { .. })
    }

    /// 是否为键不存在错误
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}
