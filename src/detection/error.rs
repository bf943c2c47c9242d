//! 检测管道统一错误处理
//!
//! 每个阶段的失败都会中止当前分析并原样上报给面板

use thiserror::Error;

/// 检测错误类型
///
/// 错误消息会被逐字显示给用户，不做二次翻译或清洗
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// 当前标签页不是目标观看页
    #[error("{0}")]
    WrongPage(String),

    /// 页面上没有可提取的评论（或等待超时）
    #[error("{0}")]
    NoContent(String),

    /// 网络失败、超时或无法解析详情的非2xx响应
    #[error("{0}")]
    Transport(String),

    /// 2xx响应缺少必要字段，或预测数量与提交数量不一致
    #[error("{0}")]
    Protocol(String),

    /// 向标签页注入提取脚本失败
    #[error("{0}")]
    Injection(String),
}

/// 错误类别（用于日志与统计，不影响传播路径）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Page,
    Content,
    Network,
    Protocol,
    Scripting,
}

impl DetectionError {
    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            DetectionError::WrongPage(_) => ErrorCategory::Page,
            DetectionError::NoContent(_) => ErrorCategory::Content,
            DetectionError::Transport(_) => ErrorCategory::Network,
            DetectionError::Protocol(_) => ErrorCategory::Protocol,
            DetectionError::Injection(_) => ErrorCategory::Scripting,
        }
    }

    /// 检查错误是否可通过重新运行整个管道恢复
    ///
    /// 没有阶段级自动重试；重试总是从提取阶段重新开始
    pub fn is_retryable(&self) -> bool {
        match self {
            DetectionError::Transport(_) => true,
            DetectionError::NoContent(_) => true,
            DetectionError::Injection(_) => true,
            DetectionError::WrongPage(_) => false,
            DetectionError::Protocol(_) => false,
        }
    }
}

/// 错误结果类型别名
pub type DetectionResult<T> = Result<T, DetectionError>;
