//! 错误类型定义 - 按处理策略划分的错误分类

use thiserror::Error;

/// 载荷格式错误 - 原始响应无法按预期结构解析
///
/// 只在文档整体不合法时产生；单个车辆字段缺失或类型不符
/// 会降级为默认值，不会触发此错误。
#[derive(Debug, Error)]
#[error("载荷格式错误: {reason}")]
pub struct MalformedPayload {
    /// 失败原因（用于日志）
    pub reason: String,
}

impl MalformedPayload {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 抓取错误 - 每种变体对应一条处理策略
///
/// - `Throttled`: 下一轮改用冷却间隔
/// - 其余变体: 记录日志后跳过本轮，循环继续
#[derive(Debug, Error)]
pub enum FetchError {
    /// 被限流（HTTP 403/429），需要冷却
    #[error("请求被限流 (HTTP {0})")]
    Throttled(u16),
    /// 单次请求超时
    #[error("请求超时")]
    Timeout,
    /// 非限流的异常状态码
    #[error("HTTP 状态异常: {0}")]
    Status(u16),
    /// 网络层错误
    #[error("网络错误: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// 是否为限流信号
    pub fn is_throttled(&self) -> bool {
        matches!(self, FetchError::Throttled(_))
    }
}
