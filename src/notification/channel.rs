//! 通知渠道 trait 定义

use anyhow::Result;
use async_trait::async_trait;

/// 通知消息
///
/// `content` 使用 Telegram HTML 子集（加粗、链接）；
/// 只支持纯文本的渠道自行剥离或原样输出。
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    /// 已格式化的消息内容
    pub content: String,
}

impl NotificationMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run 等）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 通知渠道 trait
///
/// `send` 的 `Err` 与 `SendResult::Failed` 对调用方等价：
/// 记日志、吞掉、不重试。
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 发送消息
    async fn send(&self, message: &NotificationMessage) -> Result<SendResult>;
}
