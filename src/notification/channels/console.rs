//! 控制台渠道 - 把通知打印到标准输出
//!
//! 本地调试或未配置 Telegram 时使用。HTML 标签原样输出。

use crate::notification::channel::{NotificationChannel, NotificationMessage, SendResult};
use anyhow::Result;
use async_trait::async_trait;

/// 控制台渠道
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: &NotificationMessage) -> Result<SendResult> {
        println!("[通知] {}", message.content);
        Ok(SendResult::Sent)
    }
}
