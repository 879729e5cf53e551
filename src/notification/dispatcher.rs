//! 通知分发器 - 把一条消息扇出到所有注册渠道

use super::channel::{NotificationChannel, NotificationMessage, SendResult};
use std::sync::Arc;
use tracing::{info, warn};

/// 通知分发器
///
/// 渠道失败各自隔离：单个渠道出错只记日志，分发本身不失败，
/// 也不重试（重发节奏完全由轮询间隔决定）。
pub struct NotificationDispatcher {
    /// 所有注册的渠道
    channels: Vec<Arc<dyn NotificationChannel>>,
    /// dry-run 模式下只打印不发送
    dry_run: bool,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册渠道
    pub fn register_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        info!(channel = channel.name(), "注册通知渠道");
        self.channels.push(channel);
    }

    /// 发送消息到所有渠道，返回每个渠道的结果
    pub async fn dispatch(&self, message: &NotificationMessage) -> Vec<(String, SendResult)> {
        let mut results = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let name = channel.name().to_string();

            if self.dry_run {
                eprintln!("[DRY-RUN] 将发送到渠道 {}:\n{}", name, message.content);
                results.push((name, SendResult::Skipped("dry-run".to_string())));
                continue;
            }

            let result = match channel.send(message).await {
                Ok(r) => r,
                Err(e) => SendResult::Failed(e.to_string()),
            };

            if let SendResult::Failed(reason) = &result {
                warn!(channel = %name, error = %reason, "渠道发送失败");
            }

            results.push((name, result));
        }

        results
    }

    /// 已注册的渠道数量
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 已注册的渠道名称
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
