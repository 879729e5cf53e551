//! 轮询监控循环 - 驱动 抓取 → 解析 → 检测 → 通知
//!
//! 单一时间线：一轮完整结束后才安排下一轮，`MonitorState`
//! 只有这一个写者，无需加锁。两个挂起点（进行中的一轮、
//! 轮间等待）都响应关停信号；收到信号后立即终止，不再发出
//! 任何通知。

use crate::config::Settings;
use crate::detector::{ChangeDetector, DetectorConfig, MonitorState};
use crate::error::FetchError;
use crate::fetch::InventorySource;
use crate::inventory::parse_snapshot;
use crate::notification::{MessageFormatter, NotificationDispatcher, SendResult};
use anyhow::Result;
use chrono::{Local, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// 库存监控器
pub struct StockWatcher {
    source: Box<dyn InventorySource>,
    dispatcher: NotificationDispatcher,
    detector: ChangeDetector,
    formatter: MessageFormatter,
    state: MonitorState,
    poll_interval: Duration,
    throttle_cooldown: Duration,
}

impl StockWatcher {
    pub fn new(
        source: Box<dyn InventorySource>,
        dispatcher: NotificationDispatcher,
        settings: &Settings,
    ) -> Self {
        let detector = ChangeDetector::new(DetectorConfig {
            min_count_delta: settings.min_count_delta,
            heartbeat: settings.heartbeat(),
        });
        let formatter =
            MessageFormatter::new().with_inventory_page(Some(settings.inventory_page_url.clone()));

        Self {
            source,
            dispatcher,
            detector,
            formatter,
            state: MonitorState::default(),
            poll_interval: settings.poll_interval(),
            throttle_cooldown: settings.throttle_cooldown(),
        }
    }

    /// 当前监控状态（测试与诊断用）
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// 进入循环前发送启动公告
    pub async fn announce_startup(&self) {
        let interval_minutes = self.poll_interval.as_secs() / 60;
        let message = self.formatter.startup_message(interval_minutes, Local::now());
        self.dispatcher.dispatch(&message).await;
    }

    /// 运行监控循环，直到关停信号
    pub async fn watch(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "库存监控循环启动"
        );

        loop {
            let wait = tokio::select! {
                _ = shutdown.changed() => break,
                wait = self.run_once() => wait,
            };

            debug!(wait_secs = wait.as_secs(), "等待下一轮检查");
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = sleep(wait) => {}
            }
        }

        info!("库存监控循环已停止");
        Ok(())
    }

    /// 执行一轮 抓取 → 解析 → 检测 → 通知，返回下一轮前的等待时长
    ///
    /// 任何失败都不会让循环崩溃：限流换用冷却间隔，其余错误
    /// 记日志后照常等待下一轮。
    pub async fn run_once(&mut self) -> Duration {
        match self.source.fetch().await {
            Ok(payload) => {
                self.process_payload(&payload).await;
                self.poll_interval
            }
            Err(FetchError::Throttled(status)) => {
                warn!(
                    status,
                    cooldown_secs = self.throttle_cooldown.as_secs(),
                    "被限流，暂停轮询进入冷却"
                );
                self.throttle_cooldown
            }
            Err(err) => {
                warn!(error = %err, "本轮抓取失败，跳过");
                self.poll_interval
            }
        }
    }

    async fn process_payload(&mut self, raw: &str) {
        let snapshot = match parse_snapshot(raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "载荷解析失败，跳过本轮");
                return;
            }
        };

        info!(count = snapshot.total_count, "库存检查完成");

        // 状态在决策时就已更新；之后的发送失败按丢失一条处理，
        // 不回滚也不重试，避免通知渠道抖动时重复轰炸
        let Some(event) = self
            .detector
            .evaluate(&mut self.state, &snapshot, Utc::now())
        else {
            return;
        };

        let message = self.formatter.render(&event, Local::now());
        let results = self.dispatcher.dispatch(&message).await;
        let sent = results
            .iter()
            .filter(|(_, result)| *result == SendResult::Sent)
            .count();
        info!(sent, channels = results.len(), "通知已分发");
    }
}
