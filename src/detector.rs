//! 库存变化检测 - 决定一次观测是否值得通知
//!
//! 决策规则（按顺序）：
//! 1. 库存归零：此前通知过有货 → `Emptied`，否则无事件
//! 2. 有货时满足任一条件 → `Found`：
//!    - 上次通知时无货（首次发现）
//!    - 数量相比上次通知变化达到阈值（默认 ±2）
//!    - 距上次通知超过心跳窗口（默认 30 分钟）
//!
//! ±1 的小幅波动（排序导致条目进出）不触发通知，但心跳保证
//! 持续有货时周期性提醒。无事件时状态完全不变，小幅波动不会
//! 侵蚀心跳窗口。

use crate::inventory::{InventorySnapshot, VehicleListing};
use chrono::{DateTime, Duration, Utc};

/// 通知摘要里详细展示的车辆数
const TOP_LISTING_LIMIT: usize = 2;

/// 检测阈值配置
///
/// 默认值是行为约定的一部分，修改需通过配置显式进行。
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// 触发通知的最小数量变化
    pub min_count_delta: u32,
    /// 持续有货时的重复提醒间隔
    pub heartbeat: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_count_delta: 2,
            heartbeat: Duration::minutes(30),
        }
    }
}

/// 监控状态 - 进程生命周期内的单写者内存
///
/// 由轮询循环持有，每轮以 `&mut` 传给检测器；只在实际决定
/// 通知时更新，不落盘，重启归零。
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    /// 最近一次已通知的库存数量
    pub last_notified_count: u32,
    /// 最近一次 Found 通知的时间，`None` 表示从未通知
    pub last_notified_at: Option<DateTime<Utc>>,
}

/// 一轮检测产出的事件；无事可报时检测器返回 `None`
#[derive(Debug, Clone)]
pub enum StockEvent {
    /// 发现库存（首次出现、数量明显变化或心跳到期）
    Found {
        /// 当前库存总数
        count: u32,
        /// 详细展示的前几台车
        top_listings: Vec<VehicleListing>,
        /// 未展示的剩余台数
        extra_count: u32,
    },
    /// 库存清空
    Emptied,
}

/// 变化检测器
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    config: DetectorConfig,
}

impl ChangeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// 对一份新快照做出通知决策
    ///
    /// `now` 由调用方注入以便测试。产生事件时同步更新 `state`
    /// （发送尝试发生在状态更新之后，发送失败按丢失一条处理）。
    pub fn evaluate(
        &self,
        state: &mut MonitorState,
        snapshot: &InventorySnapshot,
        now: DateTime<Utc>,
    ) -> Option<StockEvent> {
        if snapshot.total_count == 0 {
            if state.last_notified_count > 0 {
                // Emptied 不动 last_notified_at：下次有货的心跳
                // 判定仍以上一次 Found 为基准
                state.last_notified_count = 0;
                return Some(StockEvent::Emptied);
            }
            return None;
        }

        if !self.should_notify_found(state, snapshot.total_count, now) {
            return None;
        }

        state.last_notified_count = snapshot.total_count;
        state.last_notified_at = Some(now);

        let top_listings: Vec<VehicleListing> = snapshot
            .listings
            .iter()
            .take(TOP_LISTING_LIMIT)
            .cloned()
            .collect();
        let extra_count = snapshot.listings.len().saturating_sub(top_listings.len()) as u32;

        Some(StockEvent::Found {
            count: snapshot.total_count,
            top_listings,
            extra_count,
        })
    }

    fn should_notify_found(&self, state: &MonitorState, count: u32, now: DateTime<Utc>) -> bool {
        // 首次发现库存
        if state.last_notified_count == 0 {
            return true;
        }

        // 数量明显变化
        if count.abs_diff(state.last_notified_count) >= self.config.min_count_delta {
            return true;
        }

        // 心跳到期（从未通知过视为已到期）
        match state.last_notified_at {
            Some(last) => now - last > self.config.heartbeat,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot_with_count(count: u32) -> InventorySnapshot {
        let listings = (0..count)
            .map(|i| VehicleListing {
                year: Some(2024),
                price: Some(250_000 + u64::from(i)),
                paint_code: None,
                interior_code: None,
                wheel_code: None,
                autopilot_code: None,
                delivery_window: None,
                vin_suffix: format!("{:06}", i),
                is_demo: false,
            })
            .collect();
        InventorySnapshot {
            total_count: count,
            listings,
        }
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_first_availability_fires_found() {
        // 场景 A：从无货到有货必须立即通知
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();

        let event = detector.evaluate(&mut state, &snapshot_with_count(3), at(0));

        match event {
            Some(StockEvent::Found { count, .. }) => assert_eq!(count, 3),
            other => panic!("expected Found, got {:?}", other),
        }
        assert_eq!(state.last_notified_count, 3);
        assert_eq!(state.last_notified_at, Some(at(0)));
    }

    #[test]
    fn test_small_delta_within_heartbeat_is_silent() {
        // 场景 B 前半：±1 波动且心跳未到 → 无事件，状态不变
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(3), at(0));

        let event = detector.evaluate(&mut state, &snapshot_with_count(4), at(1));

        assert!(event.is_none());
        assert_eq!(state.last_notified_count, 3);
        assert_eq!(state.last_notified_at, Some(at(0)));
    }

    #[test]
    fn test_heartbeat_renotifies_persisting_stock() {
        // 场景 B 后半：超过 30 分钟后即使数量几乎没变也要提醒
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(3), at(0));

        let event = detector.evaluate(&mut state, &snapshot_with_count(3), at(31));

        assert!(matches!(event, Some(StockEvent::Found { count: 3, .. })));
        assert_eq!(state.last_notified_at, Some(at(31)));
    }

    #[test]
    fn test_heartbeat_boundary_is_exclusive() {
        // 恰好 30 分钟不触发，必须严格超过
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(3), at(0));

        assert!(detector
            .evaluate(&mut state, &snapshot_with_count(3), at(30))
            .is_none());
    }

    #[test]
    fn test_material_delta_fires_immediately() {
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(3), at(0));

        let event = detector.evaluate(&mut state, &snapshot_with_count(5), at(1));

        assert!(matches!(event, Some(StockEvent::Found { count: 5, .. })));
        assert_eq!(state.last_notified_count, 5);
    }

    #[test]
    fn test_emptied_after_found_resets_count() {
        // 场景 C：有货后归零 → Emptied，计数归零
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(5), at(0));

        let event = detector.evaluate(&mut state, &snapshot_with_count(0), at(1));

        assert!(matches!(event, Some(StockEvent::Emptied)));
        assert_eq!(state.last_notified_count, 0);
        // Emptied 不改通知时间
        assert_eq!(state.last_notified_at, Some(at(0)));
    }

    #[test]
    fn test_empty_without_prior_stock_is_silent() {
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();

        assert!(detector
            .evaluate(&mut state, &snapshot_with_count(0), at(0))
            .is_none());
        assert_eq!(state.last_notified_count, 0);
        assert_eq!(state.last_notified_at, None);
    }

    #[test]
    fn test_emptied_fires_exactly_once() {
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(5), at(0));

        assert!(matches!(
            detector.evaluate(&mut state, &snapshot_with_count(0), at(1)),
            Some(StockEvent::Emptied)
        ));
        // 连续归零只报一次
        assert!(detector
            .evaluate(&mut state, &snapshot_with_count(0), at(2))
            .is_none());
    }

    #[test]
    fn test_unchanged_snapshot_is_idempotent_within_heartbeat() {
        // 心跳窗口内重复评估同一快照永远无事件
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(4), at(0));

        for minute in 1..30 {
            assert!(detector
                .evaluate(&mut state, &snapshot_with_count(4), at(minute))
                .is_none());
        }
    }

    #[test]
    fn test_fluctuation_burst_does_not_erode_heartbeat() {
        // 连续 ±1 波动不更新状态，心跳仍按首次通知时间计算
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(3), at(0));

        for minute in [5, 10, 15, 20, 25] {
            let count = if minute % 10 == 0 { 4 } else { 3 };
            assert!(detector
                .evaluate(&mut state, &snapshot_with_count(count), at(minute))
                .is_none());
        }

        // 31 分钟时心跳到期
        assert!(detector
            .evaluate(&mut state, &snapshot_with_count(3), at(31))
            .is_some());
    }

    #[test]
    fn test_found_carries_top_two_and_extra_count() {
        let detector = ChangeDetector::default();
        let mut state = MonitorState::default();

        let event = detector.evaluate(&mut state, &snapshot_with_count(5), at(0));

        match event {
            Some(StockEvent::Found {
                top_listings,
                extra_count,
                ..
            }) => {
                assert_eq!(top_listings.len(), 2);
                assert_eq!(extra_count, 3);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_thresholds_respected() {
        let detector = ChangeDetector::new(DetectorConfig {
            min_count_delta: 5,
            heartbeat: Duration::minutes(10),
        });
        let mut state = MonitorState::default();
        detector.evaluate(&mut state, &snapshot_with_count(10), at(0));

        // 变化 4 < 阈值 5，窗口内无事件
        assert!(detector
            .evaluate(&mut state, &snapshot_with_count(14), at(1))
            .is_none());
        // 自定义心跳 10 分钟
        assert!(detector
            .evaluate(&mut state, &snapshot_with_count(10), at(11))
            .is_some());
    }
}
