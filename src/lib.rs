//! Tesla Stock Monitor - 监控库存变化并推送 Telegram 通知

pub mod config;
pub mod detector;
pub mod error;
pub mod fetch;
pub mod inventory;
pub mod notification;
pub mod watcher;

pub use config::Settings;
pub use detector::{ChangeDetector, DetectorConfig, MonitorState, StockEvent};
pub use error::{FetchError, MalformedPayload};
pub use fetch::{HttpInventorySource, InventorySource};
pub use inventory::{parse_snapshot, InventorySnapshot, VehicleListing};
pub use notification::{
    ConsoleChannel, MessageFormatter, NotificationChannel, NotificationDispatcher,
    NotificationMessage, SendResult, TelegramChannel, TelegramConfig,
};
pub use watcher::StockWatcher;
