//! 通知抽象层 - 统一管理所有通知渠道
//!
//! # 设计目标
//! 1. 统一接口：所有渠道实现 `NotificationChannel` trait
//! 2. 渠道解耦：每个渠道独立实现，单个失败不影响其他渠道
//! 3. 失败隔离：发送失败只记日志，绝不让轮询循环崩溃

pub mod channel;
pub mod channels;
pub mod dispatcher;
pub mod formatter;

pub use channel::{NotificationChannel, NotificationMessage, SendResult};
pub use channels::{ConsoleChannel, TelegramChannel, TelegramConfig};
pub use dispatcher::NotificationDispatcher;
pub use formatter::MessageFormatter;
