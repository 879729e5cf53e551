//! 具体渠道实现

pub mod console;
pub mod telegram;

pub use console::ConsoleChannel;
pub use telegram::{TelegramChannel, TelegramConfig};
