//! 配置加载 - JSON 配置文件与默认值
//!
//! 默认路径为 `~/.config/tesla-stock-monitor/config.json`；
//! 文件里每个字段都可省略，省略的字段取默认值。核心逻辑
//! 只接收构建好的 `Settings` 值，不关心配置来源。

use anyhow::{bail, Context, Result};
use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// 默认库存 API 地址（Model Y / 新车 / 中国区，按价格升序）
const DEFAULT_INVENTORY_URL: &str = "https://www.tesla.cn/coinorder/api/v4/inventory-results?query=%7B%22query%22%3A%7B%22model%22%3A%22my%22%2C%22condition%22%3A%22new%22%2C%22arrangeby%22%3A%22Price%22%2C%22order%22%3A%22asc%22%2C%22market%22%3A%22CN%22%2C%22language%22%3A%22zh%22%7D%2C%22offset%22%3A0%2C%22count%22%3A24%7D";

/// 默认库存页面地址（通知里的链接与请求 Referer）
const DEFAULT_INVENTORY_PAGE: &str = "https://www.tesla.cn/inventory/new/my";

/// 监控配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// 库存 API 地址
    #[serde(default = "default_inventory_url")]
    pub inventory_url: String,
    /// 库存页面地址（用作通知链接和 Referer）
    #[serde(default = "default_inventory_page")]
    pub inventory_page_url: String,
    /// Telegram Bot token
    #[serde(default)]
    pub telegram_bot_token: String,
    /// Telegram chat ID
    #[serde(default)]
    pub telegram_chat_id: String,
    /// 轮询间隔（分钟），必须大于 0
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: u64,
    /// 单次抓取超时（秒）
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// 被限流后的冷却时长（分钟）
    #[serde(default = "default_cooldown")]
    pub throttle_cooldown_minutes: u64,
    /// 触发通知的最小数量变化
    #[serde(default = "default_min_count_delta")]
    pub min_count_delta: u32,
    /// 持续有货时的重复提醒间隔（分钟）
    #[serde(default = "default_heartbeat")]
    pub heartbeat_minutes: u64,
}

fn default_inventory_url() -> String {
    DEFAULT_INVENTORY_URL.to_string()
}

fn default_inventory_page() -> String {
    DEFAULT_INVENTORY_PAGE.to_string()
}

fn default_poll_interval() -> u64 {
    2
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_cooldown() -> u64 {
    5
}

fn default_min_count_delta() -> u32 {
    2
}

fn default_heartbeat() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inventory_url: default_inventory_url(),
            inventory_page_url: default_inventory_page(),
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            poll_interval_minutes: default_poll_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            throttle_cooldown_minutes: default_cooldown(),
            min_count_delta: default_min_count_delta(),
            heartbeat_minutes: default_heartbeat(),
        }
    }
}

impl Settings {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tesla-stock-monitor/config.json")
    }

    /// 加载配置
    ///
    /// 显式指定的路径必须存在；默认路径不存在时静默使用默认值。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if explicit {
                bail!("配置文件不存在: {}", path.display());
            }
            info!(path = %path.display(), "未找到配置文件，使用默认配置");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(settings)
    }

    /// 校验运行轮询循环所需的配置
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_minutes == 0 {
            bail!("poll_interval_minutes 必须大于 0");
        }
        if self.inventory_url.is_empty() {
            bail!("inventory_url 不能为空");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes * 60)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn throttle_cooldown(&self) -> Duration {
        Duration::from_secs(self.throttle_cooldown_minutes * 60)
    }

    pub fn heartbeat(&self) -> ChronoDuration {
        ChronoDuration::minutes(self.heartbeat_minutes as i64)
    }
}
