//! 消息格式化模块 - 将库存事件渲染为用户可读的通知文本
//!
//! 设计原则：
//! 1. 纯渲染 - 不做网络和 I/O，时间由调用方注入
//! 2. 简洁 - 一眼看懂：总数、时间、前两台车的关键配置
//! 3. 安全 - 载荷原样字符串（代码、交付窗口、VIN）先做 HTML 转义
//!
//! 输出使用 Telegram HTML 子集（<b>、<a>）。

use super::channel::NotificationMessage;
use crate::detector::StockEvent;
use crate::inventory::{
    decode_autopilot, decode_interior, decode_paint, decode_wheels, InventorySnapshot,
    VehicleListing,
};
use chrono::{DateTime, Local};

/// 展示用时间格式
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 通知文案常量
pub mod msg {
    pub const FOUND_HEADLINE: &str = "🚗 <b>Model Y 有现车！</b>";
    pub const EMPTIED_HEADLINE: &str = "📭 <b>Model Y 库存已清空</b>";
    pub const STARTUP_HEADLINE: &str = "🤖 <b>Tesla 库存监控已启动</b>";
    pub const TOTAL_LABEL: &str = "📦 库存总数";
    pub const TIME_LABEL: &str = "⏰ 时间";
    pub const LISTING_SECTION: &str = "🚙 <b>在售车辆:</b>";
    pub const DELIVERY_LABEL: &str = "📅 交付";
    pub const VIN_LABEL: &str = "🔢 VIN";
    pub const VIEW_INVENTORY: &str = "查看库存";
    pub const DEMO_MARK: &str = "（展示车）";
    pub const KEEP_SEARCHING: &str = "🔍 继续监控库存变化…";
    pub const YEAR_UNKNOWN: &str = "年份未知";
    pub const PRICE_UNKNOWN: &str = "价格未公布";
    pub const DELIVERY_UNKNOWN: &str = "未指定";
}

/// 消息格式化器
#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    /// 消息末尾附带的库存页链接
    inventory_page_url: Option<String>,
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置库存页链接
    pub fn with_inventory_page(mut self, url: Option<String>) -> Self {
        self.inventory_page_url = url;
        self
    }

    /// 渲染一个库存事件为通知消息
    pub fn render(&self, event: &StockEvent, now: DateTime<Local>) -> NotificationMessage {
        let content = match event {
            StockEvent::Found {
                count,
                top_listings,
                extra_count,
            } => self.render_found(*count, top_listings, *extra_count, now),
            StockEvent::Emptied => self.render_emptied(now),
        };
        NotificationMessage::new(content)
    }

    /// 启动公告
    pub fn startup_message(&self, interval_minutes: u64, now: DateTime<Local>) -> NotificationMessage {
        let mut text = format!(
            "{}\n\n⏰ 检查间隔: {} 分钟\n📅 启动时间: {}\n\n{}",
            msg::STARTUP_HEADLINE,
            interval_minutes,
            now.format(TIME_FORMAT),
            msg::KEEP_SEARCHING,
        );
        if let Some(url) = &self.inventory_page_url {
            text.push_str(&format!(
                "\n\n🔗 <a href=\"{}\">{}</a>",
                escape_html(url),
                msg::VIEW_INVENTORY
            ));
        }
        NotificationMessage::new(text)
    }

    fn render_found(
        &self,
        count: u32,
        top_listings: &[VehicleListing],
        extra_count: u32,
        now: DateTime<Local>,
    ) -> String {
        let mut text = format!(
            "{}\n\n{}: <b>{}</b> 台\n{}: {}\n",
            msg::FOUND_HEADLINE,
            msg::TOTAL_LABEL,
            count,
            msg::TIME_LABEL,
            now.format(TIME_FORMAT),
        );

        if !top_listings.is_empty() {
            text.push_str(&format!("\n{}\n", msg::LISTING_SECTION));
            for (index, listing) in top_listings.iter().enumerate() {
                text.push_str(&format!(
                    "\n<b>🚗 车辆 {}:</b>\n{}\n",
                    index + 1,
                    listing_summary(listing)
                ));
            }
            if extra_count > 0 {
                text.push_str(&format!("\n… 还有 <b>{}</b> 台未展示\n", extra_count));
            }
        }

        if let Some(url) = &self.inventory_page_url {
            text.push_str(&format!(
                "\n🔗 <a href=\"{}\">{}</a>",
                escape_html(url),
                msg::VIEW_INVENTORY
            ));
        }

        text
    }

    fn render_emptied(&self, now: DateTime<Local>) -> String {
        format!(
            "{}\n\n{}: {}\n\n{}",
            msg::EMPTIED_HEADLINE,
            msg::TIME_LABEL,
            now.format(TIME_FORMAT),
            msg::KEEP_SEARCHING,
        )
    }
}

/// 单台车辆的摘要块（HTML）
fn listing_summary(listing: &VehicleListing) -> String {
    let year = listing
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| msg::YEAR_UNKNOWN.to_string());
    let demo = if listing.is_demo { msg::DEMO_MARK } else { "" };
    let price = listing
        .price
        .map(format_price)
        .map(|p| format!("<b>{}</b>", p))
        .unwrap_or_else(|| msg::PRICE_UNKNOWN.to_string());
    let delivery = listing
        .delivery_window
        .as_deref()
        .unwrap_or(msg::DELIVERY_UNKNOWN);

    format!(
        "<b>{} Model Y{}</b>\n🎨 {}\n🪑 {}\n⚙️ {}\n🤖 {}\n{}: {}\n💰 {}\n{}: ***{}",
        year,
        demo,
        escape_html(&decode_paint(listing.paint_code.as_deref())),
        escape_html(&decode_interior(listing.interior_code.as_deref())),
        escape_html(&decode_wheels(listing.wheel_code.as_deref())),
        escape_html(&decode_autopilot(listing.autopilot_code.as_deref())),
        msg::DELIVERY_LABEL,
        escape_html(delivery),
        price,
        msg::VIN_LABEL,
        escape_html(&listing.vin_suffix),
    )
}

/// `check` 子命令用的纯文本快照摘要
pub fn summarize_plain(snapshot: &InventorySnapshot) -> String {
    let mut lines = vec![format!("库存总数: {} 台", snapshot.total_count)];
    for (index, listing) in snapshot.listings.iter().enumerate() {
        let year = listing
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        let price = listing
            .price
            .map(format_price)
            .unwrap_or_else(|| msg::PRICE_UNKNOWN.to_string());
        lines.push(format!(
            "{}. {} Model Y{} | {} | {} | {} | {} | {} | VIN ***{}",
            index + 1,
            year,
            if listing.is_demo { " (DEMO)" } else { "" },
            decode_paint(listing.paint_code.as_deref()),
            decode_interior(listing.interior_code.as_deref()),
            decode_wheels(listing.wheel_code.as_deref()),
            decode_autopilot(listing.autopilot_code.as_deref()),
            price,
            listing.vin_suffix,
        ));
    }
    lines.join("\n")
}

/// 千分位格式化价格，如 263900 → "263,900"
fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Telegram HTML 模式要求的最小转义
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
