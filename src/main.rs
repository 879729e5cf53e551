//! Tesla Stock Monitor CLI
//!
//! 监控 Tesla 库存变化并推送 Telegram 通知

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tesla_stock_monitor::{
    notification::formatter, parse_snapshot, ConsoleChannel, HttpInventorySource, InventorySource,
    NotificationChannel, NotificationDispatcher, NotificationMessage, Settings, StockWatcher,
    TelegramChannel, TelegramConfig,
};
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tsm")]
#[command(about = "Tesla Stock Monitor - 监控库存变化并推送 Telegram 通知")]
#[command(version)]
struct Cli {
    /// 配置文件路径 (默认: ~/.config/tesla-stock-monitor/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动轮询监控循环
    Watch {
        /// 轮询间隔（分钟），覆盖配置文件
        #[arg(long, short)]
        interval: Option<u64>,
        /// 只打印将要发送的通知，不实际发送
        #[arg(long)]
        dry_run: bool,
        /// 通知输出到控制台而不是 Telegram
        #[arg(long)]
        console: bool,
    },
    /// 单次抓取并打印当前库存
    Check {
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
    /// 发送测试消息验证 Telegram 凭据
    SendTest,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Watch {
            interval,
            dry_run,
            console,
        } => cmd_watch(config_path, interval, dry_run, console).await,
        Commands::Check { json } => cmd_check(config_path, json).await,
        Commands::SendTest => cmd_send_test(config_path).await,
    }
}

async fn cmd_watch(
    config_path: Option<&std::path::Path>,
    interval: Option<u64>,
    dry_run: bool,
    console: bool,
) -> Result<()> {
    let mut settings = Settings::load(config_path)?;
    if let Some(minutes) = interval {
        settings.poll_interval_minutes = minutes;
    }
    settings.validate()?;

    let mut dispatcher = NotificationDispatcher::new().with_dry_run(dry_run);
    if console || dry_run {
        dispatcher.register_channel(Arc::new(ConsoleChannel::new()));
    } else {
        // 凭据无效在进入循环前就中止
        let channel = TelegramChannel::connect(TelegramConfig {
            bot_token: settings.telegram_bot_token.clone(),
            chat_id: settings.telegram_chat_id.clone(),
            ..Default::default()
        })
        .await?;
        dispatcher.register_channel(Arc::new(channel));
    }

    let source = HttpInventorySource::new(settings.inventory_url.clone(), settings.fetch_timeout())?
        .with_referer(Some(settings.inventory_page_url.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = signal::ctrl_c().await;
        info!("收到 Ctrl+C，正在停止…");
        let _ = shutdown_tx.send(true);
    });

    let mut watcher = StockWatcher::new(Box::new(source), dispatcher, &settings);
    watcher.announce_startup().await;
    watcher.watch(shutdown_rx).await
}

async fn cmd_check(config_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let settings = Settings::load(config_path)?;
    settings.validate()?;

    let source = HttpInventorySource::new(settings.inventory_url.clone(), settings.fetch_timeout())?
        .with_referer(Some(settings.inventory_page_url.clone()));

    let payload = source.fetch().await?;
    let snapshot = parse_snapshot(&payload)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", formatter::summarize_plain(&snapshot));
    }
    Ok(())
}

async fn cmd_send_test(config_path: Option<&std::path::Path>) -> Result<()> {
    let settings = Settings::load(config_path)?;

    let channel = TelegramChannel::connect(TelegramConfig {
        bot_token: settings.telegram_bot_token.clone(),
        chat_id: settings.telegram_chat_id.clone(),
        ..Default::default()
    })
    .await?;

    let result = channel
        .send(&NotificationMessage::new(
            "🔔 <b>测试消息</b>\n\nTelegram 凭据配置正确。",
        ))
        .await?;
    println!("发送结果: {:?}", result);
    Ok(())
}
