//! Telegram 渠道 - 直接调用 Telegram Bot API
//!
//! 使用 HTML parse mode 发送消息。`connect` 在启动时调用
//! `getMe` 验证凭据，凭据无效应在进入轮询循环前中止进程。

use crate::notification::channel::{NotificationChannel, NotificationMessage, SendResult};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Telegram Bot API 根地址
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram 渠道配置
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token（形如 `123456:ABC-DEF…`）
    pub bot_token: String,
    /// 目标 chat ID
    pub chat_id: String,
    /// API 根地址（测试时可替换）
    pub api_base: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

/// sendMessage 请求体
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Bot API 统一响应壳
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

/// Telegram 渠道
#[derive(Debug)]
pub struct TelegramChannel {
    client: Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    /// 创建渠道（只校验配置，不发请求）
    pub fn new(config: TelegramConfig) -> Result<Self> {
        if config.bot_token.is_empty() {
            bail!("telegram_bot_token 未配置");
        }
        if config.chat_id.is_empty() {
            bail!("telegram_chat_id 未配置");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self { client, config })
    }

    /// 创建渠道并通过 `getMe` 验证凭据
    pub async fn connect(config: TelegramConfig) -> Result<Self> {
        let channel = Self::new(config)?;
        let me = channel.get_me().await.context("Telegram Bot 连接验证失败")?;
        info!(bot = %me, "Telegram Bot 连接成功");
        Ok(channel)
    }

    /// 调用 getMe，返回 bot 用户名
    async fn get_me(&self) -> Result<String> {
        let response: ApiResponse = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            bail!(
                "getMe 失败: {}",
                response.description.unwrap_or_else(|| "未知错误".to_string())
            );
        }

        Ok(response
            .result
            .as_ref()
            .and_then(|v| v.get("username"))
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>")
            .to_string())
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base, self.config.bot_token, method
        )
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: &NotificationMessage) -> Result<SendResult> {
        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: &message.content,
            parse_mode: "HTML",
        };

        let response: ApiResponse = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if response.ok {
            Ok(SendResult::Sent)
        } else {
            Ok(SendResult::Failed(
                response
                    .description
                    .unwrap_or_else(|| "未知错误".to_string()),
            ))
        }
    }
}
