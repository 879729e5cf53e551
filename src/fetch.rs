//! 库存抓取 - 访问库存 API 的外部协作者
//!
//! 核心逻辑只依赖 `InventorySource` trait；HTTP 细节（超时、
//! 伪装浏览器的请求头、User-Agent 轮换）都封装在这里。

use crate::error::FetchError;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// 轮换使用的 User-Agent 池
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
];

/// 库存数据来源
///
/// 返回值语义：`Ok` 为原始载荷文本；`Err` 按 `FetchError`
/// 分类，限流与一般网络错误由调用方区别处理。
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// 基于 reqwest 的 HTTP 抓取实现
pub struct HttpInventorySource {
    client: Client,
    url: String,
    referer: Option<String>,
}

impl HttpInventorySource {
    /// 创建抓取器，`timeout` 约束单次请求
    pub fn new(url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;
        Ok(Self {
            client,
            url,
            referer: None,
        })
    }

    /// 设置 Referer（通常指向库存页面）
    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }

    fn pick_user_agent() -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }
}

#[async_trait]
impl InventorySource for HttpInventorySource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let user_agent = Self::pick_user_agent();
        debug!(user_agent, "发送库存 API 请求");

        let mut request = self
            .client
            .get(&self.url)
            .header("User-Agent", user_agent)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("Cache-Control", "no-cache");
        if let Some(referer) = &self.referer {
            request = request.header("Referer", referer);
        }

        let response = request.send().await.map_err(classify_transport)?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::Throttled(status.as_u16()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(classify_transport)
    }
}

/// 超时单独归类，其余按网络错误处理
fn classify_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err)
    }
}
