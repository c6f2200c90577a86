//! 推論サーバーの死活監視
//!
//! 3秒以内に2xxが返ればオンライン。5秒ごとにポーリングする。

use crate::error::Result;
use std::time::Duration;

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Checking,
    Online,
    Offline,
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Checking => "Checking...",
            HealthStatus::Online => "Online",
            HealthStatus::Offline => "Offline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthMonitor {
    client: reqwest::Client,
    url: String,
    status: HealthStatus,
}

impl HealthMonitor {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(HEALTH_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: format!("{}/health", base_url.trim_end_matches('/')),
            status: HealthStatus::Checking,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// 1回だけ確認して状態を更新する
    pub async fn check(&mut self) -> HealthStatus {
        self.status = match self.client.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::Online,
            Ok(response) => {
                tracing::debug!("health probe returned {}", response.status());
                HealthStatus::Offline
            }
            Err(e) => {
                tracing::debug!("health probe failed: {}", e);
                HealthStatus::Offline
            }
        };
        self.status
    }

    /// 定期ポーリング。状態が変わったときだけ `on_change` を呼ぶ。
    ///
    /// `limit` を指定するとその回数で終了する。
    pub async fn watch<F>(&mut self, limit: Option<usize>, interval: Duration, mut on_change: F)
    where
        F: FnMut(HealthStatus),
    {
        let mut ticker = tokio::time::interval(interval);
        let mut checks = 0usize;

        loop {
            ticker.tick().await;
            let previous = self.status;
            let current = self.check().await;
            if current != previous {
                on_change(current);
            }

            checks += 1;
            if limit.is_some_and(|limit| checks >= limit) {
                break;
            }
        }
    }
}
