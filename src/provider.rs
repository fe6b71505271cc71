//! # Provider Key 缓存模块
//!
//! ## 设计思路
//!
//! 生图服务商的访问密钥由面板后端按 Token 下发，每次出图前都要
//! 带上。密钥本身有有效期也有获取成本，这里做一个显式的单飞
//! （single-flight）TTL 缓存对象：并发调用共享同一次在途请求，
//! 有效期内直接命中缓存，不存在任何进程级可变全局状态。
//!
//! ## 实现思路
//!
//! - 缓存槽位（值 + 写入时刻）放在 `tokio::sync::Mutex` 里，锁
//!   覆盖整个取值过程：后到的调用方会等第一个取完再看缓存，
//!   天然去重。
//! - `force_refresh` 跳过新鲜度检查：若恰有请求在途，等它结束后
//!   再发一次，保证拿到的一定是新值。
//! - 后端 Token 在每次真正发请求时从配置现读，改完 Token 不用
//!   重启面板。

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::settings::SettingsStore;

/// 缓存有效期。
const PROVIDER_KEY_TTL: Duration = Duration::from_secs(10 * 60);

/// 面板后端请求超时。
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ProviderEnvelope {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<ProviderKeyInfo>,
}

#[derive(Debug, Deserialize)]
struct ProviderKeyInfo {
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Default)]
struct CacheSlot {
    cached_value: Option<String>,
    cached_at: Option<Instant>,
}

/// Provider Key 的单飞 TTL 缓存客户端。
pub struct ProviderKeyClient {
    client: reqwest::Client,
    endpoint: String,
    settings: SettingsStore,
    ttl: Duration,
    slot: Mutex<CacheSlot>,
}

impl ProviderKeyClient {
    pub fn new(endpoint: impl Into<String>, settings: SettingsStore) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            settings,
            ttl: PROVIDER_KEY_TTL,
            slot: Mutex::new(CacheSlot::default()),
        })
    }

    #[cfg(test)]
    fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 取 Provider Key；`force_refresh` 时无视缓存新鲜度强制重取。
    ///
    /// 锁覆盖整个取值过程，并发调用只会产生一次上游请求。
    pub async fn get(&self, force_refresh: bool) -> Result<String, AppError> {
        let mut slot = self.slot.lock().await;

        if !force_refresh {
            if let (Some(value), Some(at)) = (&slot.cached_value, slot.cached_at) {
                if at.elapsed() < self.ttl {
                    return Ok(value.clone());
                }
            }
        }

        let key = self.fetch_key().await?;
        slot.cached_value = Some(key.clone());
        slot.cached_at = Some(Instant::now());
        Ok(key)
    }

    async fn fetch_key(&self) -> Result<String, AppError> {
        let config = self.settings.load_config();
        let secret_key = config
            .secret_key()
            .ok_or(AppError::MissingSecretKey)?
            .to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .header("SecretKey", secret_key)
            .send()
            .await
            .map_err(|e| AppError::ProviderKey(format!("请求发送失败：{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                format!("HTTP {} - {}", status.as_u16(), body)
            };
            return Err(AppError::ProviderKey(detail));
        }

        let envelope: ProviderEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::ProviderKey(format!("响应解析失败：{}", e)))?;

        let key = envelope
            .data
            .and_then(|d| d.key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        match key {
            Some(key) => {
                log::info!("✅ Provider Key 已刷新");
                Ok(key)
            }
            None => {
                let detail = envelope
                    .msg
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Provider Key 为空".to_string());
                Err(AppError::ProviderKey(detail))
            }
        }
    }
}
