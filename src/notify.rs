//! # 变更通知模块
//!
//! 面板切换服务商后向对应地址发一条事后通知。这是条尽力而为的
//! 旁路消息：网络失败、地址失效都不应该打断主流程，所以这里
//! 永远不返回错误，失败统一降级为 `{ok: false, status: 0}` 并留
//! 一行日志。

use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Serialize;

/// 面板后端请求超时。
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 复用的通知客户端；构建失败时留空，调用时走降级分支。
static NOTIFY_CLIENT: Lazy<Option<reqwest::Client>> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| log::warn!("⚠️ 通知客户端构建失败：{}", e))
        .ok()
});

#[derive(Debug, Serialize)]
struct ServerChangedBody {
    event: &'static str,
}

/// 通知结果；`status: 0` 表示请求根本没到达对端。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotifyResult {
    pub ok: bool,
    pub status: u16,
}

/// 向 `endpoint` 发送 `server_changed` 事件，永不报错。
pub async fn post_server_changed(endpoint: &str) -> NotifyResult {
    let Some(client) = NOTIFY_CLIENT.as_ref() else {
        return NotifyResult {
            ok: false,
            status: 0,
        };
    };

    match client
        .post(endpoint)
        .json(&ServerChangedBody {
            event: "server_changed",
        })
        .send()
        .await
    {
        Ok(response) => NotifyResult {
            ok: response.status().is_success(),
            status: response.status().as_u16(),
        },
        Err(e) => {
            log::warn!("⚠️ 服务商变更通知失败：{}", e);
            NotifyResult {
                ok: false,
                status: 0,
            }
        }
    }
}
