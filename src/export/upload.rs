//! # 上传投递模块
//!
//! ## 设计思路
//!
//! 上传分两步：先向令牌服务换取一次性的上传令牌与目标地址，
//! 再把压缩字节流按多部分表单投递过去。两步各自有独立的错误
//! 语义（令牌失败 / 传输失败），任何一步失败都不会重试，也不会
//! 发起后续请求。
//!
//! ## 实现思路
//!
//! - 令牌响应是 `{code, msg, data}` 信封，`code != 0` 视为业务失败。
//! - 必需字段（token/key/url/domain）缺失或为空立即报
//!   `MissingResponseField`，不发第二个请求。
//! - 最终资源地址由 `domain + "/" + key` 拼接，去掉重复斜杠。
//! - 上传请求不设超时，大文件交给传输层自己处理。

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::export::encoder::CompressedImage;
use crate::export::error::ExportError;

/// 令牌服务的请求体，`sux` 为目标文件扩展名。
#[derive(Debug, Serialize)]
struct TokenRequestBody<'a> {
    sux: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<TokenGrant>,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

/// 一次性上传票据。
#[derive(Debug, Clone, PartialEq)]
struct UploadTicket {
    token: String,
    key: String,
    url: String,
    domain: String,
}

/// 上传完成后的资源信息。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedAsset {
    /// 可直接访问的最终地址。
    pub url: String,
    /// 服务端分配的对象键。
    pub key: String,
    /// 上传的字节数。
    pub size: usize,
}

/// 图像上传客户端。
///
/// 不带请求超时：面板自家后端的调用在别处限时，这里可能跑
/// 大文件。
pub struct UploadClient {
    client: reqwest::Client,
    token_endpoint: String,
}

impl UploadClient {
    pub fn new(token_endpoint: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;
        Ok(Self {
            client,
            token_endpoint: token_endpoint.into(),
        })
    }

    /// 完整上传流程：换令牌、投文件、拼最终地址。
    ///
    /// `secret_key` 由调用方保证非空（Provider Key 缓存在取值时已校验）。
    pub async fn upload(
        &self,
        secret_key: &str,
        payload: &CompressedImage,
    ) -> Result<UploadedAsset, ExportError> {
        let ticket = self
            .request_ticket(secret_key, payload.format.extension())
            .await?;
        log::info!("📡 已换取上传令牌，目标 {}", ticket.url);

        self.transfer(&ticket, payload).await?;

        let url = join_asset_url(&ticket.domain, &ticket.key);
        log::info!("✅ 上传完成：{}（{} 字节）", url, payload.len());
        Ok(UploadedAsset {
            url,
            key: ticket.key,
            size: payload.len(),
        })
    }

    async fn request_ticket(
        &self,
        secret_key: &str,
        extension: &str,
    ) -> Result<UploadTicket, ExportError> {
        let response = self
            .client
            .post(&self.token_endpoint)
            .header("SecretKey", secret_key)
            .json(&TokenRequestBody { sux: extension })
            .send()
            .await
            .map_err(|e| ExportError::UploadToken(format!("请求发送失败：{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::UploadToken(status_detail(status.as_u16(), &body)));
        }

        let envelope: TokenEnvelope = response
            .json()
            .await
            .map_err(|e| ExportError::UploadToken(format!("响应解析失败：{}", e)))?;
        if envelope.code != 0 {
            let detail = envelope
                .msg
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("业务码 {}", envelope.code));
            return Err(ExportError::UploadToken(detail));
        }

        let data = envelope
            .data
            .ok_or(ExportError::MissingResponseField("data"))?;
        Ok(UploadTicket {
            token: required_field(data.token, "token")?,
            key: required_field(data.key, "key")?,
            url: required_field(data.url, "url")?,
            domain: required_field(data.domain, "domain")?,
        })
    }

    async fn transfer(
        &self,
        ticket: &UploadTicket,
        payload: &CompressedImage,
    ) -> Result<(), ExportError> {
        let file_name = format!("selection.{}", payload.format.extension());
        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::from(payload.bytes.clone()),
            payload.len() as u64,
        )
        .file_name(file_name)
        .mime_str(payload.format.mime_type())
        .map_err(|e| ExportError::UploadTransfer(format!("构造文件分部失败：{}", e)))?;
        let form = reqwest::multipart::Form::new()
            .text("token", ticket.token.clone())
            .text("key", ticket.key.clone())
            .part("file", part);

        let response = self
            .client
            .post(&ticket.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExportError::UploadTransfer(format!("请求发送失败：{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::UploadTransfer(status_detail(
                status.as_u16(),
                &body,
            )));
        }
        Ok(())
    }
}

fn required_field(value: Option<String>, field: &'static str) -> Result<String, ExportError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ExportError::MissingResponseField(field)),
    }
}

fn status_detail(status: u16, body: &str) -> String {
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {} - {}", status, body)
    }
}

/// 拼接最终资源地址，抹平 `domain` 结尾与 `key` 开头的重复斜杠。
fn join_asset_url(domain: &str, key: &str) -> String {
    format!(
        "{}/{}",
        domain.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
