//! # 出图链路错误模型
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载编码与上传链路中的所有错误来源，避免字符串
//! 拼接式错误处理。通过 `thiserror` 保持人类可读错误，同时让调用侧
//! 可按分支匹配（令牌失败与传输失败在面板上的呈现不同）。

use crate::host::HostError;

/// 编码与上传统一错误类型。
///
/// 该类型会在服务层被上转为 `AppError`，最终透传给面板。
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("宿主图像编码能力不可用")]
    EncoderUnavailable,

    #[error("编码结果为空")]
    EmptyEncodeResult,

    #[error("获取上传令牌失败：{0}")]
    UploadToken(String),

    #[error("上传文件失败：{0}")]
    UploadTransfer(String),

    #[error("令牌响应缺少字段：{0}")]
    MissingResponseField(&'static str),

    #[error("{0}")]
    Host(#[from] HostError),
}
