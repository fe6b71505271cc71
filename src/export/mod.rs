//! # 出图与上传模块（export）
//!
//! ## 设计思路
//!
//! 合成完的 RGBA 工作副本在这里离开进程：先压白底编码成压缩
//! 格式，再经令牌服务换票、多部分表单上传，最终拿到可访问的
//! 资源地址。
//!
//! - `encoder`：编码能力 seam、进程内兜底编码器、预览 data URL
//! - `upload`：令牌换取与多部分表单投递
//! - `error`：本链路错误模型

mod encoder;
mod error;
mod upload;

pub use encoder::{
    encode_for_upload, png_preview_data_url, BuiltinEncoder, CompressedImage, EncodeRequest,
    ExportFormat, HostEncoder,
};
pub use error::ExportError;
pub use upload::{UploadClient, UploadedAsset};
