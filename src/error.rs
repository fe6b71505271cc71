//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 流水线入口统一返回 `Result<T, AppError>`，面板侧通过 `Serialize`
//! 获得结构化的错误信息。错误不在本层做重试或吞掉，全部原样上抛，
//! 由面板决定如何呈现。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为像素 / 宿主 / 出图三条链路的错误提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，满足跨 webview 边界的要求。

use serde::Serialize;

use crate::export::ExportError;
use crate::host::HostError;
use crate::pixel::PixelError;

/// 应用级统一错误类型
///
/// 流水线所有对外入口均返回此类型，确保面板收到一致的错误格式。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 像素归一化 / 合成阶段错误
    #[error("{0}")]
    Pixel(#[from] PixelError),

    /// 宿主成像接口调用失败
    #[error("{0}")]
    Host(#[from] HostError),

    /// 编码与上传链路错误
    #[error("{0}")]
    Export(#[from] ExportError),

    /// 当前没有打开的文档
    #[error("没有激活的文档")]
    NoActiveDocument,

    /// 操作要求存在选区但当前没有
    #[error("没有激活的选区")]
    NoActiveSelection,

    /// 后端 Token 未配置，无法发起鉴权请求
    #[error("未设置后端Token")]
    MissingSecretKey,

    /// Provider Key 获取失败
    #[error("获取 Provider Key 失败: {0}")]
    ProviderKey(String),

    /// HTTP 客户端构建或底层传输层异常
    #[error("网络错误: {0}")]
    Network(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件读写失败
    #[error("存储错误: {0}")]
    Storage(String),
}

/// 跨 webview 边界要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
