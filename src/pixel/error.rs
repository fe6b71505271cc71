//! # 像素处理错误定义
//!
//! 归一化与合成阶段的错误类型。`context` 标注出错的缓冲来源
//! （像素或蒙版），方便在日志里直接定位是哪一步拿到了坏数据。

use thiserror::Error;

/// 像素缓冲处理错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PixelError {
    /// 缓冲长度与区域尺寸推算出的期望长度不一致。
    #[error("{context} 缓冲长度不匹配：期望 {expected} 个采样，实际 {actual} 个")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 缓冲元素类型无法归一化。
    #[error("{context} 缓冲元素类型不受支持：{kind}")]
    UnsupportedType {
        context: &'static str,
        kind: &'static str,
    },

    /// 采样数除以像素数得不到 3 或 4 通道。
    #[error("无法识别的每像素通道数：{samples} 个采样 / {pixels} 个像素")]
    UnexpectedComponentCount { samples: usize, pixels: usize },
}
