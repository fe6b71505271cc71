//! # 采样归一化模块
//!
//! ## 设计思路
//!
//! 宿主返回的缓冲元素类型随文档位深变化：8 位文档给 `u8`，16 位
//! 文档给 `u16`，32 位文档给浮点。更麻烦的是 16 位存在两种量程
//! 约定：部分版本按 0..32768 输出并把 32768 当满量程，常规版本
//! 按 0..65535 输出。这里统一收敛到 0..255，策略是先扫一遍最大值
//! 判断量程，再做对应映射。
//!
//! ## 实现思路
//!
//! - `u8`：长度校验后原样返回。
//! - `u16`：max ≤ 32768 走半量程映射（32768 → 255，其余 ÷128 取整），
//!   否则按 65535 满量程四舍五入 ÷257。
//! - 浮点：max ≤ 1.0 视为 0..1 区间乘 255，否则视为已是 0..255，
//!   逐值四舍五入并截断到 0..255（NaN 落为 0）。
//! - 原始字节：仅当字节数恰好等于期望采样数时按 `u8` 透传。

use crate::host::RawSampleBuffer;
use crate::pixel::error::PixelError;

/// 半量程 16 位缓冲的满量程值。
const U16_HALF_SCALE_FULL: u16 = 32768;

/// 把宿主原始采样缓冲归一化为 0..255 的 `u8` 序列。
///
/// `expected_len` 是按区域尺寸与通道数推算出的采样个数，长度不符
/// 直接报错而不是截断，坏数据宁可失败也不要悄悄出错图。
pub fn normalize_to_u8(
    buffer: &RawSampleBuffer,
    expected_len: usize,
    context: &'static str,
) -> Result<Vec<u8>, PixelError> {
    let check_len = |actual: usize| -> Result<(), PixelError> {
        if actual != expected_len {
            return Err(PixelError::LengthMismatch {
                context,
                expected: expected_len,
                actual,
            });
        }
        Ok(())
    };

    match buffer {
        RawSampleBuffer::U8(samples) => {
            check_len(samples.len())?;
            Ok(samples.clone())
        }
        RawSampleBuffer::U16(samples) => {
            check_len(samples.len())?;
            let max = samples.iter().copied().max().unwrap_or(0);
            if max <= U16_HALF_SCALE_FULL {
                Ok(samples
                    .iter()
                    .map(|&v| {
                        if v == U16_HALF_SCALE_FULL {
                            255
                        } else {
                            (v / 128) as u8
                        }
                    })
                    .collect())
            } else {
                Ok(samples
                    .iter()
                    .map(|&v| (f64::from(v) / 257.0).round() as u8)
                    .collect())
            }
        }
        RawSampleBuffer::F32(samples) => {
            check_len(samples.len())?;
            Ok(scale_floats(samples.iter().map(|&v| f64::from(v))))
        }
        RawSampleBuffer::F64(samples) => {
            check_len(samples.len())?;
            Ok(scale_floats(samples.iter().copied()))
        }
        RawSampleBuffer::Bytes(bytes) => {
            if bytes.len() == expected_len {
                Ok(bytes.clone())
            } else {
                Err(PixelError::UnsupportedType {
                    context,
                    kind: buffer.kind_name(),
                })
            }
        }
    }
}

fn scale_floats(samples: impl Iterator<Item = f64> + Clone) -> Vec<u8> {
    let max = samples.clone().fold(0.0f64, f64::max);
    let scale = if max <= 1.0 { 255.0 } else { 1.0 };
    samples
        .map(|v| (v * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// 扫描缓冲的最小/最大值，用于调试日志。
///
/// 空缓冲返回 `(255, 0)`，即初始哨兵值。
pub fn min_max_u8(samples: &[u8]) -> (u8, u8) {
    let mut min = 255u8;
    let mut max = 0u8;
    for &v in samples {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}
