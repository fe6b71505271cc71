//! # sRGB 编码查找表
//!
//! 宿主在部分文档模式下交回线性光数值，直接编码会整体偏暗。
//! 这里按 IEC 61966-2-1 的分段编码公式预生成 256 项查找表，
//! 逐字节替换即可完成线性 → sRGB 的伽马编码。

use once_cell::sync::Lazy;

static SRGB_ENCODE_LUT: Lazy<[u8; 256]> = Lazy::new(|| {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let x = i as f64 / 255.0;
        let y = if x <= 0.003_130_8 {
            12.92 * x
        } else {
            1.055 * x.powf(1.0 / 2.4) - 0.055
        };
        *slot = (y * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    lut
});

/// 线性 0..255 到 sRGB 0..255 的编码查找表。
pub fn encode_lut() -> &'static [u8; 256] {
    &SRGB_ENCODE_LUT
}

/// 对交错采样缓冲的前 3 个通道做伽马编码，alpha 通道不动。
pub fn encode_rgb_in_place(samples: &mut [u8], components: usize) {
    let lut = encode_lut();
    for pixel in samples.chunks_exact_mut(components) {
        for channel in &mut pixel[..3] {
            *channel = lut[usize::from(*channel)];
        }
    }
}
