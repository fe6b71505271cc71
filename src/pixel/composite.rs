//! # 选区合成模块
//!
//! ## 设计思路
//!
//! 归一化后的 RGB(+alpha) 缓冲与单通道蒙版在这里合成为规范的
//! RGBA 工作副本：蒙版当 alpha 用，选区外像素透明、羽化边缘
//! 半透明。伽马编码与色相旋转同样收口在合成入口，调用方只传
//! 一组选项即可拿到最终出图用的缓冲。
//!
//! ## 实现思路
//!
//! - 通道数由采样数 ÷ 像素数推断，只认 3 与 4。
//! - alpha 合成用整数乘除：`(a × m + 127) / 255` 等价于四舍五入。
//! - 不带蒙版（无激活选区）时 alpha 一律置 255。
//! - JPEG 这类无 alpha 目标由 `flatten_onto_white` 预先压白底。

use crate::pixel::error::PixelError;
use crate::pixel::{hue, srgb};

/// 合成选项。默认不做伽马、不转色相、不强制不透明。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    /// 线性光输入时做 sRGB 伽马编码。
    pub apply_gamma: bool,
    /// 色相偏移角度，0 表示关闭。
    pub hue_shift_degrees: f32,
    /// 忽略蒙版与自带 alpha，输出全不透明。
    pub force_opaque: bool,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            apply_gamma: false,
            hue_shift_degrees: 0.0,
            force_opaque: false,
        }
    }
}

/// 合成完毕的 RGBA 工作副本。
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRgba {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SelectionRgba {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 压到白底，输出 3 通道 RGB 缓冲。
    ///
    /// 公式为 `round((c×a + 255×(255−a)) / 255)`，透明处落在纯白。
    pub fn flatten_onto_white(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for pixel in self.rgba.chunks_exact(4) {
            let a = u32::from(pixel[3]);
            for &c in &pixel[..3] {
                let blended = (u32::from(c) * a + 255 * (255 - a) + 127) / 255;
                rgb.push(blended as u8);
            }
        }
        rgb
    }
}

/// 由采样总数与像素总数推断每像素通道数，只接受 3 或 4。
pub fn infer_components(sample_count: usize, pixel_count: usize) -> Result<usize, PixelError> {
    if pixel_count > 0 && sample_count % pixel_count == 0 {
        let components = sample_count / pixel_count;
        if components == 3 || components == 4 {
            return Ok(components);
        }
    }
    Err(PixelError::UnexpectedComponentCount {
        samples: sample_count,
        pixels: pixel_count,
    })
}

/// `round(x × y / 255)` 的整数写法。
fn mul_div255(x: u8, y: u8) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}

/// 把归一化 RGB(+alpha) 缓冲与可选蒙版合成为 RGBA 工作副本。
///
/// `mask` 为 `None` 表示无激活选区，整幅视为不透明。长度与
/// 通道数在入口处校验，出错的缓冲不会产出半张图。
pub fn composite_selection(
    mut rgb: Vec<u8>,
    components: usize,
    mask: Option<&[u8]>,
    width: u32,
    height: u32,
    options: &CompositeOptions,
) -> Result<SelectionRgba, PixelError> {
    let pixel_count = width as usize * height as usize;

    if components != 3 && components != 4 {
        return Err(PixelError::UnexpectedComponentCount {
            samples: rgb.len(),
            pixels: pixel_count,
        });
    }
    if rgb.len() != pixel_count * components {
        return Err(PixelError::LengthMismatch {
            context: "像素",
            expected: pixel_count * components,
            actual: rgb.len(),
        });
    }
    if let Some(mask) = mask {
        if mask.len() != pixel_count {
            return Err(PixelError::LengthMismatch {
                context: "蒙版",
                expected: pixel_count,
                actual: mask.len(),
            });
        }
    }

    if options.apply_gamma {
        srgb::encode_rgb_in_place(&mut rgb, components);
    }

    let mut rgba = vec![0u8; pixel_count * 4];
    for i in 0..pixel_count {
        let src = i * components;
        let dst = i * 4;

        rgba[dst] = rgb[src];
        rgba[dst + 1] = rgb[src + 1];
        rgba[dst + 2] = rgb[src + 2];

        let base_alpha = if components == 4 { rgb[src + 3] } else { 255 };
        rgba[dst + 3] = if options.force_opaque {
            255
        } else {
            match mask {
                Some(mask) => mul_div255(base_alpha, mask[i]),
                None => 255,
            }
        };
    }

    hue::rotate_hue_in_place(&mut rgba, options.hue_shift_degrees);

    Ok(SelectionRgba {
        width,
        height,
        rgba,
    })
}
