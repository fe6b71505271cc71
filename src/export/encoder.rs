//! # 图像编码模块
//!
//! ## 设计思路
//!
//! 出图编码是宿主能力的一部分：部分宿主提供自带的编码命令，测试
//! 与无宿主场景则需要进程内兜底。这里用 `HostEncoder` trait 把两者
//! 收口成同一个 seam，流水线对接 seam 而不是具体编码器。
//!
//! ## 实现思路
//!
//! - 编码输入固定为 3 通道 chunky RGB（上传目标不带 alpha），
//!   半透明像素由调用方先压白底。
//! - `BuiltinEncoder` 基于 `image` 的 JPEG/PNG 编码器实现兜底。
//! - 编码完成后用 `infer` 核对魔数，对不上只告警不报错，交给
//!   上传端与用户自行判断。

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::export::error::ExportError;
use crate::host::{HostError, SRGB_COLOR_PROFILE};
use crate::pixel::SelectionRgba;

/// 上传目标格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg,
    Png,
}

impl ExportFormat {
    /// 上传文件名使用的扩展名。
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// 一次编码调用的全部输入。
///
/// `color_profile` 是给支持嵌入描述文件的宿主编码器的提示，
/// 进程内兜底编码器会忽略它。
#[derive(Debug, Clone)]
pub struct EncodeRequest<'a> {
    pub rgb: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
    pub jpeg_quality: u8,
    pub color_profile: &'static str,
}

impl<'a> EncodeRequest<'a> {
    pub fn new(
        rgb: &'a [u8],
        width: u32,
        height: u32,
        format: ExportFormat,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            rgb,
            width,
            height,
            format,
            jpeg_quality,
            color_profile: SRGB_COLOR_PROFILE,
        }
    }
}

/// 图像编码能力 seam。
#[allow(async_fn_in_trait)]
pub trait HostEncoder {
    /// 宿主是否暴露了编码能力；不可用时流水线直接报错。
    fn is_available(&self) -> bool {
        true
    }

    /// 把 3 通道 RGB 缓冲编码为目标格式字节流。
    async fn encode_rgb(&self, request: &EncodeRequest<'_>) -> Result<Vec<u8>, HostError>;
}

/// 进程内兜底编码器，基于 `image` 的 JPEG/PNG 实现。
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEncoder;

impl HostEncoder for BuiltinEncoder {
    async fn encode_rgb(&self, request: &EncodeRequest<'_>) -> Result<Vec<u8>, HostError> {
        let mut bytes = Vec::new();
        match request.format {
            ExportFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut bytes, request.jpeg_quality)
                    .write_image(
                        request.rgb,
                        request.width,
                        request.height,
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| HostError::new(format!("JPEG 编码失败：{}", e)))?;
            }
            ExportFormat::Png => {
                PngEncoder::new(&mut bytes)
                    .write_image(
                        request.rgb,
                        request.width,
                        request.height,
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| HostError::new(format!("PNG 编码失败：{}", e)))?;
            }
        }
        Ok(bytes)
    }
}

/// 编码完成、待上传的压缩图像。
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Bytes,
    pub format: ExportFormat,
}

impl CompressedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 压白底并编码为上传用的压缩字节流。
pub async fn encode_for_upload<E: HostEncoder>(
    encoder: &E,
    image: &SelectionRgba,
    format: ExportFormat,
    jpeg_quality: u8,
) -> Result<CompressedImage, ExportError> {
    if !encoder.is_available() {
        return Err(ExportError::EncoderUnavailable);
    }

    let rgb = image.flatten_onto_white();
    let request = EncodeRequest::new(&rgb, image.width, image.height, format, jpeg_quality);
    let bytes = encoder.encode_rgb(&request).await?;
    if bytes.is_empty() {
        return Err(ExportError::EmptyEncodeResult);
    }

    match infer::get(&bytes) {
        Some(kind) if kind.mime_type() != format.mime_type() => {
            log::warn!(
                "⚠️ 编码结果魔数与目标格式不符：期望 {}，识别为 {}",
                format.mime_type(),
                kind.mime_type()
            );
        }
        None => {
            log::warn!("⚠️ 编码结果无法识别格式魔数（{} 字节）", bytes.len());
        }
        _ => {}
    }

    Ok(CompressedImage {
        bytes: Bytes::from(bytes),
        format,
    })
}

/// 生成面板预览用的 PNG data URL，保留 alpha 通道。
pub fn png_preview_data_url(image: &SelectionRgba) -> Result<String, ExportError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            &image.rgba,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| HostError::new(format!("预览 PNG 编码失败：{}", e)))?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(&bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_rgba() -> SelectionRgba {
        SelectionRgba {
            width: 2,
            height: 2,
            rgba: vec![
                255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 128,
            ],
        }
    }

    #[tokio::test]
    async fn builtin_jpeg_output_carries_jpeg_magic() {
        let image = checker_rgba();

        let compressed = encode_for_upload(&BuiltinEncoder, &image, ExportFormat::Jpeg, 90)
            .await
            .unwrap();
        assert!(!compressed.is_empty());
        assert_eq!(&compressed.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(
            infer::get(&compressed.bytes).map(|k| k.mime_type()),
            Some("image/jpeg")
        );
    }

    #[tokio::test]
    async fn builtin_png_output_carries_png_magic() {
        let image = checker_rgba();

        let compressed = encode_for_upload(&BuiltinEncoder, &image, ExportFormat::Png, 90)
            .await
            .unwrap();
        assert_eq!(&compressed.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn unavailable_encoder_is_reported() {
        struct Disabled;

        impl HostEncoder for Disabled {
            fn is_available(&self) -> bool {
                false
            }

            async fn encode_rgb(&self, _: &EncodeRequest<'_>) -> Result<Vec<u8>, HostError> {
                unreachable!("不可用的编码器不应被调用")
            }
        }

        let err = encode_for_upload(&Disabled, &checker_rgba(), ExportFormat::Jpeg, 90)
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::EncoderUnavailable);
    }

    #[tokio::test]
    async fn empty_encode_result_is_an_error() {
        struct Hollow;

        impl HostEncoder for Hollow {
            async fn encode_rgb(&self, _: &EncodeRequest<'_>) -> Result<Vec<u8>, HostError> {
                Ok(Vec::new())
            }
        }

        let err = encode_for_upload(&Hollow, &checker_rgba(), ExportFormat::Png, 90)
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::EmptyEncodeResult);
    }

    #[tokio::test]
    async fn semi_transparent_pixels_are_flattened_before_encode() {
        struct Capture(std::sync::Mutex<Vec<u8>>);

        impl HostEncoder for Capture {
            async fn encode_rgb(&self, request: &EncodeRequest<'_>) -> Result<Vec<u8>, HostError> {
                *self.0.lock().unwrap() = request.rgb.to_vec();
                Ok(vec![0xFF, 0xD8, 0xFF])
            }
        }

        let image = SelectionRgba {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 128],
        };
        let capture = Capture(std::sync::Mutex::new(Vec::new()));

        encode_for_upload(&capture, &image, ExportFormat::Jpeg, 90)
            .await
            .unwrap();
        assert_eq!(*capture.0.lock().unwrap(), vec![127, 127, 127]);
    }

    #[test]
    fn preview_data_url_is_base64_png() {
        let url = png_preview_data_url(&checker_rgba()).unwrap();

        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(&decoded[..4], &[0x89, b'P', b'N', b'G']);
    }
}
