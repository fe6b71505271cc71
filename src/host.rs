//! # 宿主成像接口模块
//!
//! ## 设计思路
//!
//! 宿主应用的文档/选区对象模型不属于本库的职责范围，这里只定义
//! 流水线真正依赖的最小接口：查询激活文档、读取选区边界、按矩形
//! 区域取像素与取选区蒙版。接口由嵌入方实现，库内全部以泛型
//! 静态分发使用，测试中用内存假实现替代。
//!
//! ## 实现思路
//!
//! - `RawSampleBuffer` 表示宿主返回的、编码未定的原始采样缓冲。
//! - `SelectionBounds` 负责把浮点边界换算为 ≥1 的整数宽高。
//! - 请求结构体固定携带宿主成像调用所需的色彩参数。

use serde::Serialize;

/// 像素请求使用的色彩空间。
pub const COLOR_SPACE_RGB: &str = "RGB";

/// 像素请求使用的色彩描述文件。
pub const SRGB_COLOR_PROFILE: &str = "sRGB IEC61966-2.1";

/// 宿主返回的原始采样缓冲。
///
/// 不同宿主版本/色彩模式下元素类型并不稳定，归一化之前只承诺
/// 总元素个数可知。`Bytes` 是无法识别元素类型时的原始字节回退。
#[derive(Debug, Clone, PartialEq)]
pub enum RawSampleBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Bytes(Vec<u8>),
}

impl RawSampleBuffer {
    /// 缓冲内的采样元素个数（`Bytes` 按字节计）。
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Bytes(v) => v.len(),
        }
    }

    /// 缓冲是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 元素类型名，用于错误信息。
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// 矩形区域边界（像素坐标，允许小数）。
///
/// 可能来自激活选区，也可能回退为整幅画布。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl SelectionBounds {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// 覆盖整幅画布的边界。
    pub fn full_canvas(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: f64::from(width),
            bottom: f64::from(height),
        }
    }

    /// 区域宽度：四舍五入后不小于 1。
    pub fn width(&self) -> u32 {
        (self.right - self.left).round().max(1.0) as u32
    }

    /// 区域高度：四舍五入后不小于 1。
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).round().max(1.0) as u32
    }

    /// 区域像素总数。
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

/// 降采样目标尺寸，附加在成像请求上由宿主直接按此尺寸出图。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

/// RGB(+alpha) 像素读取请求。
///
/// 色彩参数固定为面板所需的 sRGB 约定，由构造函数填充。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelRequest {
    pub document_id: u32,
    pub source_bounds: SelectionBounds,
    pub target_size: Option<TargetSize>,
    pub color_space: &'static str,
    pub color_profile: &'static str,
    pub apply_alpha: bool,
    pub has_alpha: bool,
}

impl PixelRequest {
    pub fn rgb(document_id: u32, source_bounds: SelectionBounds, target_size: Option<TargetSize>) -> Self {
        Self {
            document_id,
            source_bounds,
            target_size,
            color_space: COLOR_SPACE_RGB,
            color_profile: SRGB_COLOR_PROFILE,
            apply_alpha: false,
            has_alpha: true,
        }
    }
}

/// 选区蒙版读取请求（单通道，与像素请求同区域同尺寸）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskRequest {
    pub document_id: u32,
    pub source_bounds: SelectionBounds,
    pub target_size: Option<TargetSize>,
}

impl MaskRequest {
    pub fn new(document_id: u32, source_bounds: SelectionBounds, target_size: Option<TargetSize>) -> Self {
        Self {
            document_id,
            source_bounds,
            target_size,
        }
    }
}

/// 激活文档的基本信息。
///
/// 画布尺寸用于无选区时回退整幅画布。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub id: u32,
    pub name: String,
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// 宿主接口调用失败。
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("宿主成像接口调用失败：{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// 宿主成像能力接口。
///
/// 每个方法对应宿主的一次异步命令调用；实现方不需要做任何
/// 像素格式转换，原样交回宿主给出的缓冲即可。
#[allow(async_fn_in_trait)]
pub trait ImagingHost {
    /// 当前激活文档；无文档时返回 `None`。
    async fn active_document(&self) -> Result<Option<DocumentInfo>, HostError>;

    /// 激活选区的边界；无选区时返回 `None`。
    async fn selection_bounds(&self, document_id: u32) -> Result<Option<SelectionBounds>, HostError>;

    /// 读取区域内的 RGB(+alpha) 原始采样。
    async fn get_pixels(&self, request: &PixelRequest) -> Result<RawSampleBuffer, HostError>;

    /// 读取区域内的选区蒙版原始采样（单通道）。
    async fn get_selection_mask(&self, request: &MaskRequest) -> Result<RawSampleBuffer, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_round_fractional_edges() {
        let bounds = SelectionBounds::new(10.4, 20.6, 110.6, 80.2);

        assert_eq!(bounds.width(), 100);
        assert_eq!(bounds.height(), 60);
    }

    #[test]
    fn bounds_never_collapse_below_one_pixel() {
        let empty = SelectionBounds::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(empty.width(), 1);
        assert_eq!(empty.height(), 1);

        let inverted = SelectionBounds::new(10.0, 10.0, 4.0, 4.0);
        assert_eq!(inverted.width(), 1);
        assert_eq!(inverted.height(), 1);
    }

    #[test]
    fn full_canvas_bounds_match_document_size() {
        let bounds = SelectionBounds::full_canvas(1920, 1080);

        assert_eq!(bounds.width(), 1920);
        assert_eq!(bounds.height(), 1080);
        assert_eq!(bounds.pixel_count(), 1920 * 1080);
    }

    #[test]
    fn raw_buffer_reports_element_count_per_kind() {
        assert_eq!(RawSampleBuffer::U8(vec![0; 12]).len(), 12);
        assert_eq!(RawSampleBuffer::U16(vec![0; 7]).len(), 7);
        assert_eq!(RawSampleBuffer::F32(vec![0.0; 3]).len(), 3);
        assert_eq!(RawSampleBuffer::F64(vec![0.0; 2]).len(), 2);
        assert_eq!(RawSampleBuffer::Bytes(vec![0; 9]).len(), 9);
        assert!(RawSampleBuffer::U8(Vec::new()).is_empty());
    }

    #[test]
    fn pixel_request_carries_fixed_color_parameters() {
        let bounds = SelectionBounds::new(0.0, 0.0, 4.0, 4.0);
        let request = PixelRequest::rgb(7, bounds, None);

        assert_eq!(request.color_space, COLOR_SPACE_RGB);
        assert_eq!(request.color_profile, SRGB_COLOR_PROFILE);
        assert!(!request.apply_alpha);
        assert!(request.has_alpha);
    }
}
