//! # 像素流水线模块（pixel）
//!
//! ## 设计思路
//!
//! 该模块将“原始采样归一化 → 伽马编码 → 色相旋转 → 蒙版合成 →
//! 降采样规划”按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `normalize`：多种元素类型与量程约定收敛到 0..255
//! - `srgb`：线性光 → sRGB 编码查找表
//! - `hue`：HSV 空间色相旋转
//! - `composite`：蒙版当 alpha 的 RGBA 合成与白底压平
//! - `plan`：大尺寸区域的请求级降采样规划
//! - `error`：本阶段错误模型
//!
//! ## 实现思路
//!
//! 全部是纯函数：输入缓冲、输出缓冲，不碰宿主也不碰网络，
//! 数值行为可以逐字节断言。服务层负责把宿主缓冲喂进来。

mod composite;
mod error;
mod hue;
mod normalize;
mod plan;
mod srgb;

pub use composite::{composite_selection, infer_components, CompositeOptions, SelectionRgba};
pub use error::PixelError;
pub use normalize::{min_max_u8, normalize_to_u8};
pub use plan::{plan_request_size, DownsamplePlan, MAX_REQUEST_EDGE};
pub use srgb::encode_lut;
