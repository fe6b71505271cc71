//! # 降采样规划模块
//!
//! 超大画布直接出图会耗尽面板内存，宿主成像接口又支持在请求里
//! 附带目标尺寸、由宿主侧先行缩放。这里只做规划：长边超过上限
//! 时算出等比目标尺寸，真正的重采样交给宿主完成，本地不做任何
//! 像素缩放。

use crate::host::TargetSize;

/// 单边最大请求尺寸。
pub const MAX_REQUEST_EDGE: u32 = 8192;

/// 降采样规划结果。
///
/// `target_size` 为 `None` 表示尺寸在上限内，按原尺寸请求即可；
/// `out_width`/`out_height` 是宿主实际返回缓冲的尺寸，像素与蒙版
/// 请求共用同一份规划，两边长度才能对得上。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownsamplePlan {
    pub target_size: Option<TargetSize>,
    pub out_width: u32,
    pub out_height: u32,
}

/// 按长边 ≤ [`MAX_REQUEST_EDGE`] 规划请求尺寸，等比缩放短边。
pub fn plan_request_size(width: u32, height: u32) -> DownsamplePlan {
    if width.max(height) <= MAX_REQUEST_EDGE {
        return DownsamplePlan {
            target_size: None,
            out_width: width,
            out_height: height,
        };
    }

    let scale_to_edge = |longer: u32, other: u32| -> u32 {
        let scaled = f64::from(other) * f64::from(MAX_REQUEST_EDGE) / f64::from(longer);
        (scaled.round() as u32).max(1)
    };

    let (out_width, out_height) = if width >= height {
        (MAX_REQUEST_EDGE, scale_to_edge(width, height))
    } else {
        (scale_to_edge(height, width), MAX_REQUEST_EDGE)
    };

    DownsamplePlan {
        target_size: Some(TargetSize {
            width: out_width,
            height: out_height,
        }),
        out_width,
        out_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_regions_keep_native_size() {
        let plan = plan_request_size(4000, 2000);

        assert_eq!(plan.target_size, None);
        assert_eq!((plan.out_width, plan.out_height), (4000, 2000));
    }

    #[test]
    fn boundary_edge_is_not_downsampled() {
        let plan = plan_request_size(MAX_REQUEST_EDGE, MAX_REQUEST_EDGE);

        assert_eq!(plan.target_size, None);
        assert_eq!((plan.out_width, plan.out_height), (8192, 8192));
    }

    #[test]
    fn wide_regions_cap_the_long_edge() {
        let plan = plan_request_size(10000, 5000);

        assert_eq!(
            plan.target_size,
            Some(TargetSize {
                width: 8192,
                height: 4096,
            })
        );
        assert_eq!((plan.out_width, plan.out_height), (8192, 4096));
    }

    #[test]
    fn tall_regions_cap_the_other_way() {
        let plan = plan_request_size(5000, 10000);

        assert_eq!(
            plan.target_size,
            Some(TargetSize {
                width: 4096,
                height: 8192,
            })
        );
    }

    #[test]
    fn short_edge_never_collapses_to_zero() {
        let plan = plan_request_size(100_000, 3);

        assert_eq!(
            plan.target_size,
            Some(TargetSize {
                width: 8192,
                height: 1,
            })
        );
    }

    #[test]
    fn one_past_boundary_rounds_sensibly() {
        let plan = plan_request_size(8193, 1);

        assert_eq!(
            plan.target_size,
            Some(TargetSize {
                width: 8192,
                height: 1,
            })
        );
    }
}
