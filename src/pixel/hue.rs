//! # 色相旋转模块
//!
//! 在 HSV 空间里对 RGBA 工作副本做整体色相偏移。转换采用标准的
//! 六扇区公式；灰像素（R=G=B）没有色相，原样跳过，避免浮点换算
//! 在中性色上引入可见色偏。alpha 通道不参与。

/// 对交错 RGBA 缓冲就地旋转色相，`degrees` 可为负或超过 360。
pub fn rotate_hue_in_place(rgba: &mut [u8], degrees: f32) {
    let shift = degrees.rem_euclid(360.0);
    if shift == 0.0 {
        return;
    }

    for pixel in rgba.chunks_exact_mut(4) {
        let (r, g, b) = (pixel[0], pixel[1], pixel[2]);
        if r == g && g == b {
            continue;
        }

        let (h, s, v) = rgb_to_hsv(r, g, b);
        let (nr, ng, nb) = hsv_to_rgb(h + shift, s, v);
        pixel[0] = nr;
        pixel[1] = ng;
        pixel[2] = nb;
    }
}

fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if max == gf {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let h = h.rem_euclid(360.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((g + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((b + m) * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colors_rotate_between_sectors() {
        let mut rgba = vec![255, 0, 0, 200];
        rotate_hue_in_place(&mut rgba, 120.0);
        assert_eq!(rgba, vec![0, 255, 0, 200]);

        let mut rgba = vec![255, 0, 0, 10];
        rotate_hue_in_place(&mut rgba, -120.0);
        assert_eq!(rgba, vec![0, 0, 255, 10]);
    }

    #[test]
    fn opposite_rotation_lands_on_complement() {
        let mut rgba = vec![0, 255, 255, 255];

        rotate_hue_in_place(&mut rgba, 180.0);
        assert_eq!(rgba, vec![255, 0, 0, 255]);
    }

    #[test]
    fn gray_pixels_are_left_alone() {
        let mut rgba = vec![128, 128, 128, 64, 0, 0, 0, 255, 255, 255, 255, 9];
        let original = rgba.clone();

        rotate_hue_in_place(&mut rgba, 77.5);
        assert_eq!(rgba, original);
    }

    #[test]
    fn full_turn_is_a_no_op() {
        let mut rgba = vec![12, 200, 90, 128];
        let original = rgba.clone();

        rotate_hue_in_place(&mut rgba, 360.0);
        assert_eq!(rgba, original);

        rotate_hue_in_place(&mut rgba, -720.0);
        assert_eq!(rgba, original);
    }

    #[test]
    fn fractional_channels_round_instead_of_truncating() {
        // 纯蓝 (0,0,69) 转 37°：h=240→277，R 通道落在 42.55，
        // 必须四舍五入到 43 而不是截断成 42。
        let mut rgba = vec![0, 0, 69, 255];
        rotate_hue_in_place(&mut rgba, 37.0);
        assert_eq!(rgba, vec![43, 0, 69, 255]);

        // 同一角度更亮的蓝：R = 0.6167×207 = 127.65 → 128。
        let mut rgba = vec![0, 0, 207, 255];
        rotate_hue_in_place(&mut rgba, 37.0);
        assert_eq!(rgba, vec![128, 0, 207, 255]);
    }

    #[test]
    fn alpha_survives_arbitrary_rotation() {
        let mut rgba = vec![30, 180, 77, 42, 250, 4, 99, 171];

        rotate_hue_in_place(&mut rgba, 211.3);
        assert_eq!(rgba[3], 42);
        assert_eq!(rgba[7], 171);
    }
}
