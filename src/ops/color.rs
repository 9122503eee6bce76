use crate::animation::frame::{Animation, Frame};
use crate::foundation::error::EmoteResult;
use crate::ops::{TransformCtx, map_frames};

/// Rec. 601 luma with 16-bit fixed-point weights.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((19595 * u32::from(r) + 38470 * u32::from(g) + 7471 * u32::from(b) + (1 << 15)) >> 16) as u8
}

/// RGB in `[0, 1]` to `(hue degrees, saturation, value)`.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let mut h = if chroma == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / chroma + 2.0)
    } else {
        60.0 * ((r - g) / chroma + 4.0)
    };
    if h < 0.0 {
        h += 360.0;
    }

    let s = if max == 0.0 { 0.0 } else { chroma / max };
    (h, s, max)
}

/// Inverse of [`rgb_to_hsv`]; hue wraps modulo 360.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }

    let h = h.rem_euclid(360.0);
    let chroma = v * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = v - chroma;
    (r + m, g + m, b + m)
}

fn to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// `>gray`: luma-only color; fully transparent pixels pass through untouched.
pub(crate) fn gray(anim: &Animation, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    map_frames(anim, |_, frame| {
        let mut data = frame.data().to_vec();
        for px in data.chunks_exact_mut(4) {
            if px[3] == 0 {
                continue;
            }
            let y = luma(px[0], px[1], px[2]);
            px[..3].fill(y);
        }
        Frame::new(frame.width(), frame.height(), data)
    })
}

/// Hue of frame `i` under `>rave`: one full turn over the whole animation.
pub(crate) fn rave_hue(timestamp: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    360.0 * timestamp as f64 / total as f64
}

/// `>rave`: replace every pixel's hue, sweeping the color wheel once over the duration.
pub(crate) fn rave(anim: &Animation, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    let total = anim.duration_ms();
    let timestamps = anim.timestamps();

    map_frames(anim, |i, frame| {
        let hue = rave_hue(timestamps[i], total);
        let mut data = frame.data().to_vec();
        for px in data.chunks_exact_mut(4) {
            let (_, s, v) = rgb_to_hsv(
                f64::from(px[0]) / 255.0,
                f64::from(px[1]) / 255.0,
                f64::from(px[2]) / 255.0,
            );
            let (r, g, b) = hsv_to_rgb(hue, s, v);
            px[0] = to_u8(r);
            px[1] = to_u8(g);
            px[2] = to_u8(b);
        }
        Frame::new(frame.width(), frame.height(), data)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/ops/color.rs"]
mod tests;
