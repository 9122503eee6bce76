use crate::animation::frame::{Animation, Frame};
use crate::foundation::error::{EmoteError, EmoteResult};
use crate::ops::{MAX_TIMESTAMP_MILLIS, TransformCtx, map_frames_resized};

fn check_coefficient(op: &str, k: f64) -> EmoteResult<()> {
    if !k.is_finite() || k <= 0.0 {
        return Err(EmoteError::invalid_argument(format!(
            "{op} coefficient must be finite and > 0, got {k}"
        )));
    }
    Ok(())
}

fn scaled_len(len: u32, k: f64) -> EmoteResult<u32> {
    let v = (f64::from(len) * k).round();
    if v > f64::from(u16::MAX) {
        return Err(EmoteError::invalid_argument(format!(
            "scaled dimension {v} is too large"
        )));
    }
    Ok((v as u32).max(1))
}

/// Nearest source index for destination index `i` under scale `k`.
fn source_index(i: u32, k: f64, src_len: u32) -> u32 {
    ((f64::from(i) / k) as u32).min(src_len - 1)
}

/// `>scalex`: nearest-neighbor resample of the width.
pub(crate) fn scale_x(anim: &Animation, k: f64, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    check_coefficient(">scalex", k)?;
    let w = scaled_len(anim.canvas_width(), k)?;
    let h = anim.canvas_height();
    let columns = (0..w)
        .map(|x| source_index(x, k, anim.canvas_width()) as usize)
        .collect::<Vec<_>>();

    map_frames_resized(anim, w, h, |_, frame| {
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for y in 0..h {
            let row = frame.row(y);
            for &sx in &columns {
                data.extend_from_slice(&row[sx * 4..sx * 4 + 4]);
            }
        }
        Frame::new(w, h, data)
    })
}

/// `>scaley`: nearest-neighbor resample of the height.
pub(crate) fn scale_y(anim: &Animation, k: f64, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    check_coefficient(">scaley", k)?;
    let w = anim.canvas_width();
    let h = scaled_len(anim.canvas_height(), k)?;

    map_frames_resized(anim, w, h, |_, frame| {
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for y in 0..h {
            data.extend_from_slice(frame.row(source_index(y, k, frame.height())));
        }
        Frame::new(w, h, data)
    })
}

/// `>scalet`: multiply every timestamp by `k`, pixels untouched.
///
/// Rounded timestamps that would collide with their predecessor are pushed 1ms later.
pub(crate) fn scale_t(anim: &Animation, k: f64, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    check_coefficient(">scalet", k)?;
    if anim.is_still() {
        return Ok(anim.clone());
    }

    let mut prev = 0i64;
    let timestamps = anim
        .timestamps()
        .iter()
        .map(|&t| {
            let scaled = ((t as f64) * k).round();
            if scaled >= MAX_TIMESTAMP_MILLIS as f64 {
                return Err(EmoteError::invalid_argument(format!(
                    ">scalet by {k} overflows the timeline"
                )));
            }
            prev = (scaled as i64).max(prev + 1);
            Ok(prev)
        })
        .collect::<EmoteResult<Vec<_>>>()?;

    Animation::new(
        anim.canvas_width(),
        anim.canvas_height(),
        anim.frames().to_vec(),
        timestamps,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/ops/scale.rs"]
mod tests;
