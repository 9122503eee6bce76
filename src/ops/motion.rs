use crate::animation::frame::{Animation, Frame};
use crate::foundation::error::EmoteResult;
use crate::foundation::rng::Rng64;
use crate::ops::{TransformCtx, map_frames};

/// Translate a frame by `(dx, dy)`; uncovered pixels become transparent.
pub(crate) fn shift_frame(frame: &Frame, dx: i64, dy: i64) -> EmoteResult<Frame> {
    let mut data = Vec::with_capacity(frame.data().len());
    for y in 0..i64::from(frame.height()) {
        for x in 0..i64::from(frame.width()) {
            data.extend_from_slice(&frame.pixel_or_clear(x - dx, y - dy));
        }
    }
    Frame::new(frame.width(), frame.height(), data)
}

/// Per-frame offsets for `>shake`, each in `[-w/2, w/2) x [-h/2, h/2)`.
pub(crate) fn shake_offsets(rng: &mut Rng64, frames: usize, w: u32, h: u32) -> Vec<(i64, i64)> {
    let (half_w, half_h) = (i64::from(w / 2), i64::from(h / 2));
    (0..frames)
        .map(|_| {
            let dx = i64::from(rng.next_below(w)) - half_w;
            let dy = i64::from(rng.next_below(h)) - half_h;
            (dx, dy)
        })
        .collect()
}

/// `>shake`: jitter every frame by an independent random offset.
#[tracing::instrument(skip(anim, ctx), fields(frames = anim.frame_count()))]
pub(crate) fn shake(anim: &Animation, ctx: &TransformCtx) -> EmoteResult<Animation> {
    let mut rng = match ctx.shake_seed {
        Some(seed) => Rng64::new(seed),
        None => Rng64::from_entropy(),
    };
    let offsets = shake_offsets(
        &mut rng,
        anim.frame_count(),
        anim.canvas_width(),
        anim.canvas_height(),
    );

    map_frames(anim, |i, frame| {
        let (dx, dy) = offsets[i];
        shift_frame(frame, dx, dy)
    })
}

/// Horizontal offset of `>slide_in` for a frame ending at `timestamp`.
pub(crate) fn slide_offset(width: u32, timestamp: i64, total: i64) -> i64 {
    let d = if total > 0 {
        timestamp as f64 / total as f64
    } else {
        1.0
    };
    -((f64::from(width) * (1.0 - d) * (1.0 - d)) as i64)
}

/// `>slide_in`: ease in from fully off-canvas on the left to the original position.
pub(crate) fn slide_in(anim: &Animation, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    let total = anim.duration_ms();
    let timestamps = anim.timestamps();
    let width = anim.canvas_width();

    map_frames(anim, |i, frame| {
        shift_frame(frame, slide_offset(width, timestamps[i], total), 0)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/ops/motion.rs"]
mod tests;
