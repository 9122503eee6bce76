use crate::animation::frame::{Animation, Frame};
use crate::foundation::error::{EmoteError, EmoteResult};
use crate::ops::{MAX_TIMESTAMP_MILLIS, TransformCtx, zip_frames};

/// `>stackx`: `first` on the left, `second` on the right.
pub(crate) fn stack_x(
    first: &Animation,
    second: &Animation,
    _ctx: &TransformCtx,
) -> EmoteResult<Animation> {
    if first.canvas_height() != second.canvas_height() {
        return Err(EmoteError::DimensionMismatch {
            op: ">stackx",
            message: format!(
                "unequal heights {} and {}",
                first.canvas_height(),
                second.canvas_height()
            ),
        });
    }

    zip_frames(
        first,
        second,
        first.canvas_width() + second.canvas_width(),
        first.canvas_height(),
        |a, b| {
            let mut data = Vec::with_capacity(a.data().len() + b.data().len());
            for y in 0..a.height() {
                data.extend_from_slice(a.row(y));
                data.extend_from_slice(b.row(y));
            }
            Frame::new(a.width() + b.width(), a.height(), data)
        },
    )
}

/// `>stacky`: `first` on top, `second` below.
pub(crate) fn stack_y(
    first: &Animation,
    second: &Animation,
    _ctx: &TransformCtx,
) -> EmoteResult<Animation> {
    if first.canvas_width() != second.canvas_width() {
        return Err(EmoteError::DimensionMismatch {
            op: ">stacky",
            message: format!(
                "unequal widths {} and {}",
                first.canvas_width(),
                second.canvas_width()
            ),
        });
    }

    zip_frames(
        first,
        second,
        first.canvas_width(),
        first.canvas_height() + second.canvas_height(),
        |a, b| {
            let mut data = Vec::with_capacity(a.data().len() + b.data().len());
            data.extend_from_slice(a.data());
            data.extend_from_slice(b.data());
            Frame::new(a.width(), a.height() + b.height(), data)
        },
    )
}

/// `>stackt`: all of `first`, then all of `second`. A still operand is held for
/// `ctx.still_frame_millis`.
pub(crate) fn stack_t(
    first: &Animation,
    second: &Animation,
    ctx: &TransformCtx,
) -> EmoteResult<Animation> {
    if (first.canvas_width(), first.canvas_height())
        != (second.canvas_width(), second.canvas_height())
    {
        return Err(EmoteError::DimensionMismatch {
            op: ">stackt",
            message: format!(
                "canvas {}x{} differs from {}x{}",
                first.canvas_width(),
                first.canvas_height(),
                second.canvas_width(),
                second.canvas_height()
            ),
        });
    }
    if ctx.still_frame_millis <= 0 {
        return Err(EmoteError::invalid_argument(
            "still frame duration must be positive",
        ));
    }

    let held = |anim: &Animation| -> Vec<i64> {
        if anim.is_still() {
            vec![ctx.still_frame_millis]
        } else {
            anim.timestamps().to_vec()
        }
    };

    let mut timestamps = held(first);
    let offset = timestamps[timestamps.len() - 1];
    for t in held(second) {
        let shifted = t
            .checked_add(offset)
            .filter(|&t| t <= MAX_TIMESTAMP_MILLIS)
            .ok_or_else(|| EmoteError::invalid_argument(">stackt overflows the timeline"))?;
        timestamps.push(shifted);
    }

    let frames = first
        .frames()
        .iter()
        .chain(second.frames())
        .cloned()
        .collect();
    Animation::new(
        first.canvas_width(),
        first.canvas_height(),
        frames,
        timestamps,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/ops/stack.rs"]
mod tests;
