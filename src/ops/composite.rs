use crate::animation::frame::{Animation, Frame};
use crate::foundation::error::{EmoteError, EmoteResult};
use crate::ops::{TransformCtx, zip_frames};

pub type Rgba8 = [u8; 4];

/// Source-over of straight-alpha pixels. Color takes the foreground in proportion to its alpha;
/// the output alpha is the larger of the two.
pub fn over_pixel(bg: Rgba8, fg: Rgba8) -> Rgba8 {
    let alpha = u32::from(fg[3]);
    let inv = 255 - alpha;

    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = ((u32::from(bg[i]) * inv + u32::from(fg[i]) * alpha) / 255) as u8;
    }
    out[3] = bg[3].max(fg[3]);
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> EmoteResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(EmoteError::invalid_argument(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over_pixel([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite `fg` onto a copy of `bg`, anchored at the top-left corner.
pub(crate) fn over_frame(bg: &Frame, fg: &Frame) -> EmoteResult<Frame> {
    let mut out = bg.clone();
    if bg.width() == fg.width() && bg.height() == fg.height() {
        over_in_place(out.data_mut(), fg.data())?;
        return Ok(out);
    }

    let w = bg.width().min(fg.width()) as usize;
    let h = bg.height().min(fg.height());
    let stride = out.stride();
    for y in 0..h {
        let start = y as usize * stride;
        over_in_place(&mut out.data_mut()[start..start + w * 4], &fg.row(y)[..w * 4])?;
    }
    Ok(out)
}

/// `>over`: `first` is the background, `second` the foreground.
pub(crate) fn over(
    first: &Animation,
    second: &Animation,
    _ctx: &TransformCtx,
) -> EmoteResult<Animation> {
    zip_frames(
        first,
        second,
        first.canvas_width(),
        first.canvas_height(),
        over_frame,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/ops/composite.rs"]
mod tests;
