use crate::animation::frame::{Animation, Frame};
use crate::animation::timeline::reverse_timeline;
use crate::foundation::error::EmoteResult;
use crate::ops::{TransformCtx, map_frames};

/// `>revx`
pub(crate) fn reverse_x(anim: &Animation, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    map_frames(anim, |_, frame| {
        let mut data = Vec::with_capacity(frame.data().len());
        for y in 0..frame.height() {
            for px in frame.row(y).chunks_exact(4).rev() {
                data.extend_from_slice(px);
            }
        }
        Frame::new(frame.width(), frame.height(), data)
    })
}

/// `>revy`
pub(crate) fn reverse_y(anim: &Animation, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    map_frames(anim, |_, frame| {
        let mut data = Vec::with_capacity(frame.data().len());
        for y in (0..frame.height()).rev() {
            data.extend_from_slice(frame.row(y));
        }
        Frame::new(frame.width(), frame.height(), data)
    })
}

/// `>revt`: same frames back-to-front, each keeping its own display duration.
pub(crate) fn reverse_t(anim: &Animation, _ctx: &TransformCtx) -> EmoteResult<Animation> {
    let timestamps = reverse_timeline(anim.timestamps())?;
    let frames = anim.frames().iter().rev().cloned().collect();
    Animation::new(anim.canvas_width(), anim.canvas_height(), frames, timestamps)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/mirror.rs"]
mod tests;
