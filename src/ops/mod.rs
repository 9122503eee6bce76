//! The fixed operator catalog.
//!
//! Every operator is a static [`Operation`] descriptor; the evaluator dispatches by looking the
//! symbol up in [`CATALOG`]. Adding an operator means adding a row here and nothing else.

use rayon::prelude::*;

use crate::animation::frame::{Animation, Frame};
use crate::animation::timeline::merge_timelines;
use crate::foundation::error::EmoteResult;

pub(crate) mod color;
pub(crate) mod composite;
pub(crate) mod mirror;
pub(crate) mod motion;
pub(crate) mod scale;
pub(crate) mod stack;

/// Default hold time of a still image when it has to occupy time on its own.
pub const DEFAULT_STILL_FRAME_MILLIS: i64 = 1000;

/// Largest timestamp a transform may produce. Leaves headroom so that stacking or looping two
/// timelines stays inside `i64`.
pub(crate) const MAX_TIMESTAMP_MILLIS: i64 = i64::MAX / 2;

/// How an operator consumes the operand stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// One animation in, one out.
    Unary,
    /// Two animations in (`first` was pushed before `second`), one out.
    Binary,
    /// One animation plus a numeric coefficient.
    Linear,
    /// Pure stack manipulation.
    StackOp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackOp {
    Dup,
    Swap,
}

pub type UnaryFn = fn(&Animation, &TransformCtx) -> EmoteResult<Animation>;
pub type BinaryFn = fn(&Animation, &Animation, &TransformCtx) -> EmoteResult<Animation>;
pub type LinearFn = fn(&Animation, f64, &TransformCtx) -> EmoteResult<Animation>;

#[derive(Clone, Copy, Debug)]
pub enum Transform {
    Unary(UnaryFn),
    /// A linear transform with its coefficient baked in; behaves as unary.
    Fixed { apply: LinearFn, coefficient: f64 },
    Binary(BinaryFn),
    Linear(LinearFn),
    Stack(StackOp),
}

/// Static descriptor of one catalog entry.
#[derive(Clone, Copy, Debug)]
pub struct Operation {
    pub symbol: &'static str,
    pub transform: Transform,
    pub summary: &'static str,
}

impl Operation {
    pub fn arity(&self) -> Arity {
        match self.transform {
            Transform::Unary(_) | Transform::Fixed { .. } => Arity::Unary,
            Transform::Binary(_) => Arity::Binary,
            Transform::Linear(_) => Arity::Linear,
            Transform::Stack(_) => Arity::StackOp,
        }
    }
}

/// Knobs shared by every transform invocation of one engine.
#[derive(Clone, Copy, Debug)]
pub struct TransformCtx {
    /// Seed for `>shake`. `None` draws a fresh seed per invocation.
    pub shake_seed: Option<u64>,
    pub still_frame_millis: i64,
}

impl Default for TransformCtx {
    fn default() -> Self {
        Self {
            shake_seed: None,
            still_frame_millis: DEFAULT_STILL_FRAME_MILLIS,
        }
    }
}

macro_rules! op {
    ($symbol:literal, $transform:expr, $summary:literal) => {
        Operation {
            symbol: $symbol,
            transform: $transform,
            summary: $summary,
        }
    };
}

pub static CATALOG: &[Operation] = &[
    op!(">revx", Transform::Unary(mirror::reverse_x), "mirror horizontally"),
    op!(">revy", Transform::Unary(mirror::reverse_y), "mirror vertically"),
    op!(">revt", Transform::Unary(mirror::reverse_t), "play backwards"),
    op!(">over", Transform::Binary(composite::over), "draw second over first"),
    op!(">stackx", Transform::Binary(stack::stack_x), "place side by side"),
    op!(">stacky", Transform::Binary(stack::stack_y), "place top to bottom"),
    op!(">stackt", Transform::Binary(stack::stack_t), "play one after the other"),
    op!(">scalex", Transform::Linear(scale::scale_x), "scale width by coefficient"),
    op!(">scaley", Transform::Linear(scale::scale_y), "scale height by coefficient"),
    op!(">scalet", Transform::Linear(scale::scale_t), "scale timestamps by coefficient"),
    op!(
        ">iscalex",
        Transform::Fixed {
            apply: scale::scale_x,
            coefficient: 2.0
        },
        "double width"
    ),
    op!(
        ">iscaley",
        Transform::Fixed {
            apply: scale::scale_y,
            coefficient: 2.0
        },
        "double height"
    ),
    op!(
        ">iscalet",
        Transform::Fixed {
            apply: scale::scale_t,
            coefficient: 2.0
        },
        "half speed"
    ),
    op!(
        ">dscalex",
        Transform::Fixed {
            apply: scale::scale_x,
            coefficient: 0.5
        },
        "halve width"
    ),
    op!(
        ">dscaley",
        Transform::Fixed {
            apply: scale::scale_y,
            coefficient: 0.5
        },
        "halve height"
    ),
    op!(
        ">dscalet",
        Transform::Fixed {
            apply: scale::scale_t,
            coefficient: 0.5
        },
        "double speed"
    ),
    op!(">dup", Transform::Stack(StackOp::Dup), "duplicate top of stack"),
    op!(">swap", Transform::Stack(StackOp::Swap), "swap top two stack values"),
    op!(">gray", Transform::Unary(color::gray), "grayscale"),
    op!(">shake", Transform::Unary(motion::shake), "random per-frame jitter"),
    op!(">slide_in", Transform::Unary(motion::slide_in), "ease in from the left"),
    op!(">rave", Transform::Unary(color::rave), "cycle hue over the animation"),
];

pub fn lookup(symbol: &str) -> Option<&'static Operation> {
    CATALOG.iter().find(|op| op.symbol == symbol)
}

/// Apply `f` to every frame, keeping canvas and timestamps.
pub(crate) fn map_frames<F>(anim: &Animation, f: F) -> EmoteResult<Animation>
where
    F: Fn(usize, &Frame) -> EmoteResult<Frame> + Sync + Send,
{
    map_frames_resized(anim, anim.canvas_width(), anim.canvas_height(), f)
}

/// Apply `f` to every frame; `f` must produce frames of `width` x `height`.
pub(crate) fn map_frames_resized<F>(
    anim: &Animation,
    width: u32,
    height: u32,
    f: F,
) -> EmoteResult<Animation>
where
    F: Fn(usize, &Frame) -> EmoteResult<Frame> + Sync + Send,
{
    let frames = anim
        .frames()
        .par_iter()
        .enumerate()
        .map(|(i, frame)| f(i, frame))
        .collect::<EmoteResult<Vec<_>>>()?;
    Animation::new(width, height, frames, anim.timestamps().to_vec())
}

/// Combine frame pairs along the merged timeline of `a` and `b`.
pub(crate) fn zip_frames<F>(
    a: &Animation,
    b: &Animation,
    width: u32,
    height: u32,
    f: F,
) -> EmoteResult<Animation>
where
    F: Fn(&Frame, &Frame) -> EmoteResult<Frame> + Sync + Send,
{
    let merged = merge_timelines(a.timestamps(), b.timestamps())?;
    let frames = merged
        .par_iter()
        .map(|e| f(&a.frames()[e.index_a], &b.frames()[e.index_b]))
        .collect::<EmoteResult<Vec<_>>>()?;
    let timestamps = merged.iter().map(|e| e.timestamp_ms).collect();
    Animation::new(width, height, frames, timestamps)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/catalog.rs"]
mod tests;
