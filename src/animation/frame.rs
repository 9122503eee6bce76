use crate::foundation::error::{EmoteError, EmoteResult};

/// One raster frame: straight (non-premultiplied) RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> EmoteResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| EmoteError::animation("frame size overflow"))?;
        if data.len() != expected {
            return Err(EmoteError::animation(format!(
                "frame {width}x{height} expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between vertically adjacent pixels.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = y as usize * self.stride() + x as usize * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Pixel at signed coordinates, transparent outside the frame.
    pub fn pixel_or_clear(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return [0; 4];
        }
        self.pixel(x as u32, y as u32)
    }
}

/// A decoded animation.
///
/// `timestamps[i]` is the end time of frame `i` in milliseconds from the start. A still image is
/// a single frame with timestamp `0`; every multi-frame animation starts strictly after `0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Animation {
    frames: Vec<Frame>,
    timestamps: Vec<i64>,
    canvas_width: u32,
    canvas_height: u32,
}

impl Animation {
    pub fn new(
        canvas_width: u32,
        canvas_height: u32,
        frames: Vec<Frame>,
        timestamps: Vec<i64>,
    ) -> EmoteResult<Self> {
        if canvas_width == 0 || canvas_height == 0 {
            return Err(EmoteError::animation("canvas must be non-empty"));
        }
        if frames.is_empty() {
            return Err(EmoteError::animation("animation needs at least one frame"));
        }
        if frames.len() != timestamps.len() {
            return Err(EmoteError::animation(format!(
                "{} frames but {} timestamps",
                frames.len(),
                timestamps.len()
            )));
        }
        if let Some(f) = frames
            .iter()
            .find(|f| f.width() != canvas_width || f.height() != canvas_height)
        {
            return Err(EmoteError::animation(format!(
                "frame {}x{} does not match canvas {canvas_width}x{canvas_height}",
                f.width(),
                f.height()
            )));
        }
        check_timestamps(&timestamps)?;

        Ok(Self {
            frames,
            timestamps,
            canvas_width,
            canvas_height,
        })
    }

    /// Single-frame still image.
    pub fn still(frame: Frame) -> Self {
        Self {
            canvas_width: frame.width(),
            canvas_height: frame.height(),
            frames: vec![frame],
            timestamps: vec![0],
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// End time of the last frame.
    pub fn duration_ms(&self) -> i64 {
        self.timestamps[self.timestamps.len() - 1]
    }

    pub fn is_still(&self) -> bool {
        self.timestamps == [0]
    }

    /// Per-frame display durations; the first frame runs from `0`.
    pub fn durations(&self) -> Vec<i64> {
        durations(&self.timestamps)
    }

    pub fn into_parts(self) -> (Vec<Frame>, Vec<i64>) {
        (self.frames, self.timestamps)
    }
}

pub(crate) fn durations(timestamps: &[i64]) -> Vec<i64> {
    let mut prev = 0;
    timestamps
        .iter()
        .map(|&t| {
            let d = t - prev;
            prev = t;
            d
        })
        .collect()
}

pub(crate) fn check_timestamps(timestamps: &[i64]) -> EmoteResult<()> {
    let Some(&first) = timestamps.first() else {
        return Err(EmoteError::EmptyTimeSeries);
    };
    if first < 0 {
        return Err(EmoteError::animation("timestamps must not be negative"));
    }
    if timestamps.len() > 1 && first == 0 {
        return Err(EmoteError::animation(
            "only a single-frame still may end at timestamp 0",
        ));
    }
    if let Some(w) = timestamps.windows(2).find(|w| w[1] <= w[0]) {
        return Err(EmoteError::animation(format!(
            "timestamps must be strictly increasing ({} then {})",
            w[0], w[1]
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/frame.rs"]
mod tests;
