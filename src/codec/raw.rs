use crate::animation::frame::{Animation, Frame};
use crate::codec::Codec;
use crate::foundation::error::{EmoteError, EmoteResult};

const MAGIC: &[u8; 8] = b"EMOTERAW";
const VERSION: u16 = 1;
const HEADER_LEN: usize = 8 + 2 + 4 + 4 + 4;

/// Lossless container used for stored artifacts.
///
/// Layout, little-endian: magic, `u16` version, `u32` width, `u32` height, `u32` frame count,
/// one `i64` timestamp per frame, then every frame's RGBA8 bytes in order.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawCodec;

impl RawCodec {
    pub fn detect(bytes: &[u8]) -> bool {
        bytes.starts_with(MAGIC)
    }
}

impl Codec for RawCodec {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn decode(&self, id: &str, bytes: &[u8]) -> EmoteResult<Animation> {
        let mut r = Reader { bytes, pos: 0, id };
        if r.take(8)? != MAGIC {
            return Err(EmoteError::codec(id, "not an EMOTERAW container"));
        }
        let version = u16::from_le_bytes(r.array()?);
        if version != VERSION {
            return Err(EmoteError::codec(
                id,
                format!("unsupported EMOTERAW version {version}"),
            ));
        }
        let width = u32::from_le_bytes(r.array()?);
        let height = u32::from_le_bytes(r.array()?);
        let count = u32::from_le_bytes(r.array()?) as usize;

        let frame_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| EmoteError::codec(id, "frame size overflow"))?;
        let expected = count
            .checked_mul(8 + frame_len)
            .and_then(|v| v.checked_add(HEADER_LEN))
            .ok_or_else(|| EmoteError::codec(id, "container size overflow"))?;
        if bytes.len() != expected {
            return Err(EmoteError::codec(
                id,
                format!("expected {expected} bytes, got {}", bytes.len()),
            ));
        }

        let timestamps = (0..count)
            .map(|_| r.array().map(i64::from_le_bytes))
            .collect::<EmoteResult<Vec<_>>>()?;
        let frames = (0..count)
            .map(|_| Frame::new(width, height, r.take(frame_len)?.to_vec()))
            .collect::<EmoteResult<Vec<_>>>()?;

        Animation::new(width, height, frames, timestamps)
            .map_err(|e| EmoteError::codec(id, e.to_string()))
    }

    fn encode(&self, _id: &str, anim: &Animation) -> EmoteResult<Vec<u8>> {
        let frame_len = anim.frames()[0].data().len();
        let mut out = Vec::with_capacity(HEADER_LEN + anim.frame_count() * (8 + frame_len));
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&anim.canvas_width().to_le_bytes());
        out.extend_from_slice(&anim.canvas_height().to_le_bytes());
        out.extend_from_slice(&(anim.frame_count() as u32).to_le_bytes());
        for t in anim.timestamps() {
            out.extend_from_slice(&t.to_le_bytes());
        }
        for frame in anim.frames() {
            out.extend_from_slice(frame.data());
        }
        Ok(out)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    id: &'a str,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> EmoteResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| EmoteError::codec(self.id, "truncated EMOTERAW container"))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> EmoteResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/raw.rs"]
mod tests;
