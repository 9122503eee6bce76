use std::io::Cursor;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, Delay, ImageDecoder, ImageFormat, RgbaImage};

use crate::animation::frame::{Animation, Frame};
use crate::codec::Codec;
use crate::foundation::error::{EmoteError, EmoteResult};

/// Delay substituted for frames that declare none, matching what browsers do.
pub const DEFAULT_FRAME_DELAY_MS: i64 = 100;

/// Codec over the `image` crate: decodes animated GIF, animated WebP and still images of any
/// format `image` recognizes; encodes animated GIF.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn name(&self) -> &'static str {
        "image"
    }

    fn decode(&self, id: &str, bytes: &[u8]) -> EmoteResult<Animation> {
        let err = |e: image::ImageError| EmoteError::codec(id, e.to_string());
        let format = image::guess_format(bytes).map_err(err)?;

        let (width, height, frames) = match format {
            ImageFormat::Gif => {
                let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(err)?;
                let (w, h) = decoder.dimensions();
                (w, h, decoder.into_frames().collect_frames().map_err(err)?)
            }
            ImageFormat::WebP => {
                let decoder = WebPDecoder::new(Cursor::new(bytes)).map_err(err)?;
                if !decoder.has_animation() {
                    return still_from_memory(id, bytes);
                }
                let (w, h) = decoder.dimensions();
                (w, h, decoder.into_frames().collect_frames().map_err(err)?)
            }
            _ => return still_from_memory(id, bytes),
        };

        if frames.len() == 1 {
            let frame = frames.into_iter().next().map(|f| place(width, height, f));
            return match frame {
                Some(f) => Ok(Animation::still(to_frame(id, f)?)),
                None => Err(EmoteError::codec(id, "animation has no frames")),
            };
        }

        let mut t = 0i64;
        let mut timestamps = Vec::with_capacity(frames.len());
        let mut out = Vec::with_capacity(frames.len());
        for f in frames {
            t += delay_ms(f.delay());
            timestamps.push(t);
            out.push(to_frame(id, place(width, height, f))?);
        }

        Animation::new(width, height, out, timestamps)
            .map_err(|e| EmoteError::codec(id, e.to_string()))
    }

    fn encode(&self, id: &str, anim: &Animation) -> EmoteResult<Vec<u8>> {
        let err = |e: image::ImageError| EmoteError::codec(id, e.to_string());

        let mut frames = Vec::with_capacity(anim.frame_count());
        for (frame, d) in anim.frames().iter().zip(anim.durations()) {
            let buffer = RgbaImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or_else(|| EmoteError::codec(id, "frame buffer size mismatch"))?;
            let delay = Delay::from_numer_denom_ms(u32::try_from(d).unwrap_or(u32::MAX), 1);
            frames.push(image::Frame::from_parts(buffer, 0, 0, delay));
        }

        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut out);
            encoder.set_repeat(Repeat::Infinite).map_err(err)?;
            encoder.encode_frames(frames).map_err(err)?;
        }
        Ok(out)
    }
}

fn still_from_memory(id: &str, bytes: &[u8]) -> EmoteResult<Animation> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| EmoteError::codec(id, e.to_string()))?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok(Animation::still(Frame::new(w, h, rgba.into_raw())?))
}

fn delay_ms(delay: Delay) -> i64 {
    let (numer, denom) = delay.numer_denom_ms();
    let ms = if denom == 0 {
        0
    } else {
        i64::from(numer) / i64::from(denom)
    };
    if ms <= 0 { DEFAULT_FRAME_DELAY_MS } else { ms }
}

/// Frames with an offset or a partial size are placed on a transparent full canvas.
fn place(width: u32, height: u32, frame: image::Frame) -> RgbaImage {
    let (left, top) = (frame.left(), frame.top());
    let buffer = frame.into_buffer();
    if left == 0 && top == 0 && buffer.dimensions() == (width, height) {
        return buffer;
    }
    let mut canvas = RgbaImage::new(width, height);
    image::imageops::replace(&mut canvas, &buffer, i64::from(left), i64::from(top));
    canvas
}

fn to_frame(id: &str, img: RgbaImage) -> EmoteResult<Frame> {
    let (w, h) = img.dimensions();
    Frame::new(w, h, img.into_raw()).map_err(|e| EmoteError::codec(id, e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/image_codec.rs"]
mod tests;
