//! Animation bitstream codecs.

use crate::animation::frame::Animation;
use crate::foundation::error::EmoteResult;

pub(crate) mod image_codec;
pub(crate) mod raw;

/// Bytes to [`Animation`] and back. Implementations must preserve frame count, timestamps and
/// canvas size across a round trip; `id` only labels errors.
pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, id: &str, bytes: &[u8]) -> EmoteResult<Animation>;

    fn encode(&self, id: &str, anim: &Animation) -> EmoteResult<Vec<u8>>;
}

/// Decode an `EMOTERAW` container or any image format `image` understands, by signature.
pub fn decode_any(id: &str, bytes: &[u8]) -> EmoteResult<Animation> {
    if raw::RawCodec::detect(bytes) {
        raw::RawCodec.decode(id, bytes)
    } else {
        image_codec::ImageCodec.decode(id, bytes)
    }
}
