use super::*;

fn sample() -> Animation {
    let f0 = Frame::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    let f1 = Frame::new(2, 1, vec![9, 9, 9, 9, 0, 0, 0, 0]).unwrap();
    Animation::new(2, 1, vec![f0, f1], vec![30, 70]).unwrap()
}

#[test]
fn round_trip_is_lossless() {
    let bytes = RawCodec.encode("x", &sample()).unwrap();
    assert_eq!(&bytes[..8], b"EMOTERAW");
    assert_eq!(bytes.len(), HEADER_LEN + 2 * (8 + 8));
    assert_eq!(RawCodec.decode("x", &bytes).unwrap(), sample());
}

#[test]
fn truncated_and_foreign_bytes_are_codec_errors() {
    let bytes = RawCodec.encode("x", &sample()).unwrap();
    let err = RawCodec.decode("cut", &bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, EmoteError::Codec { ref id, .. } if id == "cut"));
    assert!(RawCodec.decode("gif", b"GIF89a....").is_err());
    assert!(RawCodec.decode("empty", &[]).is_err());
}

#[test]
fn invalid_timestamps_are_rejected_on_decode() {
    let mut bytes = RawCodec.encode("x", &sample()).unwrap();
    // second timestamp := 10, before the first
    bytes[HEADER_LEN + 8..HEADER_LEN + 16].copy_from_slice(&10i64.to_le_bytes());
    assert!(RawCodec.decode("x", &bytes).is_err());
}

#[test]
fn detect_and_decode_any_pick_the_raw_container() {
    let bytes = RawCodec.encode("x", &sample()).unwrap();
    assert!(RawCodec::detect(&bytes));
    assert!(!RawCodec::detect(b"GIF89a"));
    assert_eq!(crate::codec::decode_any("x", &bytes).unwrap(), sample());
}
