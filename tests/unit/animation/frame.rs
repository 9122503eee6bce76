use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> Frame {
    Frame::new(w, h, px.repeat((w * h) as usize)).unwrap()
}

#[test]
fn frame_rejects_wrong_buffer_len() {
    assert!(Frame::new(2, 2, vec![0; 15]).is_err());
    assert!(Frame::new(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn pixel_or_clear_is_transparent_outside() {
    let f = solid(2, 1, [9, 8, 7, 255]);
    assert_eq!(f.pixel_or_clear(1, 0), [9, 8, 7, 255]);
    assert_eq!(f.pixel_or_clear(-1, 0), [0; 4]);
    assert_eq!(f.pixel_or_clear(2, 0), [0; 4]);
    assert_eq!(f.stride(), 8);
}

#[test]
fn animation_validates_invariants() {
    let f = || solid(2, 2, [1, 2, 3, 4]);
    assert!(Animation::new(2, 2, vec![f(), f()], vec![10, 20]).is_ok());
    assert!(Animation::new(2, 2, vec![f(), f()], vec![20, 10]).is_err());
    assert!(Animation::new(2, 2, vec![f(), f()], vec![10]).is_err());
    assert!(Animation::new(2, 2, vec![f(), f()], vec![0, 10]).is_err());
    assert!(Animation::new(2, 2, vec![], vec![]).is_err());
    assert!(Animation::new(3, 2, vec![f()], vec![10]).is_err());
}

#[test]
fn still_has_single_zero_timestamp() {
    let a = Animation::still(solid(4, 3, [0, 0, 0, 255]));
    assert!(a.is_still());
    assert_eq!(a.canvas_width(), 4);
    assert_eq!(a.canvas_height(), 3);
    assert_eq!(a.duration_ms(), 0);
}

#[test]
fn durations_start_from_zero() {
    assert_eq!(durations(&[1, 3, 6]), vec![1, 2, 3]);
    assert_eq!(durations(&[0]), vec![0]);
}
