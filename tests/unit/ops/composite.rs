use super::*;

fn solid(w: u32, h: u32, px: Rgba8) -> Frame {
    Frame::new(w, h, px.repeat((w * h) as usize)).unwrap()
}

#[test]
fn transparent_foreground_keeps_background() {
    let bg = [10, 20, 30, 40];
    assert_eq!(over_pixel(bg, [255, 255, 255, 0]), bg);
}

#[test]
fn opaque_foreground_replaces_color() {
    assert_eq!(over_pixel([0, 0, 0, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
}

#[test]
fn half_alpha_blends_and_keeps_max_alpha() {
    // (200*127 + 100*128)/255 = 149
    assert_eq!(
        over_pixel([200, 200, 200, 255], [100, 100, 100, 128]),
        [149, 149, 149, 255]
    );
    assert_eq!(over_pixel([0, 0, 0, 0], [90, 90, 90, 60])[3], 60);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
}

#[test]
fn smaller_foreground_is_anchored_top_left() {
    let bg = solid(3, 2, [0, 0, 0, 255]);
    let fg = solid(1, 1, [255, 255, 255, 255]);
    let out = over_frame(&bg, &fg).unwrap();
    assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(out.pixel(1, 0), [0, 0, 0, 255]);
    assert_eq!(out.pixel(0, 1), [0, 0, 0, 255]);
}

#[test]
fn over_follows_merged_timeline_on_background_canvas() {
    let bg = Animation::new(
        2,
        2,
        vec![solid(2, 2, [0, 0, 0, 255]), solid(2, 2, [0, 0, 255, 255])],
        vec![50, 100],
    )
    .unwrap();
    let fg = Animation::new(
        4,
        4,
        vec![solid(4, 4, [255, 0, 0, 255]), solid(4, 4, [0, 255, 0, 0])],
        vec![25, 50],
    )
    .unwrap();

    let out = over(&bg, &fg, &TransformCtx::default()).unwrap();
    assert_eq!((out.canvas_width(), out.canvas_height()), (2, 2));
    assert_eq!(out.timestamps(), &[25, 50, 75, 100]);
    assert_eq!(out.frames()[0].pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(out.frames()[1].pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(out.frames()[2].pixel(1, 1), [255, 0, 0, 255]);
    assert_eq!(out.frames()[3].pixel(1, 1), [0, 0, 255, 255]);
}

#[test]
fn self_over_opaque_is_identity() {
    let a = Animation::new(
        2,
        1,
        vec![solid(2, 1, [1, 2, 3, 255]), solid(2, 1, [4, 5, 6, 255])],
        vec![40, 80],
    )
    .unwrap();
    assert_eq!(over(&a, &a, &TransformCtx::default()).unwrap(), a);
}
