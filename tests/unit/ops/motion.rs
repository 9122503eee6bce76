use super::*;

fn marked(w: u32, h: u32) -> Frame {
    let mut f = Frame::transparent(w, h);
    f.data_mut()[..4].copy_from_slice(&[255, 0, 0, 255]);
    f
}

#[test]
fn shift_moves_content_and_clears_the_rest() {
    let out = shift_frame(&marked(3, 3), 1, 2).unwrap();
    assert_eq!(out.pixel(1, 2), [255, 0, 0, 255]);
    assert_eq!(out.pixel(0, 0), [0; 4]);
    let gone = shift_frame(&marked(3, 3), -1, 0).unwrap();
    assert!(gone.data().iter().all(|&b| b == 0));
}

#[test]
fn shake_offsets_stay_in_bounds() {
    let mut rng = Rng64::new(1);
    for (dx, dy) in shake_offsets(&mut rng, 500, 7, 4) {
        assert!((-3..4).contains(&dx), "{dx}");
        assert!((-2..2).contains(&dy), "{dy}");
    }
}

#[test]
fn shake_is_reproducible_with_a_seed() {
    // Unseeded output is non-reproducible; only structure is checked for it.
    let a = Animation::new(
        4,
        4,
        vec![marked(4, 4), marked(4, 4), marked(4, 4)],
        vec![10, 20, 30],
    )
    .unwrap();
    let seeded = TransformCtx {
        shake_seed: Some(99),
        ..TransformCtx::default()
    };
    let x = shake(&a, &seeded).unwrap();
    let y = shake(&a, &seeded).unwrap();
    assert_eq!(x, y);

    let z = shake(&a, &TransformCtx::default()).unwrap();
    assert_eq!(z.frame_count(), a.frame_count());
    assert_eq!(z.timestamps(), a.timestamps());
    assert_eq!((z.canvas_width(), z.canvas_height()), (4, 4));
}

#[test]
fn slide_offset_eases_to_zero() {
    assert_eq!(slide_offset(100, 0, 100), -100);
    assert_eq!(slide_offset(100, 50, 100), -25);
    assert_eq!(slide_offset(100, 100, 100), 0);
    assert_eq!(slide_offset(100, 0, 0), 0);
}

#[test]
fn slide_in_last_frame_is_untouched() {
    let a = Animation::new(4, 4, vec![marked(4, 4), marked(4, 4)], vec![10, 20]).unwrap();
    let out = slide_in(&a, &TransformCtx::default()).unwrap();
    assert_eq!(out.frames()[1], a.frames()[1]);
    // d = 0.5 -> shifted left by 1, the marker at x=0 falls off the canvas
    assert!(out.frames()[0].data().iter().all(|&b| b == 0));
}
