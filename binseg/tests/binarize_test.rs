use binseg::binarize::{binarize, mean_label_value, normalize_polarity};
use binseg::{Color, ColorGrid, Label, LabelGrid, PixelGrid, SegmentError};

#[test]
fn uniform_image_is_all_white() {
    let image = PixelGrid::filled(3, 4, Color::new(10.0, 20.0, 30.0));
    let b = binarize(&image).expect("binarize");
    assert_eq!(b.threshold, 20.0);
    assert_eq!(b.labels.count(Label::White), 12);
}

#[test]
fn dark_half_becomes_black() {
    let image = PixelGrid::from_fn(2, 2, |r, _| if r == 0 { Color::BLACK } else { Color::WHITE });
    let b = binarize(&image).expect("binarize");
    assert_eq!(b.threshold, 127.5);
    assert_eq!(b.labels.to_bytes(), vec![0, 0, 255, 255]);
}

#[test]
fn threshold_uses_channel_mean() {
    // same intensity, different hue
    let image = PixelGrid::from_vec(1, 2, vec![Color::new(90.0, 0.0, 0.0), Color::new(0.0, 0.0, 90.0)]).expect("grid");
    let b = binarize(&image).expect("binarize");
    assert_eq!(b.threshold, 30.0);
    assert_eq!(b.labels.count(Label::White), 2);
}

#[test]
fn empty_image_is_rejected() {
    let image: ColorGrid = PixelGrid::filled(0, 0, Color::BLACK);
    assert_eq!(binarize(&image).unwrap_err(), SegmentError::EmptyInput);
}

#[test]
fn mostly_black_mask_is_inverted() {
    let labels: LabelGrid = PixelGrid::from_vec(1, 4, vec![Label::Black, Label::Black, Label::Black, Label::White]).expect("grid");
    let out = normalize_polarity(labels);
    assert_eq!(out.to_bytes(), vec![255, 255, 255, 0]);
}

#[test]
fn balanced_or_white_mask_is_kept() {
    let half: LabelGrid = PixelGrid::from_vec(1, 2, vec![Label::Black, Label::White]).expect("grid");
    assert_eq!(mean_label_value(&half), Some(127.5));
    assert_eq!(normalize_polarity(half.clone()), half);

    let white: LabelGrid = PixelGrid::filled(2, 2, Label::White);
    assert_eq!(normalize_polarity(white.clone()), white);
}

#[test]
fn empty_mask_has_no_mean() {
    let labels: LabelGrid = PixelGrid::filled(0, 0, Label::Black);
    assert_eq!(mean_label_value(&labels), None);
    assert!(normalize_polarity(labels).is_empty());
}
