use binseg::mean_shift::{filter, filter_with_stats, MeanShiftParams, MeanShiftStats, UpdateMode};
use binseg::{Color, ColorGrid, PixelGrid, SegmentError};

fn gray(v: f64) -> Color {
    Color::new(v, v, v)
}

fn sample_image() -> ColorGrid {
    PixelGrid::from_fn(5, 6, |r, c| Color::new((r * 40) as f64, (c * 35) as f64, ((r + c) * 20) as f64))
}

fn ramp() -> ColorGrid {
    PixelGrid::from_vec(1, 3, vec![gray(0.0), gray(30.0), gray(60.0)]).expect("grid")
}

#[test]
fn non_positive_spatial_radius_is_a_no_op() {
    let image = sample_image();
    for hs in [0.0, -4.0] {
        let params = MeanShiftParams::new(hs, 50.0, 1.0, 10).expect("params");
        assert_eq!(filter(&image, &params).expect("filter"), image);
    }
}

#[test]
fn non_positive_color_radius_is_a_no_op() {
    let image = sample_image();
    for hc in [0.0, -1.0] {
        let params = MeanShiftParams::new(5.0, hc, 1.0, 10).expect("params");
        assert_eq!(filter(&image, &params).expect("filter"), image);
    }
}

#[test]
fn zero_budget_leaves_image_untouched() {
    let image = sample_image();
    let params = MeanShiftParams::new(5.0, 500.0, 0.0, 0).expect("params");
    let (out, stats) = filter_with_stats(&image, &params).expect("filter");
    assert_eq!(out, image);
    assert_eq!(stats.shifted_pixels, 0);
}

#[test]
fn uniform_image_is_a_fixed_point() {
    let image = PixelGrid::filled(4, 4, Color::new(12.0, 80.0, 200.0));
    let params = MeanShiftParams::new(3.0, 40.0, 0.5, 20).expect("params");
    assert_eq!(filter(&image, &params).expect("filter"), image);
}

#[test]
fn distant_colors_do_not_mix() {
    let image = PixelGrid::from_fn(4, 4, |r, c| if (r + c) % 2 == 0 { Color::BLACK } else { Color::WHITE });
    let params = MeanShiftParams::new(3.0, 10.0, 1.0, 10).expect("params");
    assert_eq!(filter(&image, &params).expect("filter"), image);
}

#[test]
fn output_keeps_dimensions() {
    let image = sample_image();
    let params = MeanShiftParams::new(4.0, 60.0, 1.0, 5).expect("params");
    let out = filter(&image, &params).expect("filter");
    assert_eq!(out.dimensions(), image.dimensions());
}

#[test]
fn in_place_pixels_see_earlier_results() {
    let params = MeanShiftParams::new(2.0, 100.0, 0.0, 1).expect("params");
    let out = filter(&ramp(), &params).expect("filter");
    assert_eq!(out.as_slice(), &[gray(15.0), gray(35.0), gray(47.0)]);
}

#[test]
fn snapshot_reads_the_unfiltered_input() {
    let params = MeanShiftParams::new(2.0, 100.0, 0.0, 1).expect("params").with_mode(UpdateMode::Snapshot);
    let (out, stats) = filter_with_stats(&ramp(), &params).expect("filter");
    assert_eq!(out.as_slice(), &[gray(15.0), gray(30.0), gray(45.0)]);
    assert_eq!(stats, MeanShiftStats { shifted_pixels: 2, total_steps: 2, exhausted_pixels: 2 });
}

#[test]
fn negative_budget_is_rejected() {
    let err = MeanShiftParams::new(5.0, 10.0, 1.0, -1).unwrap_err();
    assert!(matches!(err, SegmentError::InvalidParameter { name: "max_iterations_per_pixel", .. }));
}

#[test]
fn non_finite_parameters_are_rejected() {
    assert!(MeanShiftParams::new(f64::NAN, 10.0, 1.0, 5).is_err());
    assert!(MeanShiftParams::new(5.0, f64::INFINITY, 1.0, 5).is_err());
}

#[test]
fn empty_image_is_rejected() {
    let image: ColorGrid = PixelGrid::filled(0, 3, Color::BLACK);
    let params = MeanShiftParams::new(5.0, 10.0, 1.0, 5).expect("params");
    assert_eq!(filter(&image, &params).unwrap_err(), SegmentError::EmptyInput);
}

#[test]
fn mode_names() {
    assert_eq!(UpdateMode::from_name("Snapshot"), UpdateMode::Snapshot);
    assert_eq!(UpdateMode::from_name("jacobi"), UpdateMode::Snapshot);
    assert_eq!(UpdateMode::from_name("whatever"), UpdateMode::InPlace);
}

#[test]
fn rerun_on_settled_output_is_stable() {
    let image = PixelGrid::from_fn(6, 6, |r, c| match (r < 3, c < 3) {
        (true, true) => Color::new(200.0, 30.0, 30.0),
        (true, false) => Color::new(30.0, 200.0, 30.0),
        (false, true) => Color::new(30.0, 30.0, 200.0),
        (false, false) => Color::new(220.0, 220.0, 220.0),
    });
    let params = MeanShiftParams::new(3.0, 40.0, 0.5, 10).expect("params");
    let once = filter(&image, &params).expect("filter");
    let twice = filter(&once, &params).expect("filter");
    assert_eq!(once, twice);
}

#[test]
fn odd_spatial_radius_reaches_further_on_the_low_side() {
    let image = PixelGrid::from_vec(1, 4, vec![gray(200.0), gray(0.0), gray(0.0), gray(0.0)]).expect("grid");
    let params = MeanShiftParams::new(3.0, 1000.0, 0.0, 1).expect("params").with_mode(UpdateMode::Snapshot);
    let out = filter(&image, &params).expect("filter");
    assert_eq!(out.as_slice(), &[gray(100.0), gray(66.0), gray(50.0), gray(0.0)]);
}
