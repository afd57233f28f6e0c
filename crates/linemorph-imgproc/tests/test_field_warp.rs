use approx::assert_relative_eq;
use glam::Vec2;
use rand::Rng;

use linemorph_image::Image;
use linemorph_imgproc::warp::{
    field_warp, field_warp_map, kernels, warp_correspondences, warp_feature_lines,
    FieldWarpOptions, FieldWarpParams, WarpError,
};
use linemorph_lines::{CorrespondenceError, CorrespondenceSet, LineSegment};

/// An image whose pixels store their own coordinates.
fn coordinate_image(width: usize, height: usize) -> Image<u16, 2> {
    Image::from_fn([width, height].into(), |x, y| [x as u16, y as u16]).unwrap()
}

#[test]
fn test_point_on_segment_has_no_perpendicular_term() -> Result<(), WarpError> {
    let source = LineSegment::from_coords(5.0, 1.0, 5.0, 21.0);
    let dest = LineSegment::from_coords(2.0, 3.0, 12.0, 3.0);
    let set = CorrespondenceSet::new(&[source], &[dest])?;

    let width = 16;
    let (map_x, map_y, _) = field_warp_map(
        [width, 8].into(),
        set.pairs(),
        &FieldWarpParams::default(),
        &FieldWarpOptions::default(),
    )?;

    for i in 2..=12 {
        let u = (i as f32 - 2.0) / 10.0;
        let expected = source.head + u * source.vector();
        let k = 3 * width + i;
        assert_relative_eq!(map_x[k], expected.x, epsilon = 1e-4);
        assert_relative_eq!(map_y[k], expected.y, epsilon = 1e-4);
    }

    Ok(())
}

#[test]
fn test_single_pair_scales_along_the_line() -> Result<(), WarpError> {
    let src = coordinate_image(40, 20);
    let source_lines = [LineSegment::from_coords(0.0, 0.0, 10.0, 0.0)];
    let dest_lines = [LineSegment::from_coords(0.0, 0.0, 20.0, 0.0)];

    let result = warp_feature_lines(
        &src,
        [30, 20].into(),
        &source_lines,
        &dest_lines,
        &FieldWarpParams::default(),
        &FieldWarpOptions::default(),
    )?;

    // x is halved, y is kept
    assert_eq!(result.image.pixel(8, 5)?, &[4, 5]);
    assert_eq!(result.image.pixel(20, 10)?, &[10, 10]);
    assert_eq!(result.image.pixel(21, 10)?, &[10, 10]);

    Ok(())
}

#[test]
fn test_two_pairs_blend_by_distance() -> Result<(), WarpError> {
    let set = CorrespondenceSet::new(
        &[
            LineSegment::from_coords(10.0, 10.0, 30.0, 10.0),
            LineSegment::from_coords(10.0, 50.0, 30.0, 50.0),
        ],
        &[
            LineSegment::from_coords(10.0, 14.0, 30.0, 14.0),
            LineSegment::from_coords(10.0, 50.0, 30.0, 50.0),
        ],
    )?;
    let (map_x, map_y, stats) = field_warp_map(
        [40, 60].into(),
        set.pairs(),
        &FieldWarpParams::default(),
        &FieldWarpOptions::default(),
    )?;
    assert_eq!(stats.identity_fallback_pixels(), 0);

    // near the moved line the shift dominates, near the fixed line it fades out
    let near_moved = 14 * 40 + 20;
    let near_fixed = 50 * 40 + 20;
    assert_relative_eq!(map_x[near_moved], 20.0, epsilon = 1e-4);
    assert!(map_y[near_moved] < 14.0 - 2.0);
    assert!(map_y[near_fixed] > 50.0 - 2.0);
    assert!(map_y[near_fixed] < 50.0);

    Ok(())
}

#[test]
fn test_sampling_stays_inside_margin() -> Result<(), WarpError> {
    let mut rng = rand::rng();
    let params = FieldWarpParams::default();

    for _ in 0..20 {
        let (sw, sh) = (rng.random_range(4..40), rng.random_range(4..40));
        let (dw, dh) = (rng.random_range(1..40), rng.random_range(1..40));
        let num_lines = rng.random_range(0..5);

        let mut random_line = || {
            LineSegment::from_coords(
                rng.random_range(-100.0..100.0),
                rng.random_range(-100.0..100.0),
                rng.random_range(-100.0..100.0),
                rng.random_range(-100.0..100.0),
            )
        };
        let source_lines = (0..num_lines).map(|_| random_line()).collect::<Vec<_>>();
        let dest_lines = (0..num_lines).map(|_| random_line()).collect::<Vec<_>>();

        let src = coordinate_image(sw, sh);
        let result = warp_feature_lines(
            &src,
            [dw, dh].into(),
            &source_lines,
            &dest_lines,
            &params,
            &FieldWarpOptions::default(),
        )?;

        for px in result.image.as_slice().chunks_exact(2) {
            let (x, y) = (px[0] as usize, px[1] as usize);
            assert!((2..=sw - 2).contains(&x), "x = {x} outside [2, {}]", sw - 2);
            assert!((2..=sh - 2).contains(&y), "y = {y} outside [2, {}]", sh - 2);
        }
    }

    Ok(())
}

#[test]
fn test_clamp_kernel_bounds() {
    let mut rng = rand::rng();
    let size = [17, 9].into();
    for _ in 0..1000 {
        let x = Vec2::new(
            rng.random_range(-1e6..1e6),
            rng.random_range(-1e6..1e6),
        );
        let (clamped, _) = kernels::clamp_to_margin(x, size, 2);
        assert!((2.0..=15.0).contains(&clamped.x));
        assert!((2.0..=7.0).contains(&clamped.y));
    }
}

#[test]
fn test_doubling_length_increases_weight() {
    let params = FieldWarpParams::default();
    for length in [1.0f32, 3.5, 10.0, 250.0] {
        for dist in [0.25f32, 1.0, 40.0, 1000.0] {
            let short = kernels::line_weight(
                kernels::line_strength(length, params.p),
                dist,
                params.a,
                params.b,
            );
            let long = kernels::line_weight(
                kernels::line_strength(2.0 * length, params.p),
                dist,
                params.a,
                params.b,
            );
            assert!(long > short, "length {length}, dist {dist}");
        }
    }
}

#[test]
fn test_count_mismatch_produces_no_output() {
    let src = coordinate_image(8, 8);
    let line = LineSegment::from_coords(1.0, 1.0, 6.0, 1.0);

    let res = warp_feature_lines(
        &src,
        [8, 8].into(),
        &[line, line, line],
        &[line, line],
        &FieldWarpParams::default(),
        &FieldWarpOptions::default(),
    );

    match res {
        Err(WarpError::Correspondence(CorrespondenceError::CorrespondenceCountMismatch {
            source_count,
            dest_count,
        })) => {
            assert_eq!((source_count, dest_count), (3, 2));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_degenerate_destination_line_is_skipped() -> Result<(), WarpError> {
    let src = coordinate_image(12, 12);
    let mut dst = Image::<u16, 2>::from_size_val([12, 12].into(), 0)?;
    let set = CorrespondenceSet::new(
        &[LineSegment::from_coords(1.0, 1.0, 9.0, 9.0)],
        &[LineSegment::from_coords(4.0, 4.0, 4.0, 4.0)],
    )?;

    let stats = field_warp(
        &src,
        &mut dst,
        set.pairs(),
        &FieldWarpParams {
            margin: 0,
            ..Default::default()
        },
        &FieldWarpOptions::default(),
    )?;

    assert_eq!(stats.degenerate_pairs, vec![0]);
    assert_eq!(stats.zero_weight_pixels, 12 * 12);
    assert_eq!(dst, src);

    Ok(())
}

#[test]
fn test_warp_correspondences_rgb() -> Result<(), WarpError> {
    let src = Image::<u8, 3>::from_fn([32, 32].into(), |x, y| {
        if x < 16 {
            [255, 0, 0]
        } else {
            [0, (y * 8) as u8, 255]
        }
    })?;
    let lines = [
        LineSegment::from_coords(4.0, 4.0, 28.0, 4.0),
        LineSegment::from_coords(4.0, 28.0, 28.0, 28.0),
    ];
    let set = CorrespondenceSet::new(&lines, &lines)?;

    let result = warp_correspondences(
        &src,
        src.size(),
        &set,
        &FieldWarpParams::default(),
        &FieldWarpOptions::default(),
    )?;

    assert_eq!(result.image.num_channels(), 3);
    assert_eq!(result.image.pixel(5, 10)?, &[255, 0, 0]);
    assert_eq!(result.image.pixel(20, 10)?, &[0, 80, 255]);

    Ok(())
}
