//! End-to-end scenarios over hand-built edge maps and synthetic images.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use desgen_pipeline::{
    CurveBuilder, Dimensions, EdgeDetectorKind, EdgeLevel, EdgeMap, PipelineConfig, Point,
    build_curves, find_contours, process,
};

fn dims(w: u32, h: u32) -> Dimensions {
    Dimensions {
        width: w,
        height: h,
    }
}

/// RGBA buffer of a gray image described by `f`.
fn rgba_from_fn(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(w as usize * h as usize * 4);
    for y in 0..h {
        for x in 0..w {
            let v = f(x, y);
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
    }
    rgba
}

/// Bright disc plus a bright bar on a dark background.
fn shapes(x: u32, y: u32) -> u8 {
    let dx = f64::from(x) - 40.0;
    let dy = f64::from(y) - 30.0;
    if dx.hypot(dy) < 18.0 || ((60..75).contains(&x) && (10..70).contains(&y)) {
        210
    } else {
        30
    }
}

#[test]
fn blank_edge_map_has_no_contours_or_curves() {
    let edges = EdgeMap::new(10, 10);
    let contours = find_contours(&edges);
    assert!(contours.is_empty());
    let curves = build_curves(&contours, dims(10, 10), 10, 0.1).unwrap();
    assert!(curves.is_empty());
}

#[test]
fn diagonal_line_collapses_to_a_segment() {
    let mut edges = EdgeMap::new(20, 20);
    for i in 0..15 {
        edges.set(i + 2, i + 2, EdgeLevel::Strong);
    }

    let contours = find_contours(&edges);
    assert_eq!(contours.len(), 1);
    assert_eq!(contours[0].len(), 15);

    // Default minimum of three points drops the two-point segment.
    let curves = build_curves(&contours, dims(20, 20), 10, 0.1).unwrap();
    assert!(curves.is_empty());

    let builder = CurveBuilder {
        min_points: 2,
        ..CurveBuilder::default()
    };
    let curves = builder.build(&contours, dims(20, 20)).unwrap();
    assert_eq!(curves.len(), 1);
    let scale = 10.0 / 20.0;
    assert_eq!(
        curves[0].points(),
        &[
            Point::new((2.0 - 10.0) * scale, (10.0 - 2.0) * scale),
            Point::new((16.0 - 10.0) * scale, (10.0 - 16.0) * scale),
        ]
    );
}

#[test]
fn longest_blob_wins_with_one_curve() {
    let mut edges = EdgeMap::new(30, 30);
    // 20-point L: row y=2 from x=2..=11, then column x=11 from y=3..=12.
    for x in 2..=11 {
        edges.set(x, 2, EdgeLevel::Strong);
    }
    for y in 3..=12 {
        edges.set(11, y, EdgeLevel::Strong);
    }
    // 12-point L, well away from the first.
    for x in 18..=23 {
        edges.set(x, 20, EdgeLevel::Strong);
    }
    for y in 21..=26 {
        edges.set(23, y, EdgeLevel::Strong);
    }

    let contours = find_contours(&edges);
    assert_eq!(contours.len(), 2);
    let mut lengths: Vec<usize> = contours.iter().map(desgen_pipeline::Contour::len).collect();
    lengths.sort_unstable();
    assert_eq!(lengths, vec![12, 20]);

    let curves = build_curves(&contours, dims(30, 30), 1, 0.1).unwrap();
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].id(), "curve_0");
    let scale = 10.0 / 30.0;
    assert_eq!(
        curves[0].points()[0],
        Point::new((2.0 - 15.0) * scale, (15.0 - 2.0) * scale)
    );
}

#[test]
fn processing_is_deterministic() {
    let rgba = rgba_from_fn(100, 80, shapes);
    let config = PipelineConfig::default();
    let first = process(&rgba, 100, 80, &config).unwrap();
    let second = process(&rgba, 100, 80, &config).unwrap();
    assert_eq!(first, second);
    assert!(!first.curves.is_empty());
}

#[test]
fn curve_count_never_exceeds_max() {
    let rgba = rgba_from_fn(100, 80, |x, y| {
        // Checkerboard of 10px cells gives many separate edge regions.
        if (x / 10 + y / 10) % 2 == 0 { 200 } else { 40 }
    });
    for max_curves in [1, 2, 5, 10, 50] {
        let config = PipelineConfig {
            max_curves,
            ..PipelineConfig::default()
        };
        let result = process(&rgba, 100, 80, &config).unwrap();
        assert!(result.curves.len() <= max_curves);
        for (i, curve) in result.curves.iter().enumerate() {
            assert_eq!(curve.id(), format!("curve_{i}"));
            assert!(curve.len() >= 3);
        }
    }
}

#[test]
fn enhanced_and_canny_paths_run() {
    let rgba = rgba_from_fn(100, 80, shapes);
    for (enhance, edge_detector) in [
        (true, EdgeDetectorKind::TwoLevel),
        (false, EdgeDetectorKind::Canny),
        (true, EdgeDetectorKind::Canny),
    ] {
        let config = PipelineConfig {
            enhance,
            edge_detector,
            ..PipelineConfig::default()
        };
        let result = process(&rgba, 100, 80, &config).unwrap();
        assert!(result.contour_count > 0, "{enhance} {edge_detector}");
        assert!(result.curves.len() <= config.max_curves);
    }
}

#[test]
fn larger_tolerance_never_adds_points() {
    let rgba = rgba_from_fn(100, 80, shapes);
    let points_at = |tolerance: f64| -> usize {
        let config = PipelineConfig {
            simplify_tolerance: tolerance,
            max_curves: 3,
            ..PipelineConfig::default()
        };
        let result = process(&rgba, 100, 80, &config).unwrap();
        result.curves.iter().map(desgen_pipeline::Curve::len).sum()
    };
    assert!(points_at(0.5) <= points_at(0.05));
}
