use super::*;

fn pts(v: &[(f64, f64)]) -> Vec<Point> {
    v.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

#[test]
fn dedup_keeps_endpoints_and_drops_jitter() {
    let out = dedup_points(
        &pts(&[(0.0, 0.0), (0.001, 0.0), (1.0, 0.0), (1.0, 0.005), (2.0, 0.0)]),
        0.01,
    );
    assert_eq!(out, pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]));
}

#[test]
fn outlier_spike_is_removed() {
    let line = pts(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (3.0, 40.0),
        (4.0, 0.0),
        (5.0, 0.0),
        (6.0, 0.0),
    ]);
    let out = remove_outliers(&line, 2.5);
    assert!(!out.contains(&Point::new(3.0, 40.0)));
    assert_eq!(out.first(), line.first());
    assert_eq!(out.last(), line.last());
}

#[test]
fn resample_spaces_points_evenly() {
    let out = resample(&pts(&[(0.0, 0.0), (10.0, 0.0)]), 2.0);
    assert_eq!(out.len(), 5);
    for (i, p) in out.iter().enumerate() {
        assert!((p.x - 2.5 * i as f64).abs() < 1e-9);
    }
}

#[test]
fn chaikin_preserves_endpoints_and_cuts_corners() {
    let corner = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    let out = chaikin(&corner, 1);
    assert_eq!(out.len(), 6);
    assert_eq!(out[0], corner[0]);
    assert_eq!(out[5], corner[2]);
    assert!(!out.contains(&Point::new(10.0, 0.0)));
}

#[test]
fn simplify_removes_collinear_points() {
    let line = pts(&[(0.0, 0.0), (1.0, 0.01), (2.0, 0.0), (3.0, 5.0)]);
    let out = simplify(&line, 0.1);
    assert_eq!(out, pts(&[(0.0, 0.0), (2.0, 0.0), (3.0, 5.0)]));
}

#[test]
fn normalize_scales_height_and_caps_width() {
    let s = Stroke::new(pts(&[(10.0, 10.0), (310.0, 60.0)])).unwrap();
    let wide = GlyphSample::new('o', vec![s]).unwrap();
    let out = normalize_sample(&wide, &NormalizeOpts::default()).unwrap();
    assert_eq!(out.bbox().y0, 0.0);
    assert_eq!(out.bbox().x0, 0.0);
    assert!((out.height() - 100.0).abs() < 1e-9);
    // 'o' ideal 55 -> severely wide capture compressed to 115 % of ideal.
    assert!((out.width() - 55.0 * 1.15).abs() < 1e-9);
}

#[test]
fn normalize_applies_hard_aspect_cap_without_ideal() {
    let s = Stroke::new(pts(&[(0.0, 0.0), (500.0, 100.0)])).unwrap();
    let dash = GlyphSample::new('#', vec![s]).unwrap();
    let out = normalize_sample(&dash, &NormalizeOpts::default()).unwrap();
    assert!((out.width() - 120.0).abs() < 1e-9);
}

#[test]
fn normalize_carries_baseline_and_label() {
    let s = Stroke::new(pts(&[(0.0, 50.0), (30.0, 250.0)])).unwrap();
    let g = GlyphSample::new('g', vec![s])
        .unwrap()
        .with_baseline(150.0)
        .unwrap()
        .with_label("capture-3");
    let out = normalize_sample(&g, &NormalizeOpts::default()).unwrap();
    assert!((out.baseline() - 50.0).abs() < 1e-9);
    assert_eq!(out.label(), Some("capture-3"));
}

#[test]
fn clean_stroke_runs_configured_passes() {
    let s = Stroke::new(pts(&[(0.0, 0.0), (0.001, 0.0), (10.0, 0.0)])).unwrap();
    let opts = CleanOpts {
        resample_spacing: Some(1.0),
        ..CleanOpts::default()
    };
    let out = clean_stroke(&s, &opts).unwrap();
    assert_eq!(out.len(), 10);
    assert_eq!(out.first(), Point::new(0.0, 0.0));
}
