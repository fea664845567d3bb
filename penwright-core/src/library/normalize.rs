//! Capture-side cleanup of recorded samples.
//!
//! These run on the maintenance path when samples enter a library. Compilation never
//! modifies a sample.

use crate::{
    foundation::{
        core::Point,
        error::{PenwrightError, PenwrightResult},
    },
    library::glyph::{GlyphSample, Stroke},
};

/// Options for [`clean_stroke`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CleanOpts {
    /// Points closer than this to the previous kept point are dropped.
    pub min_dist: f64,
    /// Spike removal threshold in multiples of the median segment length.
    pub outlier_threshold: Option<f64>,
    /// Uniform arc-length spacing for resampling.
    pub resample_spacing: Option<f64>,
    /// Chaikin corner-cutting passes.
    pub chaikin_iterations: u32,
    /// Douglas-Peucker tolerance applied last.
    pub simplify_tolerance: Option<f64>,
}

impl Default for CleanOpts {
    fn default() -> Self {
        Self {
            min_dist: 0.01,
            outlier_threshold: Some(2.5),
            resample_spacing: None,
            chaikin_iterations: 0,
            simplify_tolerance: None,
        }
    }
}

/// Options for [`normalize_sample`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NormalizeOpts {
    /// Height every sample is scaled to, in glyph units.
    pub target_height: f64,
}

impl Default for NormalizeOpts {
    fn default() -> Self {
        Self {
            target_height: 100.0,
        }
    }
}

/// Drop points within `min_dist` of the last kept point, always keeping both endpoints.
pub fn dedup_points(points: &[Point], min_dist: f64) -> Vec<Point> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let mut out = vec![first];
    for &p in rest {
        if let Some(&last) = out.last()
            && last.distance(p) > min_dist
        {
            out.push(p);
        }
    }
    if let Some(&end) = points.last()
        && out.len() > 1
        && out.last() != Some(&end)
    {
        out.push(end);
    }
    out
}

/// Remove single-point spikes from noisy captures.
///
/// A point is a spike when its distance to the midpoint of its neighbours exceeds
/// `threshold` times the median segment length. Strokes under five points are untouched.
pub fn remove_outliers(points: &[Point], threshold: f64) -> Vec<Point> {
    if points.len() < 5 {
        return points.to_vec();
    }
    let mut segs: Vec<f64> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
    segs.sort_by(f64::total_cmp);
    let median = segs[segs.len() / 2];
    if median < 1e-6 {
        return points.to_vec();
    }

    let mut out = vec![points[0]];
    for w in points.windows(3) {
        let mid = w[0].midpoint(w[2]);
        if w[1].distance(mid) < threshold * median {
            out.push(w[1]);
        }
    }
    out.push(points[points.len() - 1]);
    out
}

/// Resample to uniform arc-length spacing (at least four points).
pub fn resample(points: &[Point], spacing: f64) -> Vec<Point> {
    if points.len() < 2 || spacing <= 0.0 {
        return points.to_vec();
    }
    let mut cum = Vec::with_capacity(points.len());
    cum.push(0.0);
    for w in points.windows(2) {
        let prev = cum[cum.len() - 1];
        cum.push(prev + w[0].distance(w[1]));
    }
    let total = cum[cum.len() - 1];
    if total < 1e-6 {
        return points.to_vec();
    }

    let n = ((total / spacing) as usize).max(4);
    let mut out = Vec::with_capacity(n);
    let mut seg = 0usize;
    for i in 0..n {
        let target = total * (i as f64) / ((n - 1) as f64);
        while seg + 2 < cum.len() && cum[seg + 1] < target {
            seg += 1;
        }
        let span = cum[seg + 1] - cum[seg];
        let t = if span > 0.0 {
            ((target - cum[seg]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(points[seg].lerp(points[seg + 1], t));
    }
    out
}

/// Chaikin corner cutting; endpoints are preserved.
pub fn chaikin(points: &[Point], iterations: u32) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut pts = points.to_vec();
    for _ in 0..iterations {
        let mut next = Vec::with_capacity(pts.len() * 2);
        next.push(pts[0]);
        for w in pts.windows(2) {
            next.push(w[0].lerp(w[1], 0.25));
            next.push(w[0].lerp(w[1], 0.75));
        }
        next.push(pts[pts.len() - 1]);
        pts = next;
    }
    pts
}

/// Douglas-Peucker polyline simplification.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 || tolerance <= 0.0 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((lo, hi)) = stack.pop() {
        let mut best = (0.0f64, lo);
        for i in (lo + 1)..hi {
            let d = segment_distance(points[i], points[lo], points[hi]);
            if d > best.0 {
                best = (d, i);
            }
        }
        if best.0 > tolerance {
            keep[best.1] = true;
            stack.push((lo, best.1));
            stack.push((best.1, hi));
        }
    }
    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Run the configured cleanup passes over one stroke.
pub fn clean_stroke(stroke: &Stroke, opts: &CleanOpts) -> PenwrightResult<Stroke> {
    let mut pts = dedup_points(stroke.points(), opts.min_dist);
    if let Some(threshold) = opts.outlier_threshold {
        pts = remove_outliers(&pts, threshold);
    }
    if let Some(spacing) = opts.resample_spacing {
        pts = resample(&pts, spacing);
    }
    pts = chaikin(&pts, opts.chaikin_iterations);
    if let Some(tol) = opts.simplify_tolerance {
        pts = simplify(&pts, tol);
    }
    Stroke::new(pts)
}

/// Apply [`clean_stroke`] to every stroke of a sample.
pub fn clean_sample(sample: &GlyphSample, opts: &CleanOpts) -> PenwrightResult<GlyphSample> {
    let strokes = sample
        .strokes()
        .iter()
        .map(|s| clean_stroke(s, opts))
        .collect::<PenwrightResult<Vec<_>>>()?;
    rebuild(sample, strokes, sample.explicit_baseline())
}

/// Maximum width/height ratio allowed for `c` after normalization.
pub fn max_aspect(c: char) -> f64 {
    match c {
        'm' | 'M' => 1.30,
        'w' | 'W' => 1.20,
        '-' => 1.50,
        '%' => 1.00,
        '&' => 0.80,
        c if c.is_lowercase() => 1.00,
        c if c.is_uppercase() => 1.05,
        _ => 1.20,
    }
}

/// Natural width of latin letters at height 100.
pub fn ideal_width(c: char) -> Option<f64> {
    let w = match c {
        'a' => 65.0,
        'b' | 'd' | 'h' | 'n' | 'p' | 'q' | 'u' => 60.0,
        'c' | 'e' | 'g' | 'k' | 'o' | 'v' | 'x' | 'z' => 55.0,
        'f' | 't' => 40.0,
        'i' | 'l' => 30.0,
        'j' => 35.0,
        'm' => 90.0,
        'r' => 45.0,
        's' | 'y' => 50.0,
        'w' => 80.0,
        'A' | 'H' => 75.0,
        'B' | 'C' | 'G' | 'K' | 'R' | 'T' | 'X' => 65.0,
        'D' | 'O' | 'Q' | 'U' | 'V' => 70.0,
        'E' | 'L' | 'P' | 'Y' | 'Z' => 60.0,
        'F' | 'S' => 55.0,
        'I' => 40.0,
        'J' => 45.0,
        'M' | 'W' => 90.0,
        'N' => 75.0,
        _ => return None,
    };
    Some(w * 0.01)
}

/// Scale a sample to the target height and cap implausible widths.
///
/// The result has its bounding box at the local origin.
pub fn normalize_sample(sample: &GlyphSample, opts: &NormalizeOpts) -> PenwrightResult<GlyphSample> {
    if !opts.target_height.is_finite() || opts.target_height <= 0.0 {
        return Err(PenwrightError::invalid_config(
            "normalize target_height must be finite and > 0",
        ));
    }
    let bbox = sample.bbox();
    let target = opts.target_height;
    let height = bbox.height().max(1.0);
    let width = bbox.width().max(1.0);
    let scale_y = target / height;
    let mut scale_x = scale_y;

    let c = sample.character();
    let raw_width = width * scale_x;
    if let Some(ideal) = ideal_width(c).map(|f| f * target) {
        if raw_width > ideal * 1.50 {
            scale_x = ideal * 1.15 / width;
        } else if raw_width < ideal * 0.50 {
            scale_x = ideal * 0.85 / width;
        }
    }
    let max_width = target * max_aspect(c);
    if width * scale_x > max_width {
        scale_x = max_width / width;
    }

    let map = |p: Point| Point::new((p.x - bbox.x0) * scale_x, (p.y - bbox.y0) * scale_y);
    let strokes = sample
        .strokes()
        .iter()
        .map(|s| Stroke::new(s.points().iter().copied().map(map)))
        .collect::<PenwrightResult<Vec<_>>>()?;
    let baseline = sample
        .explicit_baseline()
        .map(|b| (b - bbox.y0) * scale_y);
    rebuild(sample, strokes, baseline)
}

fn rebuild(
    sample: &GlyphSample,
    strokes: Vec<Stroke>,
    baseline: Option<f64>,
) -> PenwrightResult<GlyphSample> {
    let mut out = GlyphSample::new(sample.character(), strokes)?;
    if let Some(b) = baseline {
        out = out.with_baseline(b)?;
    }
    if let Some(label) = sample.label() {
        out = out.with_label(label);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/library/normalize.rs"]
mod tests;
