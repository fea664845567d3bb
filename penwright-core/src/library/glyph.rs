use std::collections::BTreeMap;

use crate::foundation::{
    core::{Point, Rect, bounds_of, is_finite_point},
    error::{PenwrightError, PenwrightResult},
};

/// One continuous pen-down path in glyph-local units.
///
/// Invariants: non-empty, finite, and no two consecutive points are equal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Build a stroke, dropping exact consecutive duplicates.
    pub fn new(points: impl IntoIterator<Item = Point>) -> PenwrightResult<Self> {
        let mut out: Vec<Point> = Vec::new();
        for p in points {
            if !is_finite_point(p) {
                return Err(PenwrightError::invalid_config(
                    "stroke points must be finite",
                ));
            }
            if out.last() != Some(&p) {
                out.push(p);
            }
        }
        if out.is_empty() {
            return Err(PenwrightError::invalid_config("stroke must be non-empty"));
        }
        Ok(Self { points: out })
    }

    /// Ordered points of the stroke.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Where the pen goes down.
    pub fn first(&self) -> Point {
        self.points[0]
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; strokes are never empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Tight bounds of the stroke points.
    pub fn bounding_box(&self) -> Rect {
        let p = self.first();
        bounds_of(self.points.iter().copied()).unwrap_or_else(|| Rect::from_points(p, p))
    }

    /// Polyline arc length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

impl TryFrom<Vec<[f64; 2]>> for Stroke {
    type Error = PenwrightError;

    fn try_from(value: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Stroke::new(value.into_iter().map(|[x, y]| Point::new(x, y)))
    }
}

impl From<Stroke> for Vec<[f64; 2]> {
    fn from(value: Stroke) -> Self {
        value.points.into_iter().map(|p| [p.x, p.y]).collect()
    }
}

/// A captured rendering of one character.
///
/// Immutable once built; the bounding box is always derived from the strokes.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphSample {
    character: char,
    strokes: Vec<Stroke>,
    bbox: Rect,
    baseline: Option<f64>,
    label: Option<String>,
}

impl GlyphSample {
    /// Build a sample from at least one stroke.
    pub fn new(character: char, strokes: Vec<Stroke>) -> PenwrightResult<Self> {
        let Some(bbox) = bounds_of(strokes.iter().flat_map(|s| s.points().iter().copied()))
        else {
            return Err(PenwrightError::invalid_config(format!(
                "glyph sample for {character:?} has no strokes"
            )));
        };
        Ok(Self {
            character,
            strokes,
            bbox,
            baseline: None,
            label: None,
        })
    }

    /// Set the local y coordinate of the writing baseline.
    pub fn with_baseline(mut self, baseline: f64) -> PenwrightResult<Self> {
        if !baseline.is_finite() {
            return Err(PenwrightError::invalid_config(format!(
                "glyph sample for {:?} has a non-finite baseline",
                self.character
            )));
        }
        self.baseline = Some(baseline);
        Ok(self)
    }

    /// Attach a free-form capture label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The character this sample renders.
    pub fn character(&self) -> char {
        self.character
    }

    /// Strokes in drawing order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Bounds of all strokes in local units.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Local width used for spacing.
    pub fn width(&self) -> f64 {
        self.bbox.width()
    }

    /// Local height.
    pub fn height(&self) -> f64 {
        self.bbox.height()
    }

    /// Local baseline; the bottom of the bounding box when none was captured.
    pub fn baseline(&self) -> f64 {
        self.baseline.unwrap_or(self.bbox.y1)
    }

    /// Explicitly captured baseline, if any.
    pub fn explicit_baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Capture label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Per-user mapping from character to its ordered sample variants.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "LibraryDef", into = "LibraryDef")]
pub struct GlyphLibrary {
    user: String,
    glyphs: BTreeMap<char, Vec<GlyphSample>>,
    signatures: Vec<String>,
}

impl GlyphLibrary {
    /// Empty library for `user`.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            glyphs: BTreeMap::new(),
            signatures: Vec::new(),
        }
    }

    /// Owner of the library.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Variants for `character` in capture order; empty when never captured.
    pub fn get(&self, character: char) -> &[GlyphSample] {
        self.glyphs.get(&character).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether at least one variant exists for `character`.
    pub fn contains(&self, character: char) -> bool {
        !self.get(character).is_empty()
    }

    /// Append a variant (maintenance path only).
    pub fn insert(&mut self, sample: GlyphSample) {
        self.glyphs
            .entry(sample.character())
            .or_default()
            .push(sample);
    }

    /// Record a signature label the safeguard must refuse for this user.
    pub fn add_signature(&mut self, label: impl Into<String>) {
        self.signatures.push(label.into());
    }

    /// Recorded signature labels.
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    /// Captured characters in sorted order.
    pub fn characters(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.keys().copied()
    }

    /// Iterate `(character, variants)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &[GlyphSample])> + '_ {
        self.glyphs.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Total number of samples across all characters.
    pub fn sample_count(&self) -> usize {
        self.glyphs.values().map(Vec::len).sum()
    }

    /// Characters of `text` that have no variant (whitespace and controls excluded).
    pub fn missing_characters(&self, text: &str) -> Vec<char> {
        let mut out = Vec::new();
        for c in text.chars() {
            if c.is_whitespace() || c.is_control() || self.contains(c) || out.contains(&c) {
                continue;
            }
            out.push(c);
        }
        out
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct SampleDef {
    strokes: Vec<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    baseline: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct LibraryDef {
    user: String,
    #[serde(default)]
    glyphs: BTreeMap<String, Vec<SampleDef>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    signatures: Vec<String>,
}

impl TryFrom<LibraryDef> for GlyphLibrary {
    type Error = PenwrightError;

    fn try_from(def: LibraryDef) -> Result<Self, Self::Error> {
        let mut lib = GlyphLibrary::new(def.user);
        for (key, samples) in def.glyphs {
            let mut chars = key.chars();
            let (Some(character), None) = (chars.next(), chars.next()) else {
                return Err(PenwrightError::serde(format!(
                    "glyph key '{key}' must be exactly one character"
                )));
            };
            for s in samples {
                let mut sample = GlyphSample::new(character, s.strokes)?;
                if let Some(b) = s.baseline {
                    sample = sample.with_baseline(b)?;
                }
                if let Some(label) = s.label {
                    sample = sample.with_label(label);
                }
                lib.insert(sample);
            }
        }
        lib.signatures = def.signatures;
        Ok(lib)
    }
}

impl From<GlyphLibrary> for LibraryDef {
    fn from(lib: GlyphLibrary) -> Self {
        let glyphs = lib
            .glyphs
            .into_iter()
            .map(|(c, samples)| {
                let defs = samples
                    .into_iter()
                    .map(|s| SampleDef {
                        strokes: s.strokes,
                        baseline: s.baseline,
                        label: s.label,
                    })
                    .collect();
                (c.to_string(), defs)
            })
            .collect();
        Self {
            user: lib.user,
            glyphs,
            signatures: lib.signatures,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/library/glyph.rs"]
mod tests;
