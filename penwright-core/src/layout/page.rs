use crate::{
    foundation::{
        core::{Affine, Point, Rect, Transform2D, Vec2},
        error::{PenwrightError, PenwrightResult},
    },
    library::glyph::GlyphSample,
};

/// Page geometry and handwriting naturalness settings.
///
/// Lengths are in millimetres on the page; `scale_factor` converts glyph-local units to mm.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    /// Margin applied on all four sides.
    pub margin: f64,
    /// Baseline-to-baseline distance.
    pub line_height: f64,
    /// Horizontal advance of a space.
    pub space_width: f64,
    /// Gap added after every glyph.
    pub char_spacing: f64,
    /// Glyph-local units to millimetres.
    pub scale_factor: f64,
    /// Line breaking strategy.
    pub wrap: WrapMode,
    /// Random variation bounds.
    pub jitter: JitterBounds,
    /// What to do with characters the library cannot render.
    pub missing_glyph: MissingGlyphPolicy,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 15.0,
            line_height: 12.0,
            space_width: 3.5,
            char_spacing: 0.6,
            scale_factor: 0.07,
            wrap: WrapMode::Word,
            jitter: JitterBounds::default(),
            missing_glyph: MissingGlyphPolicy::Abort,
        }
    }
}

impl PageConfig {
    /// Reject dimensions that cannot produce a page.
    pub fn validate(&self) -> PenwrightResult<()> {
        for (name, v) in [
            ("width", self.width),
            ("height", self.height),
            ("line_height", self.line_height),
            ("scale_factor", self.scale_factor),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PenwrightError::invalid_config(format!(
                    "page {name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [
            ("margin", self.margin),
            ("space_width", self.space_width),
            ("char_spacing", self.char_spacing),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PenwrightError::invalid_config(format!(
                    "page {name} must be finite and >= 0"
                )));
            }
        }
        if self.margin * 2.0 >= self.width || self.margin * 2.0 >= self.height {
            return Err(PenwrightError::invalid_config(
                "page margin leaves no printable area",
            ));
        }
        self.jitter.validate()
    }

    /// Leftmost cursor position of a line.
    pub fn line_start_x(&self) -> f64 {
        self.margin
    }

    /// Horizontal limit that triggers a line break.
    pub fn line_limit_x(&self) -> f64 {
        self.width - self.margin
    }

    /// Lowest admissible baseline.
    pub fn bottom_limit_y(&self) -> f64 {
        self.height - self.margin
    }
}

/// Symmetric bounds for uniform random variation; zero disables a component.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JitterBounds {
    /// Horizontal placement offset (mm).
    pub offset_x: f64,
    /// Vertical placement offset (mm).
    pub offset_y: f64,
    /// Variation of the gap after a glyph (mm).
    pub spacing: f64,
    /// Per-glyph rotation (degrees).
    pub rotation_deg: f64,
    /// Relative per-glyph scale variation (0.05 = ±5 %).
    pub scale: f64,
}

impl JitterBounds {
    /// No variation at all.
    pub const NONE: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        spacing: 0.0,
        rotation_deg: 0.0,
        scale: 0.0,
    };

    fn validate(&self) -> PenwrightResult<()> {
        for (name, v) in [
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
            ("spacing", self.spacing),
            ("rotation_deg", self.rotation_deg),
            ("scale", self.scale),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PenwrightError::invalid_config(format!(
                    "jitter {name} must be finite and >= 0"
                )));
            }
        }
        if self.scale >= 1.0 {
            return Err(PenwrightError::invalid_config("jitter scale must be < 1"));
        }
        Ok(())
    }
}

impl Default for JitterBounds {
    fn default() -> Self {
        Self {
            offset_x: 0.15,
            offset_y: 0.25,
            spacing: 0.3,
            rotation_deg: 1.5,
            scale: 0.03,
        }
    }
}

/// Line breaking strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Move whole words to the next line when they do not fit.
    #[default]
    Word,
    /// Break before any glyph that does not fit.
    Glyph,
}

/// Handling of characters without a captured sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingGlyphPolicy {
    /// Fail the whole compilation with [`PenwrightError::MissingGlyph`].
    #[default]
    Abort,
    /// Draw another library character in its place.
    Substitute {
        /// Placeholder character; must itself be in the library.
        character: char,
    },
    /// Leave a space-sized gap.
    Skip,
}

/// A sample placed on the page. References, never owns, its sample.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutGlyph<'lib> {
    /// Placed sample.
    pub sample: &'lib GlyphSample,
    /// Requested character (differs from the sample's under substitution).
    pub character: char,
    /// Index of the chosen variant.
    pub variant: usize,
    /// Page position of the sample's left baseline point.
    pub origin: Point,
    /// Per-instance rotation jitter in radians.
    pub rotation_rad: f64,
    /// Per-instance scale jitter (1.0 = none).
    pub scale: f64,
    /// Zero-based line number.
    pub line: usize,
}

impl<'lib> LayoutGlyph<'lib> {
    /// Local sample units to page millimetres.
    pub fn to_page(&self, scale_factor: f64) -> Affine {
        let bbox = self.sample.bbox();
        let anchor = Vec2::new(bbox.x0, self.sample.baseline());
        Transform2D::pinned(
            anchor,
            self.origin,
            self.rotation_rad,
            scale_factor * self.scale,
        )
        .to_affine()
    }

    /// Placed bounds on the page.
    pub fn page_bounds(&self, scale_factor: f64) -> Rect {
        self.to_page(scale_factor)
            .transform_rect_bbox(self.sample.bbox())
    }
}

/// A character that was rendered with a placeholder or skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Substitution {
    /// Char index in the request text.
    pub position: usize,
    /// Unresolved character.
    pub requested: char,
    /// Placeholder drawn, `None` when skipped.
    pub placeholder: Option<char>,
}

/// Fully laid-out page, before machine mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<'lib> {
    /// Placed glyphs in writing order.
    pub glyphs: Vec<LayoutGlyph<'lib>>,
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    /// Page margin.
    pub margin: f64,
    /// Baseline-to-baseline distance.
    pub line_height: f64,
    /// Glyph-local units to millimetres.
    pub scale_factor: f64,
    /// Number of lines that hold at least one glyph position.
    pub lines: usize,
    /// Placeholder and skip events.
    pub substitutions: Vec<Substitution>,
}

impl<'lib> Page<'lib> {
    /// Total number of strokes across all placed glyphs.
    pub fn stroke_count(&self) -> usize {
        self.glyphs.iter().map(|g| g.sample.strokes().len()).sum()
    }

    /// Union of all placed glyph bounds.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.glyphs
            .iter()
            .map(|g| g.page_bounds(self.scale_factor))
            .reduce(|a, b| a.union(b))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/page.rs"]
mod tests;
