use crate::{
    foundation::{
        core::{Affine, Point, Rect, Vec2, bounds_of, is_finite_point},
        error::{PenwrightError, PenwrightResult},
    },
    layout::page::Page,
};

/// Physical plotter geometry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Reachable X extent in mm, starting at 0.
    pub travel_width: f64,
    /// Reachable Y extent in mm, starting at 0.
    pub travel_height: f64,
    /// Machine position of the page origin.
    pub origin_offset: Vec2,
    /// Sheet skew, applied about the page origin.
    pub rotation_skew_deg: f64,
    /// Page y grows downwards, machine y upwards.
    pub invert_y: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            travel_width: 300.0,
            travel_height: 300.0,
            origin_offset: Vec2::ZERO,
            rotation_skew_deg: 0.0,
            invert_y: true,
        }
    }
}

impl MachineConfig {
    /// Reject non-positive travel and non-finite placement.
    pub fn validate(&self) -> PenwrightResult<()> {
        for (name, v) in [
            ("travel_width", self.travel_width),
            ("travel_height", self.travel_height),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PenwrightError::invalid_config(format!(
                    "machine {name} must be finite and > 0"
                )));
            }
        }
        if !self.origin_offset.is_finite() || !self.rotation_skew_deg.is_finite() {
            return Err(PenwrightError::invalid_config(
                "machine origin_offset and rotation_skew_deg must be finite",
            ));
        }
        Ok(())
    }

    /// Reachable area.
    pub fn travel_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.travel_width, self.travel_height)
    }
}

/// One stroke in machine millimetres, in page order.
#[derive(Clone, Debug, PartialEq)]
pub struct MachineStroke {
    /// Transformed points; never empty.
    pub points: Vec<Point>,
    /// Character of the glyph the stroke belongs to.
    pub character: char,
    /// Index of that glyph in the page.
    pub glyph_index: usize,
}

impl MachineStroke {
    /// Polyline length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).hypot()).sum()
    }
}

/// Page millimetres to machine millimetres: `T(origin) * R(skew) * Flip`.
pub fn page_to_machine(page_height: f64, machine: &MachineConfig) -> Affine {
    let flip = if machine.invert_y {
        Affine::translate((0.0, page_height)) * Affine::scale_non_uniform(1.0, -1.0)
    } else {
        Affine::IDENTITY
    };
    Affine::translate(machine.origin_offset)
        * Affine::rotate(machine.rotation_skew_deg.to_radians())
        * flip
}

/// Map every stroke of every placed glyph into machine space.
///
/// All-or-nothing: the first point outside the travel area fails the whole page.
#[tracing::instrument(skip(page, machine), fields(glyphs = page.glyphs.len()))]
pub fn transform(page: &Page<'_>, machine: &MachineConfig) -> PenwrightResult<Vec<MachineStroke>> {
    machine.validate()?;

    let to_machine = page_to_machine(page.height, machine);
    let area = machine.travel_rect();
    let mut out = Vec::with_capacity(page.stroke_count());

    for (glyph_index, glyph) in page.glyphs.iter().enumerate() {
        let m = to_machine * glyph.to_page(page.scale_factor);
        for stroke in glyph.sample.strokes() {
            let mut points = Vec::with_capacity(stroke.len());
            for &p in stroke.points() {
                let q = m * p;
                if !is_finite_point(q) || !contains(area, q) {
                    return Err(PenwrightError::out_of_bounds(format!(
                        "glyph {glyph_index} ({:?}) reaches ({:.3}, {:.3}) mm, outside travel area {}x{} mm",
                        glyph.character, q.x, q.y, machine.travel_width, machine.travel_height
                    )));
                }
                points.push(q);
            }
            out.push(MachineStroke {
                points,
                character: glyph.character,
                glyph_index,
            });
        }
    }

    tracing::debug!(strokes = out.len(), "transform complete");
    Ok(out)
}

/// Union of all stroke points.
pub fn strokes_bounds(strokes: &[MachineStroke]) -> Option<Rect> {
    bounds_of(strokes.iter().flat_map(|s| s.points.iter().copied()))
}

fn contains(area: Rect, p: Point) -> bool {
    const EPS: f64 = 1e-9;
    p.x >= area.x0 - EPS && p.x <= area.x1 + EPS && p.y >= area.y0 - EPS && p.y <= area.y1 + EPS
}

#[cfg(test)]
#[path = "../../tests/unit/transform/machine.rs"]
mod tests;
