pub use kurbo::{Affine, Point, Rect, Vec2};

/// Placement of a glyph instance on the page.
///
/// `anchor` is a pivot in glyph-local units; `translate` is applied last, in page units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Offset applied last.
    pub translate: Vec2,
    /// Rotation about `anchor`.
    pub rotation_rad: f64,
    /// Per-axis scale about `anchor`; `(1, 1)` by default.
    pub scale: Vec2,
    /// Pivot in local space.
    pub anchor: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    /// Transform that maps `anchor` onto `target` after scaling and rotating about it.
    pub fn pinned(anchor: Vec2, target: Point, rotation_rad: f64, scale: f64) -> Self {
        Self {
            translate: target.to_vec2() - anchor,
            rotation_rad,
            scale: Vec2::new(scale, scale),
            anchor,
        }
    }

    /// Compose into a single affine map.
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_anchor = Affine::translate(self.anchor);
        let t_unanchor = Affine::translate(-self.anchor);
        let t_rotate = Affine::rotate(self.rotation_rad);
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);

        // Canonical order:
        // T(translate) * T(anchor) * R(rot) * S(scale) * T(-anchor)
        t_translate * t_anchor * t_rotate * t_scale * t_unanchor
    }
}

/// Smallest rectangle containing every point, or `None` for an empty input.
pub fn bounds_of(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut it = points.into_iter();
    let first = it.next()?;
    Some(it.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
}

pub(crate) fn is_finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
