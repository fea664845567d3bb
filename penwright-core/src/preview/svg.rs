//! Paper previews of machine strokes.

use anyhow::Context;

use crate::{
    foundation::error::{PenwrightError, PenwrightResult},
    transform::machine::{MachineConfig, MachineStroke},
};

const PEN_WIDTH_MM: f64 = 0.35;
const MAX_DIM: u32 = 16_384;

/// SVG document of `strokes` over the machine travel area, in millimetres.
///
/// Machine y points up when `invert_y` is set, so the drawing group is flipped back for display.
pub fn render_svg(strokes: &[MachineStroke], machine: &MachineConfig) -> String {
    let (w, h) = (machine.travel_width, machine.travel_height);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n"
    );
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"white\" stroke=\"#c8c8c8\" stroke-width=\"0.2\"/>\n"
    ));
    if machine.invert_y {
        svg.push_str(&format!("<g transform=\"translate(0 {h}) scale(1 -1)\">\n"));
    } else {
        svg.push_str("<g>\n");
    }

    for s in strokes {
        match s.points.as_slice() {
            [] => {}
            [p] => svg.push_str(&format!(
                "<circle cx=\"{:.3}\" cy=\"{:.3}\" r=\"{:.3}\" fill=\"black\"/>\n",
                p.x,
                p.y,
                PEN_WIDTH_MM / 2.0
            )),
            pts => {
                let coords: Vec<String> = pts
                    .iter()
                    .map(|p| format!("{:.3},{:.3}", p.x, p.y))
                    .collect();
                svg.push_str(&format!(
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"black\" stroke-width=\"{PEN_WIDTH_MM}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>\n",
                    coords.join(" ")
                ));
            }
        }
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

/// Rasterize [`render_svg`] at `px_per_mm` onto an opaque white page.
pub fn render_png(
    strokes: &[MachineStroke],
    machine: &MachineConfig,
    px_per_mm: f64,
) -> PenwrightResult<image::RgbaImage> {
    machine.validate()?;
    if !px_per_mm.is_finite() || px_per_mm <= 0.0 {
        return Err(PenwrightError::invalid_config(
            "preview px_per_mm must be finite and > 0",
        ));
    }
    let width = (machine.travel_width * px_per_mm).ceil().max(1.0) as u32;
    let height = (machine.travel_height * px_per_mm).ceil().max(1.0) as u32;
    if width > MAX_DIM || height > MAX_DIM {
        return Err(PenwrightError::invalid_config(format!(
            "preview size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let svg = render_svg(strokes, machine);
    let tree = usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default())
        .context("parse preview svg")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PenwrightError::invalid_config("failed to allocate preview pixmap"))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);
    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // Opaque background: premultiplied and straight RGBA coincide.
    image::RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| PenwrightError::invalid_config("preview buffer size mismatch"))
}

#[cfg(test)]
#[path = "../../tests/unit/preview/svg.rs"]
mod tests;
