use super::*;
use crate::Point;

fn strokes() -> Vec<MachineStroke> {
    vec![
        MachineStroke {
            points: vec![Point::new(10.0, 10.0), Point::new(40.0, 40.0), Point::new(60.0, 10.0)],
            character: 'v',
            glyph_index: 0,
        },
        MachineStroke {
            points: vec![Point::new(70.0, 20.0)],
            character: 'i',
            glyph_index: 1,
        },
    ]
}

fn small_machine() -> MachineConfig {
    MachineConfig {
        travel_width: 100.0,
        travel_height: 50.0,
        ..MachineConfig::default()
    }
}

#[test]
fn svg_has_one_element_per_stroke() {
    let svg = render_svg(&strokes(), &small_machine());
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("viewBox=\"0 0 100 50\""));
    assert_eq!(svg.matches("<polyline").count(), 1);
    assert_eq!(svg.matches("<circle").count(), 1);
    assert!(svg.contains("10.000,10.000 40.000,40.000 60.000,10.000"));
    assert!(svg.contains("scale(1 -1)"));
}

#[test]
fn svg_is_not_flipped_for_page_frame_machines() {
    let m = MachineConfig {
        invert_y: false,
        ..small_machine()
    };
    assert!(!render_svg(&strokes(), &m).contains("scale(1 -1)"));
}

#[test]
fn png_has_requested_size_and_ink() {
    let img = render_png(&strokes(), &small_machine(), 4.0).unwrap();
    assert_eq!(img.dimensions(), (400, 200));
    assert!(img.pixels().all(|p| p.0[3] == 255));
    let dark = img.pixels().filter(|p| p.0[0] < 128).count();
    assert!(dark > 0);
    // Corner far from any stroke stays paper white.
    assert_eq!(img.get_pixel(360, 160).0, [255, 255, 255, 255]);
}

#[test]
fn png_rejects_bad_resolution() {
    assert!(render_png(&strokes(), &small_machine(), 0.0).is_err());
    assert!(render_png(&strokes(), &small_machine(), 1000.0).is_err());
}
