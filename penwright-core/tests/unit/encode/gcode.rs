use super::*;
use MachineCommand::*;
use crate::emit::command::validate_pen_states;

fn stream() -> Vec<MachineCommand> {
    vec![
        Home,
        Comment("strokes: 1".into()),
        PenUp,
        SetFeedRate(3000.0),
        Travel(Point::new(10.5, 20.25)),
        PenDown,
        SetFeedRate(1000.0),
        Draw(Point::new(11.0, 21.0)),
        Draw(Point::new(12.25, 20.0)),
        PenUp,
        SetFeedRate(3000.0),
        Travel(Point::ZERO),
        PenUp,
    ]
}

#[test]
fn default_dialect_program() {
    let text = encode_gcode(&stream(), &GcodeDialect::default()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "G21",
            "G90",
            "$H",
            "; strokes: 1",
            "M5",
            "G1 F3000",
            "G0 X10.500 Y20.250",
            "M3 S500",
            "G1 F1000",
            "G1 X11.000 Y21.000",
            "G1 X12.250 Y20.000",
            "M5",
            "G1 F3000",
            "G0 X0.000 Y0.000",
            "M5",
            "M2",
        ]
    );
}

#[test]
fn z_axis_dialect_round_trips() {
    let dialect = GcodeDialect {
        pen: PenCodes::ZAxis { up: 5.0, down: 0.0 },
        home: HomeCode::G28,
        rapid_travel: false,
        decimals: 2,
        program_end: false,
    };
    let text = encode_gcode(&stream(), &dialect).unwrap();
    assert!(text.contains("G0 Z5.00"));
    assert!(text.contains("G1 Z0.00"));
    assert!(text.contains("G28"));
    assert!(!text.contains("M2"));
    assert_eq!(decode_gcode(&text, &dialect).unwrap(), stream());
}

#[test]
fn default_dialect_round_trips() {
    let dialect = GcodeDialect::default();
    let text = encode_gcode(&stream(), &dialect).unwrap();
    assert_eq!(decode_gcode(&text, &dialect).unwrap(), stream());
}

#[test]
fn negative_zero_is_written_as_zero() {
    let d = GcodeDialect::default();
    assert_eq!(d.encode_command(&Travel(Point::new(-0.0001, 1.0))), "G0 X0.000 Y1.000");
}

#[test]
fn comments_are_kept_on_one_line() {
    let d = GcodeDialect::default();
    assert_eq!(d.encode_command(&Comment("a\nb".into())), "; a b");
}

#[test]
fn decoder_skips_inline_comments_and_feed_on_moves() {
    let d = GcodeDialect::default();
    let cmds = decode_gcode("$H\nM3 S500 ; down\nG1 X1 Y2 F800\n(note)\n", &d).unwrap();
    assert_eq!(
        cmds,
        vec![Home, PenDown, SetFeedRate(800.0), Draw(Point::new(1.0, 2.0))]
    );
}

#[test]
fn decoder_reports_line_numbers() {
    let d = GcodeDialect::default();
    let err = decode_gcode("G21\nG2 X1 Y1 I0 J0\n", &d).unwrap_err();
    assert!(matches!(err, PenwrightError::Encoding(_)));
    assert!(err.to_string().contains("line 2"));

    let err = decode_gcode("G0 X1\n", &d).unwrap_err();
    assert!(err.to_string().contains("line 1"));

    assert!(decode_gcode("G0 Z3\n", &d).is_err());
}

#[test]
fn dialect_validation() {
    GcodeDialect::default().validate().unwrap();
    let bad = GcodeDialect {
        pen: PenCodes::ZAxis { up: 1.0, down: 1.0 },
        ..GcodeDialect::default()
    };
    assert!(bad.validate().is_err());
    let bad = GcodeDialect {
        decimals: 9,
        ..GcodeDialect::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn dialect_reads_from_json() {
    let d: GcodeDialect =
        serde_json::from_str(r#"{"pen":{"z_axis":{"up":3,"down":-1}},"home":"g28"}"#).unwrap();
    assert_eq!(d.pen, PenCodes::ZAxis { up: 3.0, down: -1.0 });
    assert_eq!(d.home, HomeCode::G28);
    assert_eq!(d.decimals, 3);
}

#[test]
fn z_heights_that_round_together_are_refused() {
    let dialect = GcodeDialect {
        pen: PenCodes::ZAxis {
            up: 0.0004,
            down: 0.0,
        },
        ..GcodeDialect::default()
    };
    let err = dialect.validate().unwrap_err();
    assert!(matches!(err, PenwrightError::InvalidConfiguration(_)));
    assert!(err.to_string().contains("Z0.000"));
    assert!(encode_gcode(&stream(), &dialect).is_err());

    let finer = GcodeDialect {
        decimals: 4,
        ..dialect
    };
    finer.validate().unwrap();
    let text = encode_gcode(&stream(), &finer).unwrap();
    let back = decode_gcode(&text, &finer).unwrap();
    validate_pen_states(&back).unwrap();
    assert_eq!(back, stream());
}

#[test]
fn comment_text_survives_decoding_verbatim() {
    let cmds = vec![Comment(" job ".into()), Comment(String::new()), Home, PenUp];
    let d = GcodeDialect::default();
    let text = encode_gcode(&cmds, &d).unwrap();
    assert_eq!(decode_gcode(&text, &d).unwrap(), cmds);
}
