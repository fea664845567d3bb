use super::*;
use MachineCommand::*;

fn stroke(points: &[(f64, f64)]) -> MachineStroke {
    MachineStroke {
        points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        character: 'a',
        glyph_index: 0,
    }
}

#[test]
fn empty_input_still_homes_and_parks() {
    let cmds = emit(&[], &MotionProfile::default()).unwrap();
    assert_eq!(
        cmds,
        vec![
            Home,
            Comment("strokes: 0".into()),
            PenUp,
            SetFeedRate(3000.0),
            Travel(Point::ZERO),
            PenUp,
        ]
    );
}

#[test]
fn single_stroke_layout() {
    let cmds = emit(&[stroke(&[(1.0, 1.0), (2.0, 1.0), (3.0, 2.0)])], &MotionProfile::default())
        .unwrap();
    assert_eq!(
        cmds,
        vec![
            Home,
            Comment("strokes: 1".into()),
            PenUp,
            SetFeedRate(3000.0),
            Travel(Point::new(1.0, 1.0)),
            PenDown,
            SetFeedRate(1000.0),
            Draw(Point::new(2.0, 1.0)),
            Draw(Point::new(3.0, 2.0)),
            PenUp,
            SetFeedRate(3000.0),
            Travel(Point::ZERO),
            PenUp,
        ]
    );
}

#[test]
fn every_stroke_is_bracketed_by_pen_changes() {
    let strokes = [
        stroke(&[(1.0, 1.0), (2.0, 2.0)]),
        stroke(&[(5.0, 5.0)]),
        stroke(&[(3.0, 3.0), (4.0, 3.0), (4.0, 4.0)]),
    ];
    let cmds = emit(&strokes, &MotionProfile::default()).unwrap();
    let downs = cmds.iter().filter(|c| **c == PenDown).count();
    assert_eq!(downs, 3);
    let draws = cmds.iter().filter(|c| matches!(c, Draw(_))).count();
    assert_eq!(draws, 3);
    assert_eq!(cmds.last(), Some(&PenUp));
    for (i, c) in cmds.iter().enumerate() {
        if *c == PenDown {
            assert!(matches!(cmds[i - 1], Travel(_)));
        }
    }
}

#[test]
fn feed_rate_is_not_repeated_when_unchanged() {
    let profile = MotionProfile {
        feed_rate_travel: 1500.0,
        feed_rate_draw: 1500.0,
        return_to_origin: true,
    };
    let strokes = [stroke(&[(1.0, 1.0), (2.0, 2.0)]), stroke(&[(3.0, 3.0), (4.0, 4.0)])];
    let cmds = emit(&strokes, &profile).unwrap();
    let feeds = cmds.iter().filter(|c| matches!(c, SetFeedRate(_))).count();
    assert_eq!(feeds, 1);
}

#[test]
fn return_to_origin_can_be_disabled() {
    let profile = MotionProfile {
        return_to_origin: false,
        ..MotionProfile::default()
    };
    let cmds = emit(&[stroke(&[(1.0, 1.0), (2.0, 2.0)])], &profile).unwrap();
    assert!(!cmds.contains(&Travel(Point::ZERO)));
    assert_eq!(&cmds[cmds.len() - 2..], &[PenUp, PenUp]);
}

#[test]
fn invalid_profile_is_rejected() {
    let profile = MotionProfile {
        feed_rate_draw: -1.0,
        ..MotionProfile::default()
    };
    assert!(matches!(
        emit(&[], &profile),
        Err(PenwrightError::InvalidConfiguration(_))
    ));
}
