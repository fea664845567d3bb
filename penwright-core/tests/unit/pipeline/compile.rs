use super::*;
use crate::{GlyphLibrary, GlyphSample, MemoryGlyphStore, Stroke};

fn store() -> MemoryGlyphStore {
    let mut lib = GlyphLibrary::new("ada");
    for (c, w) in [('a', 50.0), ('b', 45.0), ('c', 40.0)] {
        let s = Stroke::new([Point::new(0.0, 100.0), Point::new(w, 0.0)]).unwrap();
        lib.insert(GlyphSample::new(c, vec![s]).unwrap());
    }
    lib.add_signature("Ada Byron");
    MemoryGlyphStore::new().with(lib)
}

#[test]
fn measure_accumulates_lengths_and_time() {
    let cmds = [
        MachineCommand::Home,
        MachineCommand::SetFeedRate(600.0),
        MachineCommand::Travel(Point::new(3.0, 4.0)),
        MachineCommand::PenDown,
        MachineCommand::SetFeedRate(300.0),
        MachineCommand::Draw(Point::new(3.0, 14.0)),
        MachineCommand::PenUp,
    ];
    let (draw, travel, secs) = measure(&cmds, 1000.0);
    assert_eq!(draw, 10.0);
    assert_eq!(travel, 5.0);
    assert!((secs - (5.0 / 600.0 + 10.0 / 300.0) * 60.0).abs() < 1e-9);
}

#[test]
fn compiled_job_stats_match_strokes() {
    let job = compile_job(
        &CompileRequest::new("ada", "abc"),
        &store(),
        &JobConfig::default(),
    )
    .unwrap();
    assert_eq!(job.stats.glyphs, 3);
    assert_eq!(job.stats.strokes, 3);
    assert_eq!(job.stats.lines, 1);
    assert_eq!(job.stats.commands, job.commands.len());
    let drawn: f64 = job.strokes.iter().map(MachineStroke::length).sum();
    assert!((job.stats.draw_length_mm - drawn).abs() < 1e-9);
    assert!(job.stats.travel_length_mm > 0.0);
    assert!(job.stats.estimated_seconds > 0.0);
}

#[test]
fn unknown_user_fails_before_the_safeguard() {
    let req = CompileRequest::new("nobody", "hi").with_intent(RequestIntent::Signature);
    assert!(matches!(
        compile_job(&req, &store(), &JobConfig::default()),
        Err(PenwrightError::LibraryNotFound { .. })
    ));
}

#[test]
fn recorded_signatures_are_denied() {
    let req = CompileRequest::new("ada", "ada byron");
    let err = compile_job(&req, &store(), &JobConfig::default()).unwrap_err();
    assert!(matches!(err, PenwrightError::ContentRejected { .. }));
}

#[test]
fn invalid_config_fails_first() {
    let mut cfg = JobConfig::default();
    cfg.motion.feed_rate_draw = 0.0;
    assert!(matches!(
        compile_job(&CompileRequest::new("nobody", "a"), &store(), &cfg),
        Err(PenwrightError::InvalidConfiguration(_))
    ));
}

#[test]
fn batch_keeps_order_and_isolates_failures() {
    let reqs = vec![
        CompileRequest::new("ada", "abc"),
        CompileRequest::new("ada", "xyz"),
        CompileRequest::new("ada", "cab"),
    ];
    let out = compile_batch(
        &reqs,
        &store(),
        &JobConfig::default(),
        &BatchOpts { threads: Some(2) },
    )
    .unwrap();
    assert_eq!(out.len(), 3);
    assert!(out[0].is_ok());
    assert!(matches!(out[1], Err(PenwrightError::MissingGlyph { character: 'x' })));
    assert!(out[2].is_ok());

    let single = compile_job(&reqs[2], &store(), &JobConfig::default()).unwrap();
    assert_eq!(out[2].as_ref().unwrap(), &single);
}

#[test]
fn zero_threads_is_rejected() {
    assert!(compile_batch(&[], &store(), &JobConfig::default(), &BatchOpts { threads: Some(0) }).is_err());
}

#[test]
fn job_writes_to_a_sink() {
    let job = compile_job(&CompileRequest::new("ada", "a"), &store(), &JobConfig::default()).unwrap();
    let mut sink = crate::InMemorySink::new();
    job.write_to(&mut sink, Some("a")).unwrap();
    assert_eq!(sink.commands(), job.commands.as_slice());
    let text = job.to_gcode(&GcodeDialect::default()).unwrap();
    assert!(text.starts_with("G21\nG90\n$H\n"));
}
