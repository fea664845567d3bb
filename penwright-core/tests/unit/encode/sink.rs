use super::*;
use crate::foundation::{core::Point, error::PenwrightError};
use MachineCommand::*;

fn stream() -> Vec<MachineCommand> {
    vec![
        Home,
        PenUp,
        Travel(Point::new(1.0, 1.0)),
        PenDown,
        Draw(Point::new(2.0, 2.0)),
        PenUp,
    ]
}

#[test]
fn in_memory_sink_captures_stream() {
    let mut sink = InMemorySink::new();
    stream_commands(&stream(), &mut sink, Some("job")).unwrap();
    assert_eq!(sink.commands(), stream().as_slice());
    assert_eq!(
        sink.config(),
        Some(&SinkConfig {
            command_count: 6,
            label: Some("job".to_string()),
        })
    );
    assert!(sink.is_finished());
}

#[test]
fn invalid_stream_never_reaches_the_sink() {
    let mut sink = InMemorySink::new();
    let err = stream_commands(&[Home, PenDown], &mut sink, None).unwrap_err();
    assert!(matches!(err, PenwrightError::PenState(_)));
    assert!(sink.config().is_none());
    assert!(sink.commands().is_empty());
}

#[test]
fn writer_sink_adds_label_header() {
    let mut sink = GcodeWriterSink::new(Vec::new(), GcodeDialect::default());
    stream_commands(&stream(), &mut sink, Some("letter to ada")).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("; letter to ada"));
    assert_eq!(lines.next(), Some("G21"));
    assert_eq!(text.lines().last(), Some("M2"));
}

#[test]
fn writer_sink_rejects_invalid_dialect() {
    let dialect = GcodeDialect {
        decimals: 12,
        ..GcodeDialect::default()
    };
    let mut sink = GcodeWriterSink::new(Vec::new(), dialect);
    assert!(stream_commands(&stream(), &mut sink, None).is_err());
}
