//! Penwright compiles text into pen-plotter motion programs written in a person's own handwriting.
//!
//! The input is a text request, a per-user library of captured glyph samples and a job
//! configuration. The output is a pen-state-safe sequence of [`MachineCommand`]s, optionally
//! rendered as G-code.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `user_id -> GlyphLibrary` through a [`GlyphStore`]
//! 2. **Gate**: [`ContentSafeguard`] refuses signature-like requests before any layout work
//! 3. **Layout**: `text + GlyphLibrary -> Page` (variant selection, jitter, word wrap)
//! 4. **Transform**: `Page -> Vec<MachineStroke>` (glyph units to machine millimetres, bounds check)
//! 5. **Emit**: `Vec<MachineStroke> -> Vec<MachineCommand>` (travel/draw moves, pen state, feed)
//! 6. **Encode** (optional): commands to G-code text or any [`CommandSink`]
//!
//! [`compile_job`] runs all of it; [`compile_batch`] runs independent requests in parallel.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: a job is a pure function of text, library, config and seed.
//! - **All-or-nothing**: every failure is detected before a stream exists; a returned stream is
//!   complete and ends with the pen up.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod emit;
mod encode;
mod foundation;
mod layout;
mod library;
mod pipeline;
mod preview;
mod safeguard;
mod transform;

pub use config::job::JobConfig;
pub use emit::command::{MachineCommand, PenState, validate_pen_states};
pub use emit::emitter::{MotionProfile, emit};
pub use encode::gcode::{GcodeDialect, HomeCode, PenCodes, decode_gcode, encode_gcode};
pub use encode::sink::{CommandSink, GcodeWriterSink, InMemorySink, SinkConfig, stream_commands};
pub use foundation::core::{Affine, Point, Rect, Transform2D, Vec2, bounds_of};
pub use foundation::error::{PenwrightError, PenwrightResult};
pub use layout::engine::layout;
pub use layout::page::{
    JitterBounds, LayoutGlyph, MissingGlyphPolicy, Page, PageConfig, Substitution, WrapMode,
};
pub use layout::selector::{GlyphSelector, Selection};
pub use library::glyph::{GlyphLibrary, GlyphSample, Stroke};
pub use library::normalize::{
    CleanOpts, NormalizeOpts, chaikin, clean_sample, clean_stroke, dedup_points, ideal_width,
    max_aspect, normalize_sample, remove_outliers, resample, simplify,
};
pub use library::store::{FsGlyphStore, GlyphStore, MemoryGlyphStore, validate_user_id};
pub use pipeline::compile::{
    BatchOpts, CompileRequest, CompiledJob, JobStats, compile_batch, compile_job,
};
pub use preview::svg::{render_png, render_svg};
pub use safeguard::gate::{
    ContentSafeguard, RequestIntent, SafeguardConfig, Verdict, levenshtein, normalize_text,
};
pub use transform::machine::{
    MachineConfig, MachineStroke, page_to_machine, strokes_bounds, transform,
};
