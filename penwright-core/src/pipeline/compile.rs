use rayon::prelude::*;

use crate::{
    config::job::JobConfig,
    emit::{command::MachineCommand, emitter::emit},
    encode::{
        gcode::{GcodeDialect, encode_gcode},
        sink::{CommandSink, stream_commands},
    },
    foundation::{
        core::Point,
        error::{PenwrightError, PenwrightResult},
    },
    layout::{engine::layout, page::Substitution},
    library::store::GlyphStore,
    safeguard::gate::{ContentSafeguard, RequestIntent, Verdict},
    transform::machine::{MachineStroke, transform},
};

/// One text to write in one user's hand.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompileRequest {
    /// Text to render.
    pub text: String,
    /// Owner of the glyph library.
    pub user_id: String,
    /// Caller-declared purpose.
    #[serde(default)]
    pub intent: RequestIntent,
}

impl CompileRequest {
    /// Plain text request.
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: user_id.into(),
            intent: RequestIntent::Text,
        }
    }

    /// Declare what the request is for.
    pub fn with_intent(mut self, intent: RequestIntent) -> Self {
        self.intent = intent;
        self
    }
}

/// Summary numbers for a compiled job.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct JobStats {
    /// Pen-down strokes.
    pub strokes: usize,
    /// Placed glyphs.
    pub glyphs: usize,
    /// Lines holding at least one glyph.
    pub lines: usize,
    /// Commands in the stream.
    pub commands: usize,
    /// Pen-down path length.
    pub draw_length_mm: f64,
    /// Pen-up path length, including the return travel.
    pub travel_length_mm: f64,
    /// Move time at the programmed feed rates; ignores acceleration and pen actuation.
    pub estimated_seconds: f64,
}

/// A complete, pen-state-safe motion program.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledJob {
    /// Library owner.
    pub user_id: String,
    /// Validated command stream.
    pub commands: Vec<MachineCommand>,
    /// Machine-space strokes the stream was emitted from.
    pub strokes: Vec<MachineStroke>,
    /// Characters drawn with a placeholder or skipped.
    pub substitutions: Vec<Substitution>,
    /// Summary numbers.
    pub stats: JobStats,
}

impl CompiledJob {
    /// Render the stream as G-code text.
    pub fn to_gcode(&self, dialect: &GcodeDialect) -> PenwrightResult<String> {
        encode_gcode(&self.commands, dialect)
    }

    /// Hand the stream to a sink.
    pub fn write_to(&self, sink: &mut dyn CommandSink, label: Option<&str>) -> PenwrightResult<()> {
        stream_commands(&self.commands, sink, label)
    }
}

/// Run the whole pipeline for one request.
///
/// Every failure happens before a stream exists; a returned job is always complete.
#[tracing::instrument(skip(request, store, config), fields(user = %request.user_id, intent = ?request.intent))]
pub fn compile_job(
    request: &CompileRequest,
    store: &dyn GlyphStore,
    config: &JobConfig,
) -> PenwrightResult<CompiledJob> {
    config.validate()?;
    let library = store.load(&request.user_id)?;

    let gate = ContentSafeguard::new(&config.safeguard).with_labels(library.signatures());
    if let Verdict::Reject(reason) = gate.check(&request.text, request.intent) {
        tracing::info!(%reason, "request rejected by content safeguard");
        return Err(PenwrightError::content_rejected(reason));
    }

    let page = layout(&request.text, &library, &config.page, config.seed)?;
    let strokes = transform(&page, &config.machine)?;
    let commands = emit(&strokes, &config.motion)?;

    let (draw_length_mm, travel_length_mm, estimated_seconds) =
        measure(&commands, config.motion.feed_rate_travel);
    let stats = JobStats {
        strokes: strokes.len(),
        glyphs: page.glyphs.len(),
        lines: page.lines,
        commands: commands.len(),
        draw_length_mm,
        travel_length_mm,
        estimated_seconds,
    };
    tracing::debug!(?stats, "job compiled");

    Ok(CompiledJob {
        user_id: request.user_id.clone(),
        commands,
        strokes,
        substitutions: page.substitutions,
        stats,
    })
}

/// Options for [`compile_batch`].
#[derive(Clone, Debug, Default)]
pub struct BatchOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Compile independent requests in parallel; results keep request order.
///
/// Jobs share the store read-only. One failing job does not affect the others.
pub fn compile_batch(
    requests: &[CompileRequest],
    store: &dyn GlyphStore,
    config: &JobConfig,
    opts: &BatchOpts,
) -> PenwrightResult<Vec<PenwrightResult<CompiledJob>>> {
    let pool = build_thread_pool(opts.threads)?;
    Ok(pool.install(|| {
        requests
            .par_iter()
            .map(|r| compile_job(r, store, config))
            .collect()
    }))
}

fn build_thread_pool(threads: Option<usize>) -> PenwrightResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PenwrightError::invalid_config(
            "batch 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PenwrightError::invalid_config(format!("failed to build rayon thread pool: {e}")))
}

/// Draw length, travel length and duration of a stream starting at the machine origin.
fn measure(commands: &[MachineCommand], default_feed: f64) -> (f64, f64, f64) {
    let mut pos = Point::ZERO;
    let mut feed = default_feed;
    let (mut draw, mut travel, mut minutes) = (0.0, 0.0, 0.0);
    for cmd in commands {
        match cmd {
            MachineCommand::SetFeedRate(f) => feed = *f,
            MachineCommand::Home => pos = Point::ZERO,
            MachineCommand::Travel(p) | MachineCommand::Draw(p) => {
                let d = (*p - pos).hypot();
                if matches!(cmd, MachineCommand::Draw(_)) {
                    draw += d;
                } else {
                    travel += d;
                }
                minutes += d / feed;
                pos = *p;
            }
            _ => {}
        }
    }
    (draw, travel, minutes * 60.0)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/compile.rs"]
mod tests;
