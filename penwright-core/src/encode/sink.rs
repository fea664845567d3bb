use std::io::Write;

use anyhow::Context;

use crate::{
    emit::command::{MachineCommand, validate_pen_states},
    encode::gcode::GcodeDialect,
    foundation::error::PenwrightResult,
};

/// Configuration provided to a [`CommandSink`] before the first command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Number of commands that will be pushed.
    pub command_count: usize,
    /// Optional job label, e.g. for a header comment.
    pub label: Option<String>,
}

/// Consumer of a complete motion command stream.
///
/// Ordering contract: `push` is called once per command in stream order, between one `begin` and
/// one `end`. Sinks only ever see streams that passed [`validate_pen_states`].
pub trait CommandSink: Send {
    /// Called once before any command is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> PenwrightResult<()>;
    /// Push one command.
    fn push(&mut self, cmd: &MachineCommand) -> PenwrightResult<()>;
    /// Called once after the last command.
    fn end(&mut self) -> PenwrightResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    commands: Vec<MachineCommand>,
    finished: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured commands.
    pub fn commands(&self) -> &[MachineCommand] {
        &self.commands
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl CommandSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PenwrightResult<()> {
        self.commands.clear();
        self.commands.reserve(cfg.command_count);
        self.cfg = Some(cfg);
        self.finished = false;
        Ok(())
    }

    fn push(&mut self, cmd: &MachineCommand) -> PenwrightResult<()> {
        self.commands.push(cmd.clone());
        Ok(())
    }

    fn end(&mut self) -> PenwrightResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes G-code text, one command per line, to any writer.
#[derive(Debug)]
pub struct GcodeWriterSink<W: Write + Send> {
    writer: W,
    dialect: GcodeDialect,
}

impl<W: Write + Send> GcodeWriterSink<W> {
    /// Write programs in `dialect` to `writer`.
    pub fn new(writer: W, dialect: GcodeDialect) -> Self {
        Self { writer, dialect }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, line: &str) -> PenwrightResult<()> {
        writeln!(self.writer, "{line}").context("write motion code line")?;
        Ok(())
    }
}

impl<W: Write + Send> CommandSink for GcodeWriterSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> PenwrightResult<()> {
        self.dialect.validate()?;
        if let Some(label) = &cfg.label {
            let header = self
                .dialect
                .encode_command(&MachineCommand::Comment(label.clone()));
            self.line(&header)?;
        }
        for l in self.dialect.preamble() {
            self.line(l)?;
        }
        Ok(())
    }

    fn push(&mut self, cmd: &MachineCommand) -> PenwrightResult<()> {
        let text = self.dialect.encode_command(cmd);
        self.line(&text)
    }

    fn end(&mut self) -> PenwrightResult<()> {
        for l in self.dialect.epilogue() {
            self.line(l)?;
        }
        self.writer.flush().context("flush motion code")?;
        Ok(())
    }
}

/// Hand a full stream to `sink`. Invalid streams are refused before `begin`.
pub fn stream_commands(
    commands: &[MachineCommand],
    sink: &mut dyn CommandSink,
    label: Option<&str>,
) -> PenwrightResult<()> {
    validate_pen_states(commands)?;
    sink.begin(SinkConfig {
        command_count: commands.len(),
        label: label.map(str::to_string),
    })?;
    for cmd in commands {
        sink.push(cmd)?;
    }
    sink.end()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
