use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    emit::emitter::MotionProfile,
    encode::gcode::GcodeDialect,
    foundation::error::{PenwrightError, PenwrightResult},
    layout::page::PageConfig,
    safeguard::gate::SafeguardConfig,
    transform::machine::MachineConfig,
};

/// Everything a compilation needs besides the text and the glyph library.
///
/// Every group falls back to its defaults, so `{}` is a valid job file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Page geometry, wrapping and jitter.
    pub page: PageConfig,
    /// Plotter travel and sheet placement.
    pub machine: MachineConfig,
    /// Feed rates.
    pub motion: MotionProfile,
    /// Deny-list settings.
    pub safeguard: SafeguardConfig,
    /// Output text format.
    pub gcode: GcodeDialect,
    /// Seed for variant selection and jitter.
    pub seed: u64,
}

impl JobConfig {
    /// Parse a job config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PenwrightResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| PenwrightError::serde(format!("parse job config JSON: {e}")))
    }

    /// Parse a job config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PenwrightResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open job config '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every group; runs before layout starts.
    pub fn validate(&self) -> PenwrightResult<()> {
        self.page.validate()?;
        self.machine.validate()?;
        self.motion.validate()?;
        self.gcode.validate()?;

        let printable = self.page.width - 2.0 * self.page.margin;
        if printable < self.page.space_width {
            return Err(PenwrightError::invalid_config(
                "page margin leaves no printable width",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/job.rs"]
mod tests;
