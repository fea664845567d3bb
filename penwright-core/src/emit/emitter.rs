use crate::{
    emit::command::{MachineCommand, validate_pen_states},
    foundation::{
        core::Point,
        error::{PenwrightError, PenwrightResult},
    },
    transform::machine::MachineStroke,
};

/// Feed rates and job ending.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    /// Pen-up feed rate (mm/min).
    pub feed_rate_travel: f64,
    /// Pen-down feed rate (mm/min).
    pub feed_rate_draw: f64,
    /// Travel back to the machine origin after the last stroke.
    pub return_to_origin: bool,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            feed_rate_travel: 3000.0,
            feed_rate_draw: 1000.0,
            return_to_origin: true,
        }
    }
}

impl MotionProfile {
    /// Both feed rates must be finite and positive.
    pub fn validate(&self) -> PenwrightResult<()> {
        for (name, v) in [
            ("feed_rate_travel", self.feed_rate_travel),
            ("feed_rate_draw", self.feed_rate_draw),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PenwrightError::invalid_config(format!(
                    "motion {name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }
}

struct Stream {
    out: Vec<MachineCommand>,
    feed: Option<f64>,
}

impl Stream {
    fn feed(&mut self, rate: f64) {
        if self.feed != Some(rate) {
            self.out.push(MachineCommand::SetFeedRate(rate));
            self.feed = Some(rate);
        }
    }

    fn push(&mut self, cmd: MachineCommand) {
        self.out.push(cmd);
    }
}

/// Turn machine strokes into a pen-state-safe command stream.
///
/// Layout: `Home`, a stroke-count comment and a `PenUp` reset; per stroke a travel to its first
/// point, `PenDown`, one `Draw` per remaining point and `PenUp`; then the return travel and a
/// terminal `PenUp`. Feed rates are only emitted when they change.
#[tracing::instrument(skip(strokes, profile), fields(strokes = strokes.len()))]
pub fn emit(
    strokes: &[MachineStroke],
    profile: &MotionProfile,
) -> PenwrightResult<Vec<MachineCommand>> {
    profile.validate()?;

    let points: usize = strokes.iter().map(|s| s.points.len()).sum();
    let mut s = Stream {
        out: Vec::with_capacity(points + strokes.len() * 4 + 8),
        feed: None,
    };
    s.push(MachineCommand::Home);
    s.push(MachineCommand::Comment(format!("strokes: {}", strokes.len())));
    s.push(MachineCommand::PenUp);

    for stroke in strokes {
        let Some((&first, rest)) = stroke.points.split_first() else {
            continue;
        };
        s.feed(profile.feed_rate_travel);
        s.push(MachineCommand::Travel(first));
        s.push(MachineCommand::PenDown);
        if !rest.is_empty() {
            s.feed(profile.feed_rate_draw);
            for &p in rest {
                s.push(MachineCommand::Draw(p));
            }
        }
        s.push(MachineCommand::PenUp);
    }

    if profile.return_to_origin {
        s.feed(profile.feed_rate_travel);
        s.push(MachineCommand::Travel(Point::ZERO));
    }
    s.push(MachineCommand::PenUp);

    validate_pen_states(&s.out)?;
    tracing::debug!(commands = s.out.len(), "emit complete");
    Ok(s.out)
}

#[cfg(test)]
#[path = "../../tests/unit/emit/emitter.rs"]
mod tests;
