use crate::foundation::{
    core::Point,
    error::{PenwrightError, PenwrightResult},
};

/// One instruction for the downstream motion controller.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum MachineCommand {
    /// Pen-up move to a machine point.
    Travel(Point),
    /// Pen-down move to a machine point.
    Draw(Point),
    /// Lift the pen.
    PenUp,
    /// Lower the pen.
    PenDown,
    /// Feed rate in mm/min for subsequent moves.
    SetFeedRate(f64),
    /// Run the homing cycle.
    Home,
    /// Free-form annotation; ignored by the pen state machine.
    Comment(String),
}

impl MachineCommand {
    /// Target point of a move, if any.
    pub fn target(&self) -> Option<Point> {
        match self {
            Self::Travel(p) | Self::Draw(p) => Some(*p),
            _ => None,
        }
    }
}

/// Pen position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PenState {
    /// Lifted; travel allowed.
    #[default]
    Up,
    /// Touching the paper; draw allowed.
    Down,
}

/// Check the pen state machine over a full stream.
///
/// The first non-comment command must be `Home`; moves and homing are only valid in the state
/// that allows them; the stream must end with the pen up. A `PenUp` while up is a legal reset.
pub fn validate_pen_states(commands: &[MachineCommand]) -> PenwrightResult<()> {
    let mut pen = PenState::Up;
    let mut homed = false;

    for (i, cmd) in commands.iter().enumerate() {
        if matches!(cmd, MachineCommand::Comment(_)) {
            continue;
        }
        if !homed && *cmd != MachineCommand::Home {
            return Err(PenwrightError::pen_state(format!(
                "command {i} ({cmd:?}) precedes Home"
            )));
        }
        match (cmd, pen) {
            (MachineCommand::Home, PenState::Up) => homed = true,
            (MachineCommand::PenUp, _) => pen = PenState::Up,
            (MachineCommand::PenDown, PenState::Up) => pen = PenState::Down,
            (MachineCommand::Travel(_), PenState::Up) => {}
            (MachineCommand::Draw(_), PenState::Down) => {}
            (MachineCommand::SetFeedRate(f), _) if f.is_finite() && *f > 0.0 => {}
            (MachineCommand::SetFeedRate(f), _) => {
                return Err(PenwrightError::pen_state(format!(
                    "command {i} sets invalid feed rate {f}"
                )));
            }
            (cmd, pen) => {
                return Err(PenwrightError::pen_state(format!(
                    "command {i} ({cmd:?}) not allowed while pen is {pen:?}"
                )));
            }
        }
    }

    if pen != PenState::Up {
        return Err(PenwrightError::pen_state("stream ends with the pen down"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/emit/command.rs"]
mod tests;
