//! Textual G-code for GRBL-style pen plotters.

use crate::{
    emit::command::{MachineCommand, PenState},
    encode::sink::{GcodeWriterSink, stream_commands},
    foundation::{
        core::Point,
        error::{PenwrightError, PenwrightResult},
    },
};

/// How the pen is raised and lowered.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenCodes {
    /// Servo driven from the spindle PWM: `M3 S<power>` / `M5`.
    Spindle {
        /// PWM value for pen down.
        power: u32,
    },
    /// Pen on the Z axis: `G0 Z<up>` / `G1 Z<down>`.
    ZAxis {
        /// Z height with the pen lifted.
        up: f64,
        /// Z height with the pen on paper.
        down: f64,
    },
}

/// Homing instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeCode {
    /// GRBL homing cycle, `$H`.
    #[default]
    Grbl,
    /// `G28`.
    G28,
}

/// Text rendering options for [`MachineCommand`] streams.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GcodeDialect {
    /// Pen actuation codes.
    pub pen: PenCodes,
    /// Homing code.
    pub home: HomeCode,
    /// Travel with `G0` rather than `G1`.
    pub rapid_travel: bool,
    /// Decimal places for coordinates.
    pub decimals: usize,
    /// Close the program with `M2`.
    pub program_end: bool,
}

impl Default for GcodeDialect {
    fn default() -> Self {
        Self {
            pen: PenCodes::Spindle { power: 500 },
            home: HomeCode::Grbl,
            rapid_travel: true,
            decimals: 3,
            program_end: true,
        }
    }
}

impl GcodeDialect {
    /// Reject dialects whose output could not be read back unambiguously.
    ///
    /// Z heights are compared as printed, so two values that round to the same text are refused.
    pub fn validate(&self) -> PenwrightResult<()> {
        if self.decimals > 6 {
            return Err(PenwrightError::invalid_config("gcode decimals must be <= 6"));
        }
        if let PenCodes::ZAxis { up, down } = self.pen {
            if !up.is_finite() || !down.is_finite() {
                return Err(PenwrightError::invalid_config(
                    "gcode z_axis up/down must be finite",
                ));
            }
            if self.num(up) == self.num(down) {
                return Err(PenwrightError::invalid_config(format!(
                    "gcode z_axis up/down both print as Z{} at {} decimals",
                    self.num(up),
                    self.decimals
                )));
            }
        }
        Ok(())
    }

    /// Lines written before the first command: millimetres, absolute positioning.
    pub fn preamble(&self) -> &'static [&'static str] {
        &["G21", "G90"]
    }

    /// Lines written after the last command.
    pub fn epilogue(&self) -> &'static [&'static str] {
        if self.program_end { &["M2"] } else { &[] }
    }

    /// One command as one line, without the terminator.
    pub fn encode_command(&self, cmd: &MachineCommand) -> String {
        match cmd {
            MachineCommand::Home => match self.home {
                HomeCode::Grbl => "$H".to_string(),
                HomeCode::G28 => "G28".to_string(),
            },
            MachineCommand::PenUp => match self.pen {
                PenCodes::Spindle { .. } => "M5".to_string(),
                PenCodes::ZAxis { up, .. } => format!("G0 Z{}", self.num(up)),
            },
            MachineCommand::PenDown => match self.pen {
                PenCodes::Spindle { power } => format!("M3 S{power}"),
                PenCodes::ZAxis { down, .. } => format!("G1 Z{}", self.num(down)),
            },
            MachineCommand::Travel(p) => {
                let g = if self.rapid_travel { "G0" } else { "G1" };
                format!("{g} {}", self.xy(*p))
            }
            MachineCommand::Draw(p) => format!("G1 {}", self.xy(*p)),
            MachineCommand::SetFeedRate(f) => format!("G1 F{}", trim_number(&self.num(*f))),
            MachineCommand::Comment(text) => {
                let flat: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                format!("; {flat}")
            }
        }
    }

    fn xy(&self, p: Point) -> String {
        format!("X{} Y{}", self.num(p.x), self.num(p.y))
    }

    fn num(&self, v: f64) -> String {
        let s = format!("{v:.prec$}", prec = self.decimals);
        match s.strip_prefix('-') {
            Some(abs) if abs.chars().all(|c| c == '0' || c == '.') => abs.to_string(),
            _ => s,
        }
    }
}

fn trim_number(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Parse G-code written by [`GcodeDialect::encode_command`] back into commands.
///
/// Preamble and epilogue lines are skipped. Comment text after the `; ` prefix is kept verbatim. `G1` moves decode as `Draw` while the pen is down and
/// as `Travel` otherwise.
pub fn decode_gcode(text: &str, dialect: &GcodeDialect) -> PenwrightResult<Vec<MachineCommand>> {
    let mut out = Vec::new();
    let mut pen = PenState::Up;

    for (n, raw) in text.lines().enumerate() {
        let line_no = n + 1;
        if let Some(c) = raw.trim_start().strip_prefix(';') {
            out.push(MachineCommand::Comment(
                c.strip_prefix(' ').unwrap_or(c).to_string(),
            ));
            continue;
        }
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let code = line.split([';', '(']).next().unwrap_or_default().trim();
        let mut words = code.split_whitespace();
        let Some(head) = words.next() else {
            continue;
        };
        let head = head.to_ascii_uppercase();
        let args = parse_words(words, line_no)?;

        let cmd = match head.as_str() {
            "G21" | "G90" | "M2" | "M30" => continue,
            "$H" | "G28" => MachineCommand::Home,
            "M5" => MachineCommand::PenUp,
            "M3" | "M4" => MachineCommand::PenDown,
            "G0" | "G00" | "G1" | "G01" => {
                let rapid = matches!(head.as_str(), "G0" | "G00");
                match decode_move(&args, rapid, pen, dialect, line_no)? {
                    Decoded::One(cmd) => cmd,
                    Decoded::FeedThen(f, cmd) => {
                        out.push(MachineCommand::SetFeedRate(f));
                        cmd
                    }
                }
            }
            _ => {
                return Err(PenwrightError::encoding(format!(
                    "line {line_no}: unsupported command '{line}'"
                )));
            }
        };
        match cmd {
            MachineCommand::PenDown => pen = PenState::Down,
            MachineCommand::PenUp => pen = PenState::Up,
            _ => {}
        }
        out.push(cmd);
    }
    Ok(out)
}

#[derive(Default)]
struct Words {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    f: Option<f64>,
}

enum Decoded {
    One(MachineCommand),
    FeedThen(f64, MachineCommand),
}

fn parse_words<'a>(words: impl Iterator<Item = &'a str>, line_no: usize) -> PenwrightResult<Words> {
    let mut w = Words::default();
    for word in words {
        let mut chars = word.chars();
        let Some(letter) = chars.next() else {
            continue;
        };
        let value: f64 = chars.as_str().parse().map_err(|_| {
            PenwrightError::encoding(format!("line {line_no}: bad number in '{word}'"))
        })?;
        let slot = match letter.to_ascii_uppercase() {
            'X' => &mut w.x,
            'Y' => &mut w.y,
            'Z' => &mut w.z,
            'F' => &mut w.f,
            // Spindle power and similar parameters carry no motion.
            'S' | 'P' => continue,
            other => {
                return Err(PenwrightError::encoding(format!(
                    "line {line_no}: unsupported word '{other}'"
                )));
            }
        };
        *slot = Some(value);
    }
    Ok(w)
}

fn decode_move(
    w: &Words,
    rapid: bool,
    pen: PenState,
    dialect: &GcodeDialect,
    line_no: usize,
) -> PenwrightResult<Decoded> {
    let cmd = match (w.x, w.y, w.z) {
        (Some(x), Some(y), None) => {
            let p = Point::new(x, y);
            if !rapid && pen == PenState::Down {
                MachineCommand::Draw(p)
            } else {
                MachineCommand::Travel(p)
            }
        }
        (None, None, Some(z)) => match dialect.pen {
            PenCodes::ZAxis { up, down } => {
                if (z - up).abs() <= (z - down).abs() {
                    MachineCommand::PenUp
                } else {
                    MachineCommand::PenDown
                }
            }
            PenCodes::Spindle { .. } => {
                return Err(PenwrightError::encoding(format!(
                    "line {line_no}: Z move in a spindle pen dialect"
                )));
            }
        },
        (None, None, None) => match w.f {
            Some(f) => return Ok(Decoded::One(MachineCommand::SetFeedRate(f))),
            None => {
                return Err(PenwrightError::encoding(format!(
                    "line {line_no}: move without coordinates"
                )));
            }
        },
        _ => {
            return Err(PenwrightError::encoding(format!(
                "line {line_no}: move needs X and Y, or Z alone"
            )));
        }
    };
    Ok(match w.f {
        Some(f) => Decoded::FeedThen(f, cmd),
        None => Decoded::One(cmd),
    })
}

/// Full program text for a validated stream.
pub fn encode_gcode(commands: &[MachineCommand], dialect: &GcodeDialect) -> PenwrightResult<String> {
    let mut sink = GcodeWriterSink::new(Vec::new(), dialect.clone());
    stream_commands(commands, &mut sink, None)?;
    String::from_utf8(sink.into_inner())
        .map_err(|e| PenwrightError::encoding(format!("motion code is not utf-8: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gcode.rs"]
mod tests;
