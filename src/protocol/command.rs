//! Command line parsing.
//!
//! Each line is one command, selected by its first non-blank character.

use crate::axis::AxisId;
use crate::config::units::Degrees;
use crate::error::ProtocolError;

/// What a bare uppercase `X` means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UppercaseX {
    /// `X` is caught by the pan stop command (`x`/`X`).
    #[default]
    StopsPan,
    /// `X` stops both axes; lowercase `x` still stops pan only.
    StopsBoth,
}

/// A parsed command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `V`: report the firmware version.
    Version,
    /// `M <pan> <tilt>`: relative move of both axes, in degrees.
    Move {
        /// Pan displacement.
        pan: Degrees,
        /// Tilt displacement.
        tilt: Degrees,
    },
    /// `Q`: busy query.
    Query,
    /// `1 2 4 8 6`: microstep resolution for both axes (`6` selects 16).
    Microstep(u16),
    /// `n` / `w`: one pulse in the jog direction.
    Step(AxisId),
    /// `c` / `p`: one output revolution in the jog direction.
    Revolution(AxisId),
    /// `r` / `t`: flip the jog direction.
    ToggleDirection(AxisId),
    /// `x` / `z`: decelerated stop of one axis.
    Stop(AxisId),
    /// `X` (when enabled): decelerated stop of both axes.
    StopAll,
    /// `+`: faster.
    SpeedUp,
    /// `-`: slower.
    SpeedDown,
    /// `d`: release both drivers.
    DisableDrivers,
    /// `e`: power both drivers.
    EnableDrivers,
}

impl Command {
    /// Parse one line.
    ///
    /// Returns `Ok(None)` for a blank line, which gets no reply at all.
    ///
    /// # Errors
    ///
    /// `ProtocolError::Syntax` when `M` lacks two numbers,
    /// `ProtocolError::Unknown` for any other trigger character.
    pub fn parse(line: &str, uppercase_x: UppercaseX) -> Result<Option<Self>, ProtocolError> {
        let line = line.trim();
        let Some(trigger) = line.chars().next() else {
            return Ok(None);
        };
        let args = &line[trigger.len_utf8()..];

        // Checked in table order; the first match wins
        let command = match trigger {
            'V' | 'v' => Command::Version,
            'M' | 'm' => {
                let (pan, rest) = scan_float(args).ok_or(ProtocolError::Syntax)?;
                let (tilt, _) = scan_float(rest).ok_or(ProtocolError::Syntax)?;
                Command::Move {
                    pan: Degrees(pan),
                    tilt: Degrees(tilt),
                }
            }
            'Q' | 'q' => Command::Query,
            '6' => Command::Microstep(16),
            '1' | '2' | '4' | '8' => Command::Microstep(u16::from(trigger as u8 - b'0')),

            'n' | 'N' => Command::Step(AxisId::Pan),
            'c' | 'C' => Command::Revolution(AxisId::Pan),
            'r' | 'R' => Command::ToggleDirection(AxisId::Pan),
            'X' if uppercase_x == UppercaseX::StopsBoth => Command::StopAll,
            'x' | 'X' => Command::Stop(AxisId::Pan),

            'w' | 'W' => Command::Step(AxisId::Tilt),
            'p' | 'P' => Command::Revolution(AxisId::Tilt),
            't' | 'T' => Command::ToggleDirection(AxisId::Tilt),
            'z' => Command::Stop(AxisId::Tilt),

            '+' => Command::SpeedUp,
            '-' => Command::SpeedDown,

            'd' | 'D' => Command::DisableDrivers,
            'e' | 'E' => Command::EnableDrivers,
            other => return Err(ProtocolError::Unknown(other)),
        };
        Ok(Some(command))
    }
}

/// Read a leading decimal number, skipping blanks before it.
///
/// Accepts `[+-]digits[.digits][(e|E)[+-]digits]`; whatever follows the number
/// is returned untouched, so `"10abc"` scans as `10`.
fn scan_float(input: &str) -> Option<(f32, &str)> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    let value = s[..end].parse::<f32>().ok()?;
    Some((value, &s[end..]))
}
