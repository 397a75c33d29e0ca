//! Reply lines.
//!
//! Rendered with `Display` on the device side and read back with `FromStr` on
//! the host side.

use core::fmt;
use core::str::FromStr;

use heapless::String;

use crate::axis::{Activity, AxisId};
use crate::error::{Error, ProtocolError};

/// Per-axis action acknowledged by a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisAction {
    /// One pulse queued.
    Step,
    /// One output revolution queued.
    Revolution,
    /// Jog direction flipped.
    Direction,
    /// Decelerated stop requested.
    Stop,
}

/// One reply line. `Display` renders the exact wire text, without the line
/// terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `VERSION <semver>`
    Version(String<16>),
    /// `OK M`
    MoveAccepted,
    /// `BUSY`
    Busy,
    /// `DONE`
    Done,
    /// `OK MICROSTEP <n>`, echoing the requested value.
    Microstep(u16),
    /// `OK ROT ...` / `OK TILT ...`
    Axis(AxisId, AxisAction),
    /// `OK STOP`
    StopAll,
    /// `OK SPEED`
    Speed,
    /// `OK DRIVERS OFF`
    DriversOff,
    /// `OK DRIVERS ON`
    DriversOn,
    /// `ERR Syntax`
    SyntaxError,
    /// `ERR Unknown`
    Unknown,
    /// `ERR Driver`: a control line could not be driven.
    DriverFault,
}

impl Reply {
    /// Whether this is an `ERR` line.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::SyntaxError | Reply::Unknown | Reply::DriverFault)
    }
}

impl From<Activity> for Reply {
    fn from(activity: Activity) -> Self {
        match activity {
            Activity::Busy => Reply::Busy,
            Activity::Done => Reply::Done,
        }
    }
}

impl From<ProtocolError> for Reply {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Syntax => Reply::SyntaxError,
            ProtocolError::Unknown(_) => Reply::Unknown,
        }
    }
}

impl From<Error> for Reply {
    fn from(err: Error) -> Self {
        match err {
            Error::Protocol(e) => e.into(),
            Error::Motor(_) | Error::Config(_) => Reply::DriverFault,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Version(v) => write!(f, "VERSION {}", v),
            Reply::MoveAccepted => f.write_str("OK M"),
            Reply::Busy => f.write_str("BUSY"),
            Reply::Done => f.write_str("DONE"),
            Reply::Microstep(n) => write!(f, "OK MICROSTEP {}", n),
            Reply::Axis(axis, action) => {
                let axis = match axis {
                    AxisId::Pan => "ROT",
                    AxisId::Tilt => "TILT",
                };
                let action = match action {
                    AxisAction::Step => "STEP",
                    AxisAction::Revolution => "REV",
                    AxisAction::Direction => "DIR",
                    AxisAction::Stop => "STOP",
                };
                write!(f, "OK {} {}", axis, action)
            }
            Reply::StopAll => f.write_str("OK STOP"),
            Reply::Speed => f.write_str("OK SPEED"),
            Reply::DriversOff => f.write_str("OK DRIVERS OFF"),
            Reply::DriversOn => f.write_str("OK DRIVERS ON"),
            Reply::SyntaxError => f.write_str("ERR Syntax"),
            Reply::Unknown => f.write_str("ERR Unknown"),
            Reply::DriverFault => f.write_str("ERR Driver"),
        }
    }
}

/// Match `word` against a keyword table, ignoring ASCII case.
fn keyword<T: Clone>(word: Option<&str>, table: &[(&str, T)]) -> Option<T> {
    let word = word?;
    table
        .iter()
        .find(|(name, _)| word.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.clone())
}

impl FromStr for Reply {
    type Err = ProtocolError;

    /// Parse one reply line.
    ///
    /// Keywords are matched without regard to ASCII case and may be separated
    /// by any whitespace; a trailing `\r` is tolerated. Lines outside the
    /// reply vocabulary, or with extra words, are `ProtocolError::Syntax`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        #[derive(Clone, Copy)]
        enum Head {
            Version,
            Busy,
            Done,
            Ok,
            Err,
        }

        let mut words = line.split_whitespace();
        let head = keyword(
            words.next(),
            &[
                ("VERSION", Head::Version),
                ("BUSY", Head::Busy),
                ("DONE", Head::Done),
                ("OK", Head::Ok),
                ("ERR", Head::Err),
            ],
        )
        .ok_or(ProtocolError::Syntax)?;

        let reply = match head {
            Head::Version => {
                let version = words.next().ok_or(ProtocolError::Syntax)?;
                Reply::Version(String::try_from(version).map_err(|_| ProtocolError::Syntax)?)
            }
            Head::Busy => Reply::Busy,
            Head::Done => Reply::Done,
            Head::Err => keyword(
                words.next(),
                &[
                    ("Syntax", Reply::SyntaxError),
                    ("Unknown", Reply::Unknown),
                    ("Driver", Reply::DriverFault),
                ],
            )
            .ok_or(ProtocolError::Syntax)?,
            Head::Ok => parse_ok(&mut words)?,
        };

        if words.next().is_some() {
            return Err(ProtocolError::Syntax);
        }
        Ok(reply)
    }
}

/// Words after `OK`.
fn parse_ok<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Reply, ProtocolError> {
    #[derive(Clone, Copy)]
    enum Subject {
        Move,
        Microstep,
        Axis(AxisId),
        Stop,
        Speed,
        Drivers,
    }

    let subject = keyword(
        words.next(),
        &[
            ("M", Subject::Move),
            ("MICROSTEP", Subject::Microstep),
            ("ROT", Subject::Axis(AxisId::Pan)),
            ("TILT", Subject::Axis(AxisId::Tilt)),
            ("STOP", Subject::Stop),
            ("SPEED", Subject::Speed),
            ("DRIVERS", Subject::Drivers),
        ],
    )
    .ok_or(ProtocolError::Syntax)?;

    let reply = match subject {
        Subject::Move => Reply::MoveAccepted,
        Subject::Stop => Reply::StopAll,
        Subject::Speed => Reply::Speed,
        Subject::Microstep => {
            let value = words.next().ok_or(ProtocolError::Syntax)?;
            Reply::Microstep(value.parse().map_err(|_| ProtocolError::Syntax)?)
        }
        Subject::Axis(axis) => {
            let action = keyword(
                words.next(),
                &[
                    ("STEP", AxisAction::Step),
                    ("REV", AxisAction::Revolution),
                    ("DIR", AxisAction::Direction),
                    ("STOP", AxisAction::Stop),
                ],
            )
            .ok_or(ProtocolError::Syntax)?;
            Reply::Axis(axis, action)
        }
        Subject::Drivers => keyword(
            words.next(),
            &[("OFF", Reply::DriversOff), ("ON", Reply::DriversOn)],
        )
        .ok_or(ProtocolError::Syntax)?,
    };
    Ok(reply)
}

#[cfg(feature = "defmt")]
impl defmt::Format for Reply {
    fn format(&self, f: defmt::Formatter) {
        let mut line = String::<32>::new();
        let _ = core::fmt::write(&mut line, format_args!("{}", self));
        defmt::write!(f, "{=str}", line.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MotorError;

    fn text(reply: Reply) -> std::string::String {
        std::format!("{}", reply)
    }

    #[test]
    fn test_wire_text() {
        assert_eq!(text(Reply::Version(String::try_from("1.0.1").unwrap())), "VERSION 1.0.1");
        assert_eq!(text(Reply::MoveAccepted), "OK M");
        assert_eq!(text(Reply::Microstep(16)), "OK MICROSTEP 16");
        assert_eq!(text(Reply::Axis(AxisId::Pan, AxisAction::Revolution)), "OK ROT REV");
        assert_eq!(text(Reply::Axis(AxisId::Tilt, AxisAction::Stop)), "OK TILT STOP");
        assert_eq!(text(Reply::DriversOff), "OK DRIVERS OFF");
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(Reply::from(ProtocolError::Syntax), Reply::SyntaxError);
        assert_eq!(Reply::from(ProtocolError::Unknown('?')), Reply::Unknown);
        assert_eq!(Reply::from(Error::Motor(MotorError::PinError)), Reply::DriverFault);
        assert_eq!(text(Reply::DriverFault), "ERR Driver");
        assert!(Reply::Unknown.is_error());
        assert!(!Reply::Done.is_error());
    }

    #[test]
    fn test_wire_text_reads_back() {
        let replies = [
            Reply::Version(String::try_from("1.0.1").unwrap()),
            Reply::MoveAccepted,
            Reply::Busy,
            Reply::Done,
            Reply::Microstep(8),
            Reply::Axis(AxisId::Pan, AxisAction::Step),
            Reply::Axis(AxisId::Tilt, AxisAction::Direction),
            Reply::StopAll,
            Reply::Speed,
            Reply::DriversOn,
            Reply::SyntaxError,
            Reply::DriverFault,
        ];
        for reply in replies {
            assert_eq!(text(reply.clone()).parse::<Reply>(), Ok(reply));
        }
    }

    #[test]
    fn test_parse_is_lenient_on_case_and_spacing() {
        assert_eq!("done\r".parse::<Reply>(), Ok(Reply::Done));
        assert_eq!(
            "  ok   rot  rev ".parse::<Reply>(),
            Ok(Reply::Axis(AxisId::Pan, AxisAction::Revolution))
        );
        assert_eq!("Err unknown".parse::<Reply>(), Ok(Reply::Unknown));
        assert_eq!("OK drivers off".parse::<Reply>(), Ok(Reply::DriversOff));
    }

    #[test]
    fn test_parse_rejects_foreign_lines() {
        for line in [
            "",
            "Dual-axis turntable - firmware 1.0.1",
            "OK",
            "OK ROT",
            "OK MICROSTEP six",
            "ERR Whatever",
            "VERSION",
            "VERSION 1.0.1-very-long-build-tag",
            "BUSY now",
            "DONEX",
        ] {
            assert_eq!(line.parse::<Reply>(), Err(ProtocolError::Syntax), "{:?}", line);
        }
    }
}
