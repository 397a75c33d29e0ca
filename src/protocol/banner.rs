//! Boot command summary.

use core::fmt;

/// Human-readable command list printed once at startup.
///
/// Informational only; clients must not parse it.
#[derive(Debug, Clone, Copy)]
pub struct Banner<'a> {
    version: &'a str,
}

impl<'a> Banner<'a> {
    /// Banner for the given firmware version.
    pub fn new(version: &'a str) -> Self {
        Self { version }
    }
}

const RULE: &str = "--------------------------------------------------";

const COMMANDS: &[(&str, &str)] = &[
    ("V", "firmware version"),
    ("M <pan> <tilt>", "move axes (deg), poll Q for DONE"),
    ("Q", "BUSY / DONE"),
    ("1 2 4 8 6", "set micro-step (6=16)"),
    ("n c r x", "step / rev / dir / stop pan"),
    ("w p t z", "step / rev / dir / stop tilt"),
    ("X", "stop both axes"),
    ("+ / -", "faster / slower"),
    ("d / e", "disable / enable drivers"),
];

impl fmt::Display for Banner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dual-axis turntable - firmware {}", self.version)?;
        writeln!(f, "{}", RULE)?;
        for (keys, help) in COMMANDS {
            writeln!(f, "  {:<26}: {}", keys, help)?;
        }
        f.write_str(RULE)
    }
}
