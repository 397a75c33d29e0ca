//! Line-oriented command engine.
//!
//! One poll cycle: advance both motion primitives, then, if a complete line is
//! available, parse it, execute it and produce at most one reply. Nothing on
//! the command path blocks on motion.

use embedded_hal::digital::OutputPin;
use heapless::String;

use crate::axis::{AxisId, DualAxisController, MicrostepLines};
use crate::config::ProtocolConfig;
use crate::error::Result;
use crate::motion::MotionPrimitive;

use super::banner::Banner;
use super::command::{Command, UppercaseX};
use super::reply::{AxisAction, Reply};

/// Command engine wrapping a [`DualAxisController`].
pub struct ProtocolEngine<PM, PEN, TM, TEN, SEL>
where
    PM: MotionPrimitive,
    PEN: OutputPin,
    TM: MotionPrimitive,
    TEN: OutputPin,
    SEL: MicrostepLines,
{
    controller: DualAxisController<PM, PEN, TM, TEN, SEL>,
    version: String<16>,
    uppercase_x: UppercaseX,
}

impl<PM, PEN, TM, TEN, SEL> ProtocolEngine<PM, PEN, TM, TEN, SEL>
where
    PM: MotionPrimitive,
    PEN: OutputPin,
    TM: MotionPrimitive,
    TEN: OutputPin,
    SEL: MicrostepLines,
{
    /// Wrap an already booted controller.
    pub fn new(controller: DualAxisController<PM, PEN, TM, TEN, SEL>, config: ProtocolConfig) -> Self {
        let uppercase_x = if config.uppercase_x_stops_both {
            UppercaseX::StopsBoth
        } else {
            UppercaseX::StopsPan
        };
        Self {
            controller,
            version: config.firmware_version,
            uppercase_x,
        }
    }

    /// Boot command summary.
    pub fn banner(&self) -> Banner<'_> {
        Banner::new(self.version.as_str())
    }

    /// Run one poll cycle.
    ///
    /// `line` is the next complete input line, if the transport has one.
    /// Returns the reply to send back; `None` when there was no line or the
    /// line was blank.
    pub fn tick(&mut self, line: Option<&str>) -> Option<Reply> {
        self.poll_motion();
        line.and_then(|line| self.handle_line(line))
    }

    /// Advance both axes once.
    ///
    /// A pin failure here has nobody to answer to; it is logged and the next
    /// cycle tries again.
    pub fn poll_motion(&mut self) -> bool {
        match self.controller.run() {
            Ok(running) => running,
            Err(_) => {
                warn!("step pulse failed");
                self.controller.is_running()
            }
        }
    }

    /// Parse and execute one line.
    pub fn handle_line(&mut self, line: &str) -> Option<Reply> {
        let reply = match Command::parse(line, self.uppercase_x) {
            Ok(None) => return None,
            Ok(Some(command)) => self.execute(command).unwrap_or_else(Reply::from),
            Err(e) => e.into(),
        };
        debug!("{} -> {}", line.trim(), reply);
        Some(reply)
    }

    /// Execute a parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error when an enable or select line cannot be driven.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let ctl = &mut self.controller;
        let reply = match command {
            Command::Version => Reply::Version(self.version.clone()),
            Command::Move { pan, tilt } => {
                ctl.move_both_by_degrees(pan, tilt)?;
                Reply::MoveAccepted
            }
            Command::Query => ctl.query_busy()?.into(),
            Command::Microstep(n) => {
                ctl.set_microstep_resolution(n)?;
                Reply::Microstep(n)
            }
            Command::Step(axis) => {
                ctl.step(axis);
                Reply::Axis(axis, AxisAction::Step)
            }
            Command::Revolution(axis) => {
                ctl.revolution(axis);
                Reply::Axis(axis, AxisAction::Revolution)
            }
            Command::ToggleDirection(axis) => {
                ctl.toggle_direction(axis);
                Reply::Axis(axis, AxisAction::Direction)
            }
            Command::Stop(axis) => {
                ctl.stop(axis);
                Reply::Axis(axis, AxisAction::Stop)
            }
            Command::StopAll => {
                ctl.stop_all();
                Reply::StopAll
            }
            Command::SpeedUp => {
                let factor = ctl.motion_config().speed_up_factor;
                ctl.scale_speed(factor);
                Reply::Speed
            }
            Command::SpeedDown => {
                let factor = ctl.motion_config().speed_down_factor;
                ctl.scale_speed(factor);
                Reply::Speed
            }
            Command::DisableDrivers => {
                ctl.disable_all()?;
                Reply::DriversOff
            }
            Command::EnableDrivers => {
                ctl.enable_all()?;
                Reply::DriversOn
            }
        };
        Ok(reply)
    }

    /// Jog direction of an axis.
    pub fn direction(&self, axis: AxisId) -> crate::motion::Direction {
        self.controller.direction(axis)
    }

    /// Borrow the controller.
    pub fn controller(&self) -> &DualAxisController<PM, PEN, TM, TEN, SEL> {
        &self.controller
    }

    /// Borrow the controller mutably.
    pub fn controller_mut(&mut self) -> &mut DualAxisController<PM, PEN, TM, TEN, SEL> {
        &mut self.controller
    }

    /// Unwrap the controller.
    pub fn into_inner(self) -> DualAxisController<PM, PEN, TM, TEN, SEL> {
        self.controller
    }
}
