//! Simulated hardware for integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use embedded_hal_mock::eh1::delay::NoopDelay;

use turntable_motion::{
    AccelStepper, Clock, MicrostepSelect, ProtocolEngine, Reply, TurntableBuilder, TurntableConfig,
};

#[derive(Default)]
struct LineState {
    high: Cell<bool>,
    rising: Cell<u32>,
    writes: Cell<u32>,
    failing: Cell<bool>,
}

/// A digital output whose level can be inspected through any clone.
#[derive(Clone, Default)]
pub struct Line(Rc<LineState>);

impl Line {
    pub fn is_high(&self) -> bool {
        self.0.high.get()
    }

    pub fn rising_edges(&self) -> u32 {
        self.0.rising.get()
    }

    pub fn writes(&self) -> u32 {
        self.0.writes.get()
    }

    /// Make every later write fail.
    pub fn fail(&self, failing: bool) {
        self.0.failing.set(failing);
    }

    fn write(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.0.failing.get() {
            return Err(ErrorKind::Other);
        }
        if high && !self.0.high.get() {
            self.0.rising.set(self.0.rising.get() + 1);
        }
        self.0.high.set(high);
        self.0.writes.set(self.0.writes.get() + 1);
        Ok(())
    }
}

impl ErrorType for Line {
    type Error = ErrorKind;
}

impl OutputPin for Line {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

/// Manually advanced microsecond clock.
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    pub fn advance(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }
}

impl Clock for SimClock {
    fn now_us(&self) -> u64 {
        self.0.get()
    }
}

pub type Stepper = AccelStepper<Line, Line, NoopDelay, SimClock>;
pub type Select = MicrostepSelect<Line, Line, Line>;
pub type Engine = ProtocolEngine<Stepper, Line, Stepper, Line, Select>;

/// A booted turntable with recording pins on every line.
pub struct Rig {
    pub engine: Engine,
    pub clock: SimClock,
    pub pan_step: Line,
    pub tilt_step: Line,
    pub pan_enable: Line,
    pub tilt_enable: Line,
    pub ms: [Line; 3],
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(TurntableConfig::default())
    }

    pub fn with_config(config: TurntableConfig) -> Self {
        let clock = SimClock::default();
        let pan_step = Line::default();
        let tilt_step = Line::default();
        let pan_enable = Line::default();
        let tilt_enable = Line::default();
        let ms = [Line::default(), Line::default(), Line::default()];

        let engine = TurntableBuilder::new()
            .config(config)
            .pan_motion(AccelStepper::new(
                pan_step.clone(),
                Line::default(),
                NoopDelay::new(),
                clock.clone(),
            ))
            .pan_enable(pan_enable.clone())
            .tilt_motion(AccelStepper::new(
                tilt_step.clone(),
                Line::default(),
                NoopDelay::new(),
                clock.clone(),
            ))
            .tilt_enable(tilt_enable.clone())
            .microstep_select(MicrostepSelect::new(
                ms[0].clone(),
                ms[1].clone(),
                ms[2].clone(),
            ))
            .build_engine()
            .expect("rig should boot");

        Self {
            engine,
            clock,
            pan_step,
            tilt_step,
            pan_enable,
            tilt_enable,
            ms,
        }
    }

    /// Send one line and render the reply.
    pub fn send(&mut self, line: &str) -> Option<String> {
        self.engine.tick(Some(line)).map(|reply: Reply| reply.to_string())
    }

    /// Levels of MS1, MS2, MS3.
    pub fn ms_levels(&self) -> [bool; 3] {
        [self.ms[0].is_high(), self.ms[1].is_high(), self.ms[2].is_high()]
    }

    /// Poll with no input, 100 µs per cycle, until both axes are idle.
    pub fn run_until_idle(&mut self, max_cycles: u32) -> u32 {
        let mut cycles = 0;
        while self.engine.controller().is_running() {
            assert!(self.engine.tick(None).is_none());
            self.clock.advance(100);
            cycles += 1;
            assert!(cycles < max_cycles, "motion did not finish");
        }
        cycles
    }
}
