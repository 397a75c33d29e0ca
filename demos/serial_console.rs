//! Serial console example.
//!
//! Runs the turntable command protocol over stdin/stdout, the same way the
//! firmware serves its serial port: motion is polled continuously and each
//! complete input line gets one reply line.
//!
//! Pins are simulated, so this runs without hardware. Pass a TOML file to
//! override the reference mechanics:
//!
//! ```text
//! cargo run --example serial_console -- turntable.toml
//! M 45 10
//! Q
//! ```

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use turntable_motion::{
    load_config, AccelStepper, MicrostepSelect, StdClock, TurntableBuilder, TurntableConfig,
};

/// Mock delay provider for demonstration.
struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        // In real code, this would use hardware timer
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

/// Mock output pin for demonstration.
struct MockPin;

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path).unwrap_or_else(|e| {
            eprintln!("{}: {}", path, e);
            std::process::exit(1);
        }),
        None => TurntableConfig::default(),
    };

    let clock = StdClock::new();
    let mut engine = TurntableBuilder::new()
        .config(config)
        .pan_motion(AccelStepper::new(MockPin, MockPin, MockDelay, clock))
        .pan_enable(MockPin)
        .tilt_motion(AccelStepper::new(MockPin, MockPin, MockDelay, clock))
        .tilt_enable(MockPin)
        .microstep_select(MicrostepSelect::new(MockPin, MockPin, MockPin))
        .build_engine()
        .expect("Failed to build turntable");

    println!("{}", engine.banner());

    // Reading stdin blocks, so lines arrive over a channel
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut input_open = true;
    loop {
        let line = match rx.try_recv() {
            Ok(line) => Some(line),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                input_open = false;
                None
            }
        };

        if let Some(reply) = engine.tick(line.as_deref()) {
            println!("{}", reply);
        }

        if !input_open && !engine.controller().is_running() {
            let ctl = engine.controller();
            println!(
                "pan {:.2} deg, tilt {:.2} deg",
                ctl.position_degrees(turntable_motion::AxisId::Pan).value(),
                ctl.position_degrees(turntable_motion::AxisId::Tilt).value()
            );
            break;
        }
        thread::sleep(Duration::from_micros(20));
    }
}
