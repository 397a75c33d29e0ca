//! Property tests for the conversion and command invariants.

use proptest::prelude::*;

use crate::support::Rig;
use turntable_motion::protocol::{Command, UppercaseX};
use turntable_motion::{AxisConfig, AxisId, Degrees, Microsteps, Pulses, TurntableConfig};

fn microstep_trigger(value: u16) -> &'static str {
    match value {
        1 => "1",
        2 => "2",
        4 => "4",
        8 => "8",
        _ => "6",
    }
}

fn axis() -> impl Strategy<Value = AxisId> {
    prop_oneof![Just(AxisId::Pan), Just(AxisId::Tilt)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_steps_ignore_microstepping(
        base in 10u32..1_000,
        gear in 0.1f32..100.0,
        order in Just(Microsteps::VALID_VALUES.to_vec()).prop_shuffle(),
    ) {
        let mut config = TurntableConfig::default();
        config.tilt = AxisConfig::new("tilt", base, gear);
        let expected = config.tilt.output_steps_per_revolution();
        let mut rig = Rig::with_config(config);

        for value in order {
            rig.send(microstep_trigger(value));
            let ctl = rig.engine.controller();
            prop_assert_eq!(ctl.tilt().output_steps_per_rotation(), expected);
            prop_assert_eq!(
                ctl.degrees_to_pulses(AxisId::Tilt, Degrees(360.0)),
                Ok(Pulses(expected * i64::from(value)))
            );
        }
    }

    #[test]
    fn conversion_is_odd(degrees in -720.0f32..720.0, axis in axis()) {
        let rig = Rig::new();
        let ctl = rig.engine.controller();
        let forward = ctl.degrees_to_pulses(axis, Degrees(degrees)).unwrap();
        let backward = ctl.degrees_to_pulses(axis, Degrees(-degrees)).unwrap();
        prop_assert_eq!(backward, -forward);
    }

    #[test]
    fn speed_ratio_survives_adjustments(ops in proptest::collection::vec(any::<bool>(), 0..20)) {
        let mut rig = Rig::new();
        let ratio = rig.engine.controller().speed_ratio();

        for faster in ops {
            rig.send(if faster { "+" } else { "-" });
            let ctl = rig.engine.controller();
            let speeds = ctl.tilt().max_speed() / ctl.pan().max_speed();
            let accels = ctl.tilt().acceleration() / ctl.pan().acceleration();
            prop_assert!((speeds - ratio).abs() < 1e-3 * ratio);
            prop_assert!((accels - ratio).abs() < 1e-3 * ratio);
        }
    }

    #[test]
    fn double_toggle_restores_direction(axis in axis(), before in 0usize..5) {
        let mut rig = Rig::new();
        let line = match axis {
            AxisId::Pan => "r",
            AxisId::Tilt => "t",
        };
        for _ in 0..before {
            rig.send(line);
        }
        let initial = rig.engine.direction(axis);
        rig.send(line);
        prop_assert_ne!(rig.engine.direction(axis), initial);
        rig.send(line);
        prop_assert_eq!(rig.engine.direction(axis), initial);
    }

    #[test]
    fn disable_is_idempotent(repeats in 1usize..8) {
        let mut rig = Rig::new();
        rig.send("e");
        for _ in 0..repeats {
            let reply = rig.send("d");
            prop_assert_eq!(reply.as_deref(), Some("OK DRIVERS OFF"));
            prop_assert!(rig.pan_enable.is_high());
            prop_assert!(rig.tilt_enable.is_high());
            prop_assert!(!rig.engine.controller().pan().is_enabled());
        }
    }

    #[test]
    fn every_line_gets_at_most_one_reply(line in "\\PC{0,24}") {
        let mut rig = Rig::new();
        let reply = rig.send(&line);
        prop_assert_eq!(reply.is_none(), line.trim().is_empty());
    }

    #[test]
    fn parse_only_looks_at_first_character(
        trigger in "[^VvMmQq12486nNcCrRxXwWpPtTzdDeE+\\-\\s]",
        tail in "[ -~]{0,12}",
    ) {
        let line = format!("{}{}", trigger, tail);
        prop_assert!(Command::parse(&line, UppercaseX::StopsPan).is_err());
    }
}
