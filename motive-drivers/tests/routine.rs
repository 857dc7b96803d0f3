//! End-to-end routine scenarios against a simulated differential drive

mod common;

use common::{Harness, Robot, TICK_MS};
use motive_core::config::{ProfileConfig, TuningRecord, MAX_TUNING_RECORD_SIZE};
use motive_core::{StepSpec, TravelDirection};
use motive_drivers::config::parse_routine;
use motive_drivers::ManualClock;

const MOVE_SLICE: f32 = 1.0 / 48.0;

fn close(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}

#[test]
fn move_turn_pause() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.sequencer
        .load_routine(&[
            StepSpec::Move {
                direction: TravelDirection::Forward,
                distance: 3.0,
            },
            StepSpec::Turn { heading: 90.0 },
            StepSpec::Pause { duration_ms: 3000 },
        ])
        .unwrap();
    assert!(h.sequencer.is_running());

    h.run_step(5_000);
    assert_eq!(h.sequencer.current_step_index(), 1);
    assert!(
        close(h.robot.distance, 3.0, MOVE_SLICE),
        "stopped at {}",
        h.robot.distance
    );
    assert!(close(h.robot.heading, 0.0, 1e-3));

    h.run_step(10_000);
    assert_eq!(h.sequencer.current_step_index(), 2);
    assert!(
        close(h.robot.heading, 90.0, 1.0),
        "turned to {}",
        h.robot.heading
    );

    let pause_start = h.elapsed_ms();
    let parked = h.robot;
    h.run_step(1_000);
    let paused = h.elapsed_ms() - pause_start;
    assert!((3000..=3000 + 2 * TICK_MS).contains(&paused), "paused {paused} ms");
    assert_eq!(h.robot.distance, parked.distance);
    assert_eq!(h.robot.heading, parked.heading);

    assert!(h.sequencer.is_completed());
    assert!(!h.sequencer.is_running());
    assert!(h.step().is_stopped());
}

#[test]
fn outputs_stay_bounded() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.sequencer
        .load_routine(&[
            StepSpec::Move {
                direction: TravelDirection::Forward,
                distance: 2.0,
            },
            StepSpec::Turn { heading: -135.0 },
            StepSpec::Curve {
                direction: TravelDirection::Reverse,
                distance: 1.5,
                ratio: -0.4,
            },
        ])
        .unwrap();

    h.run(20_000);
    for (_, command) in &h.log {
        assert!((-1.0..=1.0).contains(&command.magnitude));
        assert!((-1.0..=1.0).contains(&command.steering));
    }
}

#[test]
fn reverse_move() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.sequencer.append_move(TravelDirection::Reverse, 2.0).unwrap();

    h.run(5_000);
    assert!(close(h.robot.distance, -2.0, MOVE_SLICE));
    assert!(h.log.iter().all(|(_, c)| c.magnitude <= 0.0));
}

#[test]
fn continuous_handoff_keeps_speed() {
    let clock = ManualClock::new();
    let config = ProfileConfig {
        continuous: true,
        ..Default::default()
    };
    let mut h = Harness::new(&clock, config);
    h.sequencer.append_move(TravelDirection::Forward, 2.0).unwrap();
    h.sequencer.append_move(TravelDirection::Forward, 2.0).unwrap();

    h.run(10_000);
    assert!(close(h.robot.distance, 4.0, MOVE_SLICE));

    // Only the final tick is stopped
    let (last, body) = h.log.split_last().unwrap();
    assert!(last.1.is_stopped());
    assert!(body.iter().all(|(_, c)| c.magnitude > 0.0));

    // Full speed across the boundary
    let boundary = body.iter().rposition(|(index, _)| *index == 0).unwrap();
    for (_, command) in &body[boundary - 10..boundary + 10] {
        assert!(close(command.magnitude, 1.0, 1e-5));
    }
}

#[test]
fn discrete_moves_stop_between_steps() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.sequencer.append_move(TravelDirection::Forward, 2.0).unwrap();
    h.sequencer.append_move(TravelDirection::Forward, 2.0).unwrap();

    h.run_step(5_000);
    assert!(h.log.last().unwrap().1.is_stopped());
    // Ramped down before stopping
    let (_, before) = h.log[h.log.len() - 2];
    assert!(before.magnitude < 0.6);

    h.run(5_000);
    assert!(close(h.robot.distance, 4.0, 2.0 * MOVE_SLICE));
}

#[test]
fn stall_raises_minimum_speed() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.sequencer.append_move(TravelDirection::Forward, 3.0).unwrap();

    // Wheels blocked: distance never changes
    let mut last = 0.0;
    let mut magnitudes = Vec::new();
    for _ in 0..40 {
        let command = h.sequencer.tick(0.0, 0.0);
        assert!(command.magnitude >= last);
        assert!(command.magnitude <= 1.0);
        last = command.magnitude;
        magnitudes.push(command.magnitude);
    }

    assert!(close(magnitudes[0], 0.5, 1e-6));
    assert!(close(magnitudes[4], 0.5, 1e-6));
    assert!(magnitudes[5] > 0.5);
    assert!(magnitudes[39] > magnitudes[5]);
}

#[test]
fn turn_steering_sign_is_fixed() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.robot = Robot::at_heading(170.0);
    h.sequencer.append_turn(0.0).unwrap();

    h.run(10_000);
    assert!(close(h.robot.heading, 0.0, 1.0), "ended at {}", h.robot.heading);
    assert!(h
        .log
        .iter()
        .filter(|(_, c)| !c.is_stopped())
        .all(|(_, c)| c.steering <= 0.0));
}

#[test]
fn turn_takes_shortest_path_across_wrap() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.robot = Robot::at_heading(170.0);
    h.sequencer.append_turn(-170.0).unwrap();

    h.run(10_000);
    // 20 degrees to the right, not 340 to the left
    assert!(close(h.robot.heading, 190.0, 1.0), "ended at {}", h.robot.heading);
}

#[test]
fn curve_turns_right() {
    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    h.sequencer
        .append_curve(TravelDirection::Forward, 2.0, 0.5)
        .unwrap();

    h.run(5_000);
    assert!(close(h.robot.distance, 2.0, MOVE_SLICE));
    assert!(h.robot.heading > 10.0);
    assert!(h
        .log
        .iter()
        .filter(|(_, c)| !c.is_stopped())
        .all(|(_, c)| c.steering == 0.5));
}

#[test]
fn routine_from_toml() {
    let routine = parse_routine(
        r#"
[profile]
move_speed = { min = 0.4, max = 0.8 }

[[step]]
kind = "move"
distance = 1.5

[[step]]
kind = "pause"
duration_ms = 500

[[step]]
kind = "move"
direction = "reverse"
distance = 1.5
"#,
    )
    .unwrap();

    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, ProfileConfig::default());
    assert_eq!(routine.load_into(&mut h.sequencer), Ok(3));

    h.run(10_000);
    assert!(close(h.robot.distance, 0.0, 2.0 * MOVE_SLICE));
    assert!(h.log.iter().all(|(_, c)| c.magnitude.abs() <= 0.8 + 1e-6));
}

#[test]
fn persisted_tuning_drives_sequencer() {
    let mut profile = ProfileConfig::default();
    profile.turn_speed.max = 0.6;
    profile.turn_gains.kp = 0.03;

    let mut buf = [0u8; MAX_TUNING_RECORD_SIZE];
    let used = TuningRecord::new(profile).encode(&mut buf).unwrap().len();
    let restored = TuningRecord::decode(&buf[..used]).unwrap().profile;

    let clock = ManualClock::new();
    let mut h = Harness::new(&clock, restored);
    h.sequencer.append_turn(45.0).unwrap();

    h.run(10_000);
    assert!(close(h.robot.heading, 45.0, 1.0));
    assert!(h.log.iter().all(|(_, c)| c.magnitude <= 0.6 + 1e-6));
}
