//! Kinematic differential-drive simulation for scenario tests

#![allow(dead_code)]

use motive_core::config::ProfileConfig;
use motive_core::traits::Clock;
use motive_core::{DriveCommand, StepSequencer};
use motive_drivers::{CurvatureMixer, ManualClock, Pid};

/// Control period
pub const TICK_MS: u64 = 5;

/// Wheel speed at full output (ft/s)
pub const MAX_WHEEL_SPEED: f32 = 2.0;

/// Distance between the wheels (ft)
pub const TRACK_WIDTH: f32 = 2.0;

/// Ideal robot: no slip, no inertia
#[derive(Debug, Default, Clone, Copy)]
pub struct Robot {
    /// Degrees, clockwise positive, unbounded
    pub heading: f32,
    /// Cumulative signed travel (ft)
    pub distance: f32,
}

impl Robot {
    pub fn at_heading(heading: f32) -> Self {
        Self {
            heading,
            distance: 0.0,
        }
    }

    /// Advance one tick with the given command
    pub fn drive(&mut self, mixer: &CurvatureMixer, command: DriveCommand) {
        let wheels = mixer.mix(command);
        let dt = TICK_MS as f32 / 1000.0;

        let left = wheels.left * MAX_WHEEL_SPEED;
        let right = wheels.right * MAX_WHEEL_SPEED;

        self.distance += (left + right) / 2.0 * dt;
        self.heading += ((left - right) / TRACK_WIDTH * dt).to_degrees();
    }
}

pub struct Harness<'a> {
    pub sequencer: StepSequencer<Pid, &'a ManualClock>,
    pub clock: &'a ManualClock,
    pub mixer: CurvatureMixer,
    pub robot: Robot,
    /// Every emitted command with the step index it was emitted in
    pub log: Vec<(usize, DriveCommand)>,
}

impl<'a> Harness<'a> {
    pub fn new(clock: &'a ManualClock, config: ProfileConfig) -> Self {
        Self {
            sequencer: StepSequencer::new(config, Pid::default(), Pid::default(), clock),
            clock,
            mixer: CurvatureMixer::default(),
            robot: Robot::default(),
            log: Vec::new(),
        }
    }

    /// One control cycle: sample, tick, drive, advance time
    pub fn step(&mut self) -> DriveCommand {
        let index = self.sequencer.current_step_index();
        let command = self.sequencer.tick(self.robot.heading, self.robot.distance);
        self.log.push((index, command));
        self.robot.drive(&self.mixer, command);
        self.clock.advance_ms(TICK_MS);
        command
    }

    /// Tick until the routine completes, panicking after `max_ticks`
    pub fn run(&mut self, max_ticks: usize) -> usize {
        for tick in 0..max_ticks {
            self.step();
            if self.sequencer.is_completed() {
                return tick + 1;
            }
        }
        panic!("routine did not complete in {max_ticks} ticks");
    }

    /// Tick until the active step index changes
    pub fn run_step(&mut self, max_ticks: usize) {
        let start = self.sequencer.current_step_index();
        for _ in 0..max_ticks {
            self.step();
            if self.sequencer.current_step_index() != start {
                return;
            }
        }
        panic!("step {start} did not finish in {max_ticks} ticks");
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_us() / 1000
    }
}
