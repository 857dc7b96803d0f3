//! Step sequencer
//!
//! Owns a routine of steps and turns `(heading, distance)` samples into
//! drive commands, one call to [`StepSequencer::tick`] per control cycle.
//! The caller feeds a drive mixer with the result.

use heapless::Vec;

use super::step::{Latch, Step, StepKind, StepSpec, TravelDirection};
use crate::config::ProfileConfig;
use crate::motion::{clamp, normalized_error, wrap, Chaining, Trapezoid};
use crate::traits::{Clock, PidController};

/// Maximum steps in one routine
pub const MAX_STEPS: usize = 32;

/// Errors from building a routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileError {
    /// The routine already holds [`MAX_STEPS`] steps
    CapacityExceeded,
}

/// Output of one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveCommand {
    /// Signed drive output in [-1, 1], positive is forward
    pub magnitude: f32,
    /// Signed steering output in [-1, 1], positive is right
    pub steering: f32,
}

impl DriveCommand {
    /// Create a stopped command
    pub const fn stopped() -> Self {
        Self {
            magnitude: 0.0,
            steering: 0.0,
        }
    }

    /// Create a command, saturating both channels
    pub fn new(magnitude: f32, steering: f32) -> Self {
        Self {
            magnitude: clamp(magnitude),
            steering: clamp(steering),
        }
    }

    /// Check if both channels are zero
    pub fn is_stopped(&self) -> bool {
        self.magnitude == 0.0 && self.steering == 0.0
    }
}

/// Routine sequencer
///
/// `P` is the feedback controller used for both heading hold and turns,
/// `C` the time source for pauses.
#[derive(Debug)]
pub struct StepSequencer<P: PidController, C: Clock> {
    config: ProfileConfig,
    steps: Vec<Step, MAX_STEPS>,
    /// Index of the active step (== len when the routine is over)
    index: usize,
    loaded: bool,
    completed: bool,
    /// Last emitted command
    output: DriveCommand,
    steer_pid: P,
    turn_pid: P,
    clock: C,
}

impl<P: PidController, C: Clock> StepSequencer<P, C> {
    /// Create an empty sequencer
    pub fn new(config: ProfileConfig, mut steer_pid: P, mut turn_pid: P, clock: C) -> Self {
        steer_pid.set_gains(config.steer_gains);
        turn_pid.set_gains(config.turn_gains);
        Self {
            config,
            steps: Vec::new(),
            index: 0,
            loaded: false,
            completed: false,
            output: DriveCommand::stopped(),
            steer_pid,
            turn_pid,
            clock,
        }
    }

    /// Clear the routine and all run state
    ///
    /// Speeds and gains are kept. Continuous chaining is switched off and
    /// has to be enabled again for the next routine.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.index = 0;
        self.loaded = false;
        self.completed = false;
        self.config.continuous = false;
        self.output = DriveCommand::stopped();
        self.steer_pid.reset();
        self.turn_pid.reset();
    }

    /// Append a straight move, returning the new step count
    pub fn append_move(
        &mut self,
        direction: TravelDirection,
        distance: f32,
    ) -> Result<usize, ProfileError> {
        self.push(StepKind::Move {
            direction,
            distance,
            speed: self.config.move_speed,
        })
    }

    /// Append a turn to an absolute heading, returning the new step count
    pub fn append_turn(&mut self, heading: f32) -> Result<usize, ProfileError> {
        self.push(StepKind::Turn {
            heading,
            speed: self.config.turn_speed,
            direction: self.config.turn_direction,
        })
    }

    /// Append a pause, returning the new step count
    pub fn append_pause(&mut self, duration_ms: u32) -> Result<usize, ProfileError> {
        self.push(StepKind::Pause { duration_ms })
    }

    /// Append a fixed-ratio curve, returning the new step count
    pub fn append_curve(
        &mut self,
        direction: TravelDirection,
        distance: f32,
        ratio: f32,
    ) -> Result<usize, ProfileError> {
        self.push(StepKind::Curve {
            direction,
            distance,
            ratio,
            speed: self.config.move_speed,
        })
    }

    /// Append an authored step
    pub fn append(&mut self, spec: StepSpec) -> Result<usize, ProfileError> {
        match spec {
            StepSpec::Move {
                direction,
                distance,
            } => self.append_move(direction, distance),
            StepSpec::Turn { heading } => self.append_turn(heading),
            StepSpec::Pause { duration_ms } => self.append_pause(duration_ms),
            StepSpec::Curve {
                direction,
                distance,
                ratio,
            } => self.append_curve(direction, distance, ratio),
        }
    }

    /// Replace the routine and mark it loaded
    ///
    /// Goes through [`reset`](Self::reset), so continuous chaining is off
    /// afterwards.
    pub fn load_routine(&mut self, routine: &[StepSpec]) -> Result<usize, ProfileError> {
        self.reset();
        for spec in routine {
            self.append(*spec)?;
        }
        self.loaded = true;
        info!("routine loaded: {} steps", self.steps.len());
        Ok(self.steps.len())
    }

    fn push(&mut self, kind: StepKind) -> Result<usize, ProfileError> {
        self.steps
            .push(Step::new(kind))
            .map_err(|_| ProfileError::CapacityExceeded)?;
        Ok(self.steps.len())
    }

    /// Process one control cycle
    ///
    /// `heading` is in degrees (any range), `distance` is the cumulative
    /// travelled distance. Returns the command to drive with; it is also
    /// kept as [`output`](Self::output).
    pub fn tick(&mut self, heading: f32, distance: f32) -> DriveCommand {
        let command = self.run(heading, distance);
        self.output = command;
        self.completed = self.index >= self.steps.len();
        command
    }

    fn run(&mut self, heading: f32, distance: f32) -> DriveCommand {
        if self.index >= self.steps.len() {
            return DriveCommand::stopped();
        }

        if let Some(command) = self.step_active(heading, distance) {
            return command;
        }

        let finished = self.index;
        self.finish_active(heading, distance);

        if self.continues_into_next(finished) {
            if let Some(command) = self.step_active(heading, distance) {
                return command;
            }
            self.finish_active(heading, distance);
        }

        DriveCommand::stopped()
    }

    /// Start the active step if needed and drive it
    ///
    /// Returns `None` once the step has reached its target.
    fn step_active(&mut self, heading: f32, distance: f32) -> Option<DriveCommand> {
        if self.steps[self.index].is_pending() {
            self.start_active(heading, distance);
        }

        let now_us = self.clock.now_us();
        let step = &mut self.steps[self.index];
        let kind = *step.kind();

        match (kind, step.latch_mut()?) {
            (
                StepKind::Move { direction, .. },
                Latch::Travel {
                    start_distance,
                    hold_heading,
                    trapezoid,
                },
            ) => {
                let profile = trapezoid.evaluate(distance - *start_distance);
                if profile.is_done() {
                    return None;
                }
                let error = normalized_error(heading, *hold_heading);
                let steering = self.steer_pid.update(0.0, error);
                Some(DriveCommand::new(direction.sign() * profile.speed, steering))
            }
            (
                StepKind::Curve {
                    direction, ratio, ..
                },
                Latch::Travel {
                    start_distance,
                    trapezoid,
                    ..
                },
            ) => {
                let profile = trapezoid.evaluate(distance - *start_distance);
                if profile.is_done() {
                    return None;
                }
                Some(DriveCommand::new(direction.sign() * profile.speed, ratio))
            }
            (
                StepKind::Turn {
                    heading: target,
                    direction,
                    ..
                },
                Latch::Turn {
                    initial_error,
                    trapezoid,
                },
            ) => {
                let error = normalized_error(heading, target);
                let profile = trapezoid.evaluate(*initial_error - error);
                if profile.is_done() {
                    return None;
                }
                let correction = libm::fabsf(clamp(self.turn_pid.update(0.0, error)));
                let steering = libm::copysignf(correction, *initial_error) * direction.sign();
                Some(DriveCommand::new(direction.sign() * profile.speed, steering))
            }
            (StepKind::Pause { duration_ms }, Latch::Pause { started_us }) => {
                let elapsed_ms = now_us.saturating_sub(*started_us) / 1000;
                if elapsed_ms >= u64::from(duration_ms) {
                    return None;
                }
                Some(DriveCommand::stopped())
            }
            _ => None,
        }
    }

    /// Latch start conditions of the active step
    fn start_active(&mut self, heading: f32, distance: f32) {
        let chaining = self.chaining_for(self.index);
        let now_us = self.clock.now_us();
        let index = self.index;
        let step = &mut self.steps[index];
        let kind = *step.kind();

        let latch = match kind {
            StepKind::Move {
                direction,
                distance: target,
                speed,
            }
            | StepKind::Curve {
                direction,
                distance: target,
                speed,
                ..
            } => {
                self.steer_pid
                    .set_gains(self.config.steer_gains.signed_kp(-direction.sign()));
                self.steer_pid.reset();
                Latch::Travel {
                    start_distance: distance,
                    hold_heading: wrap(heading),
                    trapezoid: Trapezoid::configure(
                        target,
                        speed,
                        chaining,
                        self.config.move_settings(),
                        now_us,
                    ),
                }
            }
            StepKind::Turn {
                heading: target,
                speed,
                ..
            } => {
                let initial_error = normalized_error(heading, target);
                self.turn_pid
                    .set_gains(self.config.turn_gains.signed_kp(1.0));
                self.turn_pid.reset();
                Latch::Turn {
                    initial_error,
                    trapezoid: Trapezoid::configure(
                        initial_error,
                        speed,
                        chaining,
                        self.config.turn_settings(),
                        now_us,
                    ),
                }
            }
            StepKind::Pause { .. } => Latch::Pause { started_us: now_us },
        };

        step.activate(latch);
        info!(
            "step {} {} started: target {} heading {} distance {}",
            index,
            kind.name(),
            kind.target(),
            heading,
            distance
        );
    }

    /// Mark the active step done and move on to the next one
    fn finish_active(&mut self, heading: f32, distance: f32) {
        let now_us = self.clock.now_us();
        let index = self.index;
        let step = &mut self.steps[index];
        let motion_ms = step
            .latch()
            .and_then(|latch| latch.trapezoid())
            .map(|trapezoid| trapezoid.elapsed_ms(now_us));

        if step.finish() {
            info!(
                "step {} {} done: heading {} distance {} motion {} ms",
                index,
                step.kind().name(),
                heading,
                distance,
                motion_ms
            );
        }
        self.index += 1;
    }

    /// Check if the step after `finished` should start in the same tick
    fn continues_into_next(&self, finished: usize) -> bool {
        if !self.config.continuous {
            return false;
        }
        let Some(direction) = self.steps[finished].kind().travel_direction() else {
            return false;
        };
        let Some(next) = self.steps.get(finished + 1) else {
            return false;
        };

        match *next.kind() {
            StepKind::Move {
                direction: next_direction,
                distance,
                ..
            }
            | StepKind::Curve {
                direction: next_direction,
                distance,
                ..
            } => next_direction == direction && distance.is_finite() && distance != 0.0,
            _ => false,
        }
    }

    /// Neighbour speeds for the step at `index`
    fn chaining_for(&self, index: usize) -> Chaining {
        if !self.config.continuous {
            return Chaining::none();
        }
        let active = self.steps[index].kind().direction();
        let speed_of = |step: &Step| step.kind().chaining_speed(active);

        Chaining {
            prev_speed: index
                .checked_sub(1)
                .and_then(|i| self.steps.get(i))
                .and_then(speed_of),
            next_speed: self.steps.get(index + 1).and_then(speed_of),
        }
    }

    /// Enable or disable continuous chaining
    pub fn set_continuous(&mut self, continuous: bool) {
        self.config.continuous = continuous;
    }

    pub fn is_continuous(&self) -> bool {
        self.config.continuous
    }

    /// Mark the routine ready to run
    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Check if every step has finished (as of the last tick)
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Loaded and not yet completed
    pub fn is_running(&self) -> bool {
        self.loaded && !self.completed
    }

    pub fn current_step_index(&self) -> usize {
        self.index
    }

    /// The active step, if the routine is not over
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Last emitted command
    pub fn output(&self) -> DriveCommand {
        self.output
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Mutable configuration
    ///
    /// Speed changes only affect steps appended afterwards.
    pub fn config_mut(&mut self) -> &mut ProfileConfig {
        &mut self.config
    }

    pub fn steer_pid(&self) -> &P {
        &self.steer_pid
    }

    pub fn turn_pid(&self) -> &P {
        &self.turn_pid
    }
}
