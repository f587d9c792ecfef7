//! Obstacle-gated drive sequencer.
//!
//! Three states: `Driving`, `Avoiding` and `Stopped`. While driving, every tick takes
//! one distance sample; an obstacle at or inside the near threshold runs a fixed
//! avoidance maneuver (stop, pause, rotate, stop) to completion before driving
//! resumes. Distance is not re-checked during the maneuver.
//!
//! `Stopped` is the initial state and is only left on an explicit command.

use embedded_hal::delay::DelayNs;

use super::{mixer::DriveMixer, motor::MotorOutput, Command};
use crate::utils::{
    config::SupervisorConfig,
    sensors::{DistanceSensor, NO_ECHO_CM},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Driving,
    Avoiding,
    Stopped,
}

/// What happened during one call to [`Supervisor::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Distance sampled this tick, if the supervisor was driving.
    pub distance_cm: Option<f32>,
    /// An avoidance maneuver ran this tick.
    pub avoided: bool,
    /// Command applied at the end of the tick.
    pub command: Option<Command>,
    /// State after the tick.
    pub state: SupervisorState,
}

pub struct Supervisor {
    config: SupervisorConfig,
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            state: SupervisorState::Stopped,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Whether `distance_cm` counts as an obstacle. The no-echo sentinel never does.
    pub fn is_obstacle(
        &self,
        distance_cm: f32,
    ) -> bool {
        distance_cm < NO_ECHO_CM
            && distance_cm >= 0.0
            && distance_cm <= self.config.near_threshold_cm
    }

    /// Run one control tick: act on the current state, then apply `command`.
    ///
    /// The command is applied even when the state action hits a hardware fault, so
    /// a `Stop` is never lost. The first error encountered is returned.
    pub fn tick<O, S, D>(
        &mut self,
        mixer: &mut DriveMixer<O>,
        sensor: &mut S,
        delay: &mut D,
        command: Option<Command>,
    ) -> Result<TickReport, O::Error>
    where
        O: MotorOutput,
        S: DistanceSensor,
        D: DelayNs,
    {
        let mut report = TickReport {
            distance_cm: None,
            avoided: false,
            command,
            state: self.state,
        };

        let acted = self.act(mixer, sensor, delay, &mut report);
        if acted.is_err() {
            tracing::error!(state = ?self.state, "hardware fault in state action");
        }
        let commanded = match command {
            Some(cmd) => self.apply_command(mixer, cmd),
            None => Ok(()),
        };
        acted.and(commanded)?;

        report.state = self.state;
        Ok(report)
    }

    fn act<O, S, D>(
        &mut self,
        mixer: &mut DriveMixer<O>,
        sensor: &mut S,
        delay: &mut D,
        report: &mut TickReport,
    ) -> Result<(), O::Error>
    where
        O: MotorOutput,
        S: DistanceSensor,
        D: DelayNs,
    {
        match self.state {
            SupervisorState::Stopped => mixer.stop(),
            SupervisorState::Driving => {
                let d = sensor.read_distance_cm();
                report.distance_cm = Some(d);
                if self.is_obstacle(d) {
                    tracing::info!(distance_cm = d, "obstacle ahead, avoiding");
                    self.avoid(mixer, delay)?;
                    report.avoided = true;
                    Ok(())
                } else {
                    mixer.move_xy(self.config.cruise_speed, 0.0)
                }
            }
            // a previous maneuver was cut short by a hardware fault
            SupervisorState::Avoiding => {
                mixer.stop()?;
                self.transition(SupervisorState::Driving);
                Ok(())
            }
        }
    }

    fn apply_command<O: MotorOutput>(
        &mut self,
        mixer: &mut DriveMixer<O>,
        command: Command,
    ) -> Result<(), O::Error> {
        match command {
            Command::Go => {
                self.transition(SupervisorState::Driving);
                mixer.move_xy(self.config.cruise_speed, 0.0)
            }
            Command::Stop => {
                self.transition(SupervisorState::Stopped);
                mixer.stop()
            }
        }
    }

    fn avoid<O: MotorOutput, D: DelayNs>(
        &mut self,
        mixer: &mut DriveMixer<O>,
        delay: &mut D,
    ) -> Result<(), O::Error> {
        self.transition(SupervisorState::Avoiding);
        mixer.stop()?;
        delay.delay_ms(self.config.pause_ms);
        mixer.rotate_in_place(self.config.avoid_rotation)?;
        delay.delay_ms(self.config.rotate_ms);
        mixer.stop()?;
        self.transition(SupervisorState::Driving);
        Ok(())
    }

    fn transition(
        &mut self,
        next: SupervisorState,
    ) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "supervisor state change");
            self.state = next;
        }
    }
}
