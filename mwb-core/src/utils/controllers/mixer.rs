//! Drive mixer for the four mecanum wheels.
//!
//! Turns a velocity intent into per-wheel speeds and fans them out to the motors
//! in the fixed order front-left, front-right, rear-left, rear-right.

use crate::utils::{
    config::{ConfigError, DriveConfig},
    controllers::motor::{Direction, Motor, MotorOutput},
    math::mixing::{Wheel, WheelSpeeds},
};

/// Desired motion for a single control tick.
///
/// With `rotation` set the intent is executed as an in-place rotation, otherwise as
/// a translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveIntent {
    pub forward: f32,
    pub strafe: f32,
    pub rotation: Option<f32>,
}

impl DriveIntent {
    pub const fn translate(
        forward: f32,
        strafe: f32,
    ) -> Self {
        Self {
            forward,
            strafe,
            rotation: None,
        }
    }

    pub const fn rotate(omega: f32) -> Self {
        Self {
            forward: 0.0,
            strafe: 0.0,
            rotation: Some(omega),
        }
    }

    pub const fn halt() -> Self {
        Self::translate(0.0, 0.0)
    }
}

/// Owns the four motors and is the only path by which they are commanded.
pub struct DriveMixer<O> {
    motors: [Motor<O>; 4],
}

impl<O: MotorOutput> DriveMixer<O> {
    /// Build the mixer from motors already ordered FL, FR, RL, RR.
    pub fn new(motors: [Motor<O>; 4]) -> Self {
        Self { motors }
    }

    /// Validate `config` and pair each wheel's descriptor with its output.
    pub fn from_config(
        config: &DriveConfig,
        outputs: [O; 4],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut i = 0;
        let motors = outputs.map(|output| {
            let motor = Motor::new(config.motors[i], output);
            i += 1;
            motor
        });
        Ok(Self::new(motors))
    }

    /// Mecanum translation: forward `vx`, strafe `vy`, normalized into `[-1, 1]`.
    pub fn move_xy(
        &mut self,
        vx: f32,
        vy: f32,
    ) -> Result<(), O::Error> {
        let speeds = WheelSpeeds::mix(vx, vy).normalized();
        tracing::trace!(vx, vy, ?speeds, "mixed wheel speeds");
        self.dispatch(&speeds)
    }

    /// Spin in place; positive `omega` turns clockwise. `omega` is clamped to `[-1, 1]`.
    pub fn rotate_in_place(
        &mut self,
        omega: f32,
    ) -> Result<(), O::Error> {
        self.dispatch(&WheelSpeeds::uniform(omega.clamp(-1.0, 1.0)))
    }

    pub fn stop(&mut self) -> Result<(), O::Error> {
        self.move_xy(0.0, 0.0)
    }

    pub fn apply(
        &mut self,
        intent: DriveIntent,
    ) -> Result<(), O::Error> {
        match intent.rotation {
            Some(omega) => self.rotate_in_place(omega),
            None => self.move_xy(intent.forward, intent.strafe),
        }
    }

    /// Write `speeds` to the motors in dispatch order.
    pub fn dispatch(
        &mut self,
        speeds: &WheelSpeeds,
    ) -> Result<(), O::Error> {
        for (wheel, speed) in speeds.iter() {
            self.motors[wheel.index()].set_speed(speed)?;
        }
        Ok(())
    }

    pub fn motor(
        &self,
        wheel: Wheel,
    ) -> &Motor<O> {
        &self.motors[wheel.index()]
    }

    /// Last `(direction, duty)` written to each wheel.
    pub fn snapshot(&self) -> [(Direction, u8); 4] {
        let mut out = [(Direction::Stopped, 0); 4];
        for (slot, motor) in out.iter_mut().zip(self.motors.iter()) {
            *slot = (motor.current_direction(), motor.current_duty());
        }
        out
    }
}
