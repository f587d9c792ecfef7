//! Hardware mapping and tuning constants.
//!
//! The pin mapping and the supervisor/sensor tuning values live here as plain data
//! so that a host-side simulation can substitute its own mapping.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::utils::math::mixing::Wheel;

/// Hardware identifiers for one motor: two H-bridge terminals and its PWM channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorDescriptor {
    pub forward_terminal: u8,
    pub reverse_terminal: u8,
    pub channel: u8,
}

impl MotorDescriptor {
    pub const fn new(
        forward_terminal: u8,
        reverse_terminal: u8,
        channel: u8,
    ) -> Self {
        Self {
            forward_terminal,
            reverse_terminal,
            channel,
        }
    }
}

/// Errors reported by [`DriveConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Two wheels share one PWM channel.
    DuplicateChannel { channel: u8, first: Wheel, second: Wheel },
    /// A terminal id appears more than once in the mapping.
    DuplicateTerminal { terminal: u8 },
    /// Duty values are 0..=255, so only 8-bit resolution is supported.
    UnsupportedResolution(u8),
}

/// Motor pin mapping and PWM setup, indexed by [`Wheel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    pub motors: [MotorDescriptor; 4],
    pub pwm_frequency_hz: u32,
    pub pwm_resolution_bits: u8,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            motors: [
                MotorDescriptor::new(32, 15, 0),
                MotorDescriptor::new(25, 26, 1),
                MotorDescriptor::new(14, 27, 2),
                MotorDescriptor::new(16, 4, 3),
            ],
            pwm_frequency_hz: 1000,
            pwm_resolution_bits: 8,
        }
    }
}

impl DriveConfig {
    pub fn motor(
        &self,
        wheel: Wheel,
    ) -> MotorDescriptor {
        self.motors[wheel.index()]
    }

    /// Check that no PWM channel or terminal is shared between motors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pwm_resolution_bits != 8 {
            return Err(ConfigError::UnsupportedResolution(self.pwm_resolution_bits));
        }

        for (i, a) in self.motors.iter().enumerate() {
            if a.forward_terminal == a.reverse_terminal {
                return Err(ConfigError::DuplicateTerminal {
                    terminal: a.forward_terminal,
                });
            }
            for (j, b) in self.motors.iter().enumerate().skip(i + 1) {
                if a.channel == b.channel {
                    return Err(ConfigError::DuplicateChannel {
                        channel: a.channel,
                        first: Wheel::ALL[i],
                        second: Wheel::ALL[j],
                    });
                }
                for t in [a.forward_terminal, a.reverse_terminal] {
                    if t == b.forward_terminal || t == b.reverse_terminal {
                        return Err(ConfigError::DuplicateTerminal { terminal: t });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Tuning for the obstacle-gated supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Forward speed issued while driving (fraction of max).
    pub cruise_speed: f32,
    /// Rotation rate used to turn away from an obstacle (positive = clockwise).
    pub avoid_rotation: f32,
    /// Distance at or below which an obstacle triggers avoidance (cm).
    pub near_threshold_cm: f32,
    /// Pause after the initial stop, before rotating (ms).
    pub pause_ms: u32,
    /// How long the avoidance rotation runs (ms).
    pub rotate_ms: u32,
    /// Control loop period (ms).
    pub tick_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            cruise_speed: 0.4,
            avoid_rotation: -0.4,
            near_threshold_cm: 10.0,
            pause_ms: 100,
            rotate_ms: 100,
            tick_ms: 50,
        }
    }
}

impl SupervisorConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Timing for the ultrasonic ranger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Upper bound on the whole echo wait, rising edge plus pulse (µs).
    pub timeout_us: u32,
    /// Echo pin polling interval (µs).
    pub poll_step_us: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            timeout_us: 30_000,
            poll_step_us: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_is_valid() {
        let cfg = DriveConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.motor(Wheel::RearRight), MotorDescriptor::new(16, 4, 3));
    }

    #[test]
    fn test_shared_channel_rejected() {
        let mut cfg = DriveConfig::default();
        cfg.motors[3].channel = 1;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DuplicateChannel {
                channel: 1,
                first: Wheel::FrontRight,
                second: Wheel::RearRight,
            })
        );
    }

    #[test]
    fn test_shared_terminal_rejected() {
        let mut cfg = DriveConfig::default();
        cfg.motors[2].reverse_terminal = 32;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DuplicateTerminal { terminal: 32 })
        );

        let mut cfg = DriveConfig::default();
        cfg.motors[0].reverse_terminal = cfg.motors[0].forward_terminal;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_resolution_other_than_8_bits_rejected() {
        let cfg = DriveConfig {
            pwm_resolution_bits: 10,
            ..DriveConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::UnsupportedResolution(10)));
    }
}
