//! HC-SR04 ultrasonic ranger.
//!
//! A measurement pulses the trigger pin (low 2 µs, high 10 µs, low), then polls the
//! echo pin for the rising edge and times the high pulse. Both waits share one
//! deadline on the `embassy-time` clock, so a read never blocks much longer than
//! `SensorConfig::timeout_us` and the pulse width is wall-clock time, whatever the
//! cost of each pin read.

use embassy_time::{Duration, Instant};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use super::{DistanceSensor, NO_ECHO_CM};
use crate::utils::config::SensorConfig;

/// Sound travels 0.0343 cm/µs; the echo covers the distance twice.
const CM_PER_US_ROUND_TRIP: f32 = 0.0343 / 2.0;

pub struct Hcsr04<T, E, D> {
    trigger: T,
    echo: E,
    delay: D,
    config: SensorConfig,
}

impl<T, E, D> Hcsr04<T, E, D>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
{
    pub fn new(
        trigger: T,
        echo: E,
        delay: D,
        config: SensorConfig,
    ) -> Self {
        Self {
            trigger,
            echo,
            delay,
            config,
        }
    }

    fn pulse_trigger(&mut self) -> Result<(), T::Error> {
        self.trigger.set_low()?;
        self.delay.delay_us(2);
        self.trigger.set_high()?;
        self.delay.delay_us(10);
        self.trigger.set_low()
    }

    /// Poll until the echo pin reads `high` or `deadline` passes.
    ///
    /// Returns the instant the level was seen, or `None` on timeout or a pin fault.
    fn wait_for_level(
        &mut self,
        high: bool,
        deadline: Instant,
    ) -> Option<Instant> {
        let step = self.config.poll_step_us.max(1);
        loop {
            if self.echo.is_high().ok()? == high {
                return Some(Instant::now());
            }
            if Instant::now() >= deadline {
                return None;
            }
            self.delay.delay_us(step);
        }
    }

    /// Width of the echo pulse in µs, or `None` if it did not complete in time.
    pub fn measure_echo_us(&mut self) -> Option<u64> {
        if let Err(e) = self.pulse_trigger() {
            tracing::warn!(?e, "trigger pin fault");
            return None;
        }
        let deadline = Instant::now() + Duration::from_micros(u64::from(self.config.timeout_us));
        let rise = self.wait_for_level(true, deadline)?;
        let fall = self.wait_for_level(false, deadline)?;
        Some((fall - rise).as_micros())
    }

    pub fn release(self) -> (T, E, D) {
        (self.trigger, self.echo, self.delay)
    }
}

/// Convert an echo pulse width to centimeters.
pub fn echo_to_cm(width_us: u64) -> f32 {
    width_us as f32 * CM_PER_US_ROUND_TRIP
}

impl<T, E, D> DistanceSensor for Hcsr04<T, E, D>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
{
    fn read_distance_cm(&mut self) -> f32 {
        match self.measure_echo_us() {
            Some(width) if width > 0 => echo_to_cm(width),
            _ => {
                tracing::trace!("no echo within timeout");
                NO_ECHO_CM
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_conversion() {
        assert_eq!(echo_to_cm(0), 0.0);
        assert!((echo_to_cm(580) - 9.947).abs() < 1e-3);
        assert!((echo_to_cm(1166) - 19.997).abs() < 1e-2);
    }
}
