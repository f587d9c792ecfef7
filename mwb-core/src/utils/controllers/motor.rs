//! Single-motor H-bridge driver with a time-shared PWM channel.
//!
//! Each motor has two terminals but only one PWM channel. The channel is routed to
//! whichever terminal matches the commanded direction while the other terminal is
//! held low. [`Motor::set_speed`] is the only entry point that touches the
//! hardware, and it always sequences the routing as:
//!
//! 1. detach the channel from the idle terminal and hold that terminal low,
//! 2. attach the channel to the active terminal,
//! 3. write the duty.
//!
//! A stop detaches both terminals, writes a zero duty and holds both low.

use embedded_hal::{digital::OutputPin, pwm::SetDutyCycle};

use crate::utils::config::MotorDescriptor;

/// Full-scale duty value for the 8-bit channel.
pub const MAX_DUTY: u8 = 255;

/// One of the two H-bridge drive lines of a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Forward,
    Reverse,
}

impl Terminal {
    pub const fn opposite(self) -> Self {
        match self {
            Terminal::Forward => Terminal::Reverse,
            Terminal::Reverse => Terminal::Forward,
        }
    }
}

/// Last direction written to a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Forward,
    Reverse,
    #[default]
    Stopped,
}

impl Direction {
    fn of(speed: f32) -> Self {
        if speed > 0.0 {
            Direction::Forward
        } else if speed < 0.0 {
            Direction::Reverse
        } else {
            Direction::Stopped
        }
    }

    /// Terminal that carries the PWM signal in this direction, if any.
    pub const fn active_terminal(self) -> Option<Terminal> {
        match self {
            Direction::Forward => Some(Terminal::Forward),
            Direction::Reverse => Some(Terminal::Reverse),
            Direction::Stopped => None,
        }
    }
}

/// Hardware seam for one motor's terminals and PWM channel.
pub trait MotorOutput {
    type Error: core::fmt::Debug;

    /// Release the PWM channel from `terminal`. Detaching an unattached terminal is a no-op.
    fn detach(
        &mut self,
        terminal: Terminal,
    ) -> Result<(), Self::Error>;

    /// Route the PWM channel onto `terminal`.
    fn attach(
        &mut self,
        terminal: Terminal,
    ) -> Result<(), Self::Error>;

    /// Drive `terminal` as a plain digital output at logic low.
    fn hold_low(
        &mut self,
        terminal: Terminal,
    ) -> Result<(), Self::Error>;

    /// Write a duty value (0..=255) to the PWM channel.
    fn write_duty(
        &mut self,
        duty: u8,
    ) -> Result<(), Self::Error>;
}

/// A PWM channel whose output can be routed onto a pin at runtime.
pub trait PwmRoute: embedded_hal::pwm::ErrorType {
    fn attach_pin(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error>;

    fn detach_pin(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error>;
}

/// Errors from a [`RoutedBridge`].
#[derive(Debug)]
pub enum BridgeError<PE: core::fmt::Debug, CE: core::fmt::Debug> {
    Pin(PE),
    Channel(CE),
}

/// [`MotorOutput`] over two `embedded-hal` output pins and one routable PWM channel.
pub struct RoutedBridge<F, R, C> {
    descriptor: MotorDescriptor,
    forward: F,
    reverse: R,
    channel: C,
}

impl<F, R, C> RoutedBridge<F, R, C>
where
    F: OutputPin,
    R: OutputPin<Error = F::Error>,
    C: SetDutyCycle + PwmRoute,
{
    pub fn new(
        descriptor: MotorDescriptor,
        forward: F,
        reverse: R,
        channel: C,
    ) -> Self {
        Self {
            descriptor,
            forward,
            reverse,
            channel,
        }
    }

    fn pin_id(
        &self,
        terminal: Terminal,
    ) -> u8 {
        match terminal {
            Terminal::Forward => self.descriptor.forward_terminal,
            Terminal::Reverse => self.descriptor.reverse_terminal,
        }
    }

    /// Borrow the terminals and channel, e.g. to inspect simulated state.
    pub fn parts(&self) -> (&F, &R, &C) {
        (&self.forward, &self.reverse, &self.channel)
    }

    pub fn release(self) -> (F, R, C) {
        (self.forward, self.reverse, self.channel)
    }
}

impl<F, R, C> MotorOutput for RoutedBridge<F, R, C>
where
    F: OutputPin,
    R: OutputPin<Error = F::Error>,
    C: SetDutyCycle + PwmRoute,
{
    type Error = BridgeError<F::Error, C::Error>;

    fn detach(
        &mut self,
        terminal: Terminal,
    ) -> Result<(), Self::Error> {
        let pin = self.pin_id(terminal);
        self.channel.detach_pin(pin).map_err(BridgeError::Channel)
    }

    fn attach(
        &mut self,
        terminal: Terminal,
    ) -> Result<(), Self::Error> {
        let pin = self.pin_id(terminal);
        self.channel.attach_pin(pin).map_err(BridgeError::Channel)
    }

    fn hold_low(
        &mut self,
        terminal: Terminal,
    ) -> Result<(), Self::Error> {
        match terminal {
            Terminal::Forward => self.forward.set_low(),
            Terminal::Reverse => self.reverse.set_low(),
        }
        .map_err(BridgeError::Pin)
    }

    fn write_duty(
        &mut self,
        duty: u8,
    ) -> Result<(), Self::Error> {
        self.channel
            .set_duty_cycle_fraction(duty as u16, MAX_DUTY as u16)
            .map_err(BridgeError::Channel)
    }
}

/// Duty for a signed speed: `clamp(round(|speed| * 255), 0, 255)`. NaN maps to 0.
pub fn duty_for(speed: f32) -> u8 {
    if speed.is_nan() {
        return 0;
    }
    let magnitude = libm::fabsf(speed).min(1.0);
    libm::roundf(magnitude * MAX_DUTY as f32) as u8
}

/// One physical DC motor.
pub struct Motor<O> {
    descriptor: MotorDescriptor,
    output: O,
    duty: u8,
    direction: Direction,
}

impl<O: MotorOutput> Motor<O> {
    /// Wrap `output`. No hardware is touched until the first `set_speed`.
    pub fn new(
        descriptor: MotorDescriptor,
        output: O,
    ) -> Self {
        Self {
            descriptor,
            output,
            duty: 0,
            direction: Direction::Stopped,
        }
    }

    pub fn descriptor(&self) -> MotorDescriptor {
        self.descriptor
    }

    pub fn current_duty(&self) -> u8 {
        self.duty
    }

    pub fn current_direction(&self) -> Direction {
        self.direction
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Command a signed speed in `[-1.0, 1.0]`; larger magnitudes are clamped.
    pub fn set_speed(
        &mut self,
        speed: f32,
    ) -> Result<(), O::Error> {
        let duty = duty_for(speed);
        let direction = Direction::of(speed);

        match direction.active_terminal() {
            Some(active) => {
                let idle = active.opposite();
                self.output.detach(idle)?;
                self.output.hold_low(idle)?;
                self.output.attach(active)?;
                self.output.write_duty(duty)?;
            }
            None => {
                self.output.detach(Terminal::Forward)?;
                self.output.detach(Terminal::Reverse)?;
                self.output.write_duty(0)?;
                self.output.hold_low(Terminal::Forward)?;
                self.output.hold_low(Terminal::Reverse)?;
            }
        }

        self.duty = duty;
        self.direction = direction;
        tracing::debug!(
            channel = self.descriptor.channel,
            ?direction,
            duty = self.duty,
            "motor speed set"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sim::{SimChannel, SimPin};

    fn sim_motor() -> Motor<RoutedBridge<SimPin, SimPin, SimChannel>> {
        let d = MotorDescriptor::new(32, 15, 0);
        let bridge = RoutedBridge::new(
            d,
            SimPin::new(d.forward_terminal),
            SimPin::new(d.reverse_terminal),
            SimChannel::new(d.channel),
        );
        Motor::new(d, bridge)
    }

    #[test]
    fn test_duty_rounding_and_clamping() {
        assert_eq!(duty_for(0.0), 0);
        assert_eq!(duty_for(1.0), 255);
        assert_eq!(duty_for(-1.0), 255);
        assert_eq!(duty_for(0.4), 102);
        assert_eq!(duty_for(-0.5), 128);
        assert_eq!(duty_for(3.7), 255);
        assert_eq!(duty_for(-12.0), 255);
        assert_eq!(duty_for(f32::NAN), 0);
    }

    #[test]
    fn test_forward_routes_channel_to_forward_terminal() {
        let mut motor = sim_motor();
        motor.set_speed(0.4).unwrap();
        assert_eq!(motor.current_direction(), Direction::Forward);
        assert_eq!(motor.current_duty(), 102);
        let (fwd, rev, ch) = motor.output.parts();
        assert_eq!(ch.attached(), Some(32));
        assert_eq!(ch.duty(), 102);
        assert!(!rev.is_driven_high());
        assert!(!fwd.is_driven_high());
    }

    #[test]
    fn test_reversal_moves_channel_without_sharing() {
        let mut motor = sim_motor();
        motor.set_speed(0.8).unwrap();
        motor.set_speed(-0.8).unwrap();
        assert_eq!(motor.current_direction(), Direction::Reverse);
        let (_, _, ch) = motor.output.parts();
        assert_eq!(ch.attached(), Some(15));
        assert_eq!(ch.duty(), 204);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut motor = sim_motor();
        motor.set_speed(-1.0).unwrap();
        for _ in 0..2 {
            motor.set_speed(0.0).unwrap();
            assert_eq!(motor.current_direction(), Direction::Stopped);
            assert_eq!(motor.current_duty(), 0);
            let (fwd, rev, ch) = motor.output.parts();
            assert_eq!(ch.attached(), None);
            assert_eq!(ch.duty(), 0);
            assert!(!fwd.is_driven_high() && !rev.is_driven_high());
        }
    }

    #[test]
    fn test_nan_speed_stops() {
        let mut motor = sim_motor();
        motor.set_speed(0.6).unwrap();
        motor.set_speed(f32::NAN).unwrap();
        assert_eq!(motor.current_direction(), Direction::Stopped);
        assert_eq!(motor.current_duty(), 0);
    }
}
