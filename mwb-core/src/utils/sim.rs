//! Simulated hardware for host-side runs and tests.
//!
//! `SimPin` is a plain digital output. `SimChannel` models a PWM channel that
//! can be routed onto one pin at a time and refuses to be attached to a second pin
//! while it still drives the first.

use core::convert::Infallible;

use embedded_hal::{
    digital::{ErrorType as DigitalErrorType, OutputPin},
    pwm::{self, ErrorKind, ErrorType as PwmErrorType, SetDutyCycle},
};

use crate::utils::{
    config::DriveConfig,
    controllers::motor::{PwmRoute, RoutedBridge, MAX_DUTY},
};

/// Motor output backed entirely by simulated hardware.
pub type SimOutput = RoutedBridge<SimPin, SimPin, SimChannel>;

/// Build one simulated output per wheel from the pin mapping in `config`.
pub fn outputs(config: &DriveConfig) -> [SimOutput; 4] {
    config.motors.map(|d| {
        RoutedBridge::new(
            d,
            SimPin::new(d.forward_terminal),
            SimPin::new(d.reverse_terminal),
            SimChannel::new(d.channel),
        )
    })
}

/// Faults raised by simulated hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// The channel was asked to drive `requested` while still attached to `attached`.
    ChannelShared { channel: u8, attached: u8, requested: u8 },
}

impl pwm::Error for SimFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPin {
    id: u8,
    high: bool,
}

impl SimPin {
    pub const fn new(id: u8) -> Self {
        Self { id, high: false }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn is_driven_high(&self) -> bool {
        self.high
    }
}

impl DigitalErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimChannel {
    id: u8,
    attached: Option<u8>,
    duty: u16,
}

impl SimChannel {
    pub const fn new(id: u8) -> Self {
        Self {
            id,
            attached: None,
            duty: 0,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Pin the channel currently drives.
    pub fn attached(&self) -> Option<u8> {
        self.attached
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl PwmErrorType for SimChannel {
    type Error = SimFault;
}

impl SetDutyCycle for SimChannel {
    fn max_duty_cycle(&self) -> u16 {
        MAX_DUTY as u16
    }

    fn set_duty_cycle(
        &mut self,
        duty: u16,
    ) -> Result<(), Self::Error> {
        self.duty = duty.min(MAX_DUTY as u16);
        Ok(())
    }
}

impl PwmRoute for SimChannel {
    fn attach_pin(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error> {
        match self.attached {
            Some(current) if current != pin => {
                tracing::error!(channel = self.id, current, pin, "channel already attached");
                Err(SimFault::ChannelShared {
                    channel: self.id,
                    attached: current,
                    requested: pin,
                })
            }
            _ => {
                self.attached = Some(pin);
                Ok(())
            }
        }
    }

    fn detach_pin(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error> {
        if self.attached == Some(pin) {
            self.attached = None;
        }
        Ok(())
    }
}
