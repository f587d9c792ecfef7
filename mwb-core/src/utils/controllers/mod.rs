//! Module Exports
//!
//! This file exports the drive control stack and the command input channel.
//!
//! - `motor`: single-motor H-bridge driver with a time-shared PWM channel
//! - `mixer`: mecanum drive mixer fanning out to the four motors
//! - `supervisor`: obstacle-gated drive/avoid/stop sequencer

pub mod mixer;
pub mod motor;
pub mod supervisor;

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, TrySendError},
};

pub use mixer::{DriveIntent, DriveMixer};
pub use motor::{Direction, Motor, MotorOutput, RoutedBridge, Terminal};
pub use supervisor::{Supervisor, SupervisorState, TickReport};

/// Channel used to hand commands from the input reader to the control loop.
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, 16> = Channel::new();

/// Single-character operator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `i`: start driving forward.
    Go,
    /// `o`: stop and stay stopped.
    Stop,
}

impl Command {
    /// Parse one input byte. Anything unrecognized yields `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'i' => Some(Command::Go),
            b'o' => Some(Command::Stop),
            _ => None,
        }
    }
}

/// Parse `byte` and queue the command for the control loop.
///
/// Unknown bytes are ignored. When the channel is full the command is dropped.
pub fn submit(byte: u8) -> Option<Command> {
    let command = Command::from_byte(byte)?;
    match COMMAND_CHANNEL.try_send(command) {
        Ok(()) => Some(command),
        Err(TrySendError::Full(dropped)) => {
            tracing::warn!(?dropped, "command channel full, dropping");
            None
        }
    }
}

/// Take the next pending command, if any, without waiting.
pub fn next_command() -> Option<Command> {
    COMMAND_CHANNEL.try_receive().ok()
}
