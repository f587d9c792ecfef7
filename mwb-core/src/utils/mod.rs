//! Utility re-exports and helper macros for the Mecanum Wheel Bot.
//!
//! - `config`: hardware mapping and tuning constants
//! - `controllers`: motor driver, drive mixer, obstacle supervisor and command input
//! - `math`: mecanum wheel mixing and normalization
//! - `sensors`: ultrasonic distance sensor driver
//! - `sim`: simulated terminals and PWM channel for host-side runs
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod config;
pub mod controllers;
pub mod math;
pub mod sensors;
pub mod sim;

pub use config::{DriveConfig, MotorDescriptor, SensorConfig, SupervisorConfig};
pub use controllers::{Command, DriveMixer, Supervisor, COMMAND_CHANNEL};
pub use embassy_time::*;
pub use math::mixing::WheelSpeeds;
#[doc(hidden)]
pub use static_cell;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value. The cell type
/// is reached through this crate, so callers do not need their own `static_cell`.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: $crate::utils::static_cell::StaticCell<$t> =
            $crate::utils::static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
