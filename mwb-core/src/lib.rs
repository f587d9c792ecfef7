//! Kinematic mixing and motor-drive core for a four-wheel mecanum robot on no-std
//! embedded platforms.
//!
//! For a host-side simulation, see the `mwb-app/mock-mcu` binary.
#![no_std]

pub mod utils;
