//! Math utilities for the Mecanum Wheel Bot.
//!
//! This module provides the fixed mixing matrix that maps body velocities onto the
//! four mecanum wheels, and the normalization that keeps wheel speeds in range.

pub mod mixing;
