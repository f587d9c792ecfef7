//! Distance sensing for obstacle gating.
//!
//! - `ultrasonic`: HC-SR04 style trigger/echo ranger over `embedded-hal` pins

pub mod ultrasonic;

pub use ultrasonic::Hcsr04;

/// Reported when no echo arrives within the bounded wait.
pub const NO_ECHO_CM: f32 = 999.0;

/// A forward-facing range sensor.
///
/// Reads never fail: a missing echo, a timeout or a pin fault all come back as
/// [`NO_ECHO_CM`], which callers treat as "nothing in range".
pub trait DistanceSensor {
    fn read_distance_cm(&mut self) -> f32;
}

impl<S: DistanceSensor + ?Sized> DistanceSensor for &mut S {
    fn read_distance_cm(&mut self) -> f32 {
        (**self).read_distance_cm()
    }
}
