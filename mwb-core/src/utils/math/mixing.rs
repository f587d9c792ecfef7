//! Mixing utilities for 4-wheeled mecanum robots.
//!
//! `WheelSpeeds` maps a body-frame velocity intent onto the four wheels using a
//! fixed mixing matrix and scales the result back into the actuator's unit range.
//!
//! The sign convention is fixed (front-left, front-right, rear-left, rear-right):
//!
//! ```text
//! FL =  vy + vx
//! FR = -vy + vx
//! RL =  vy - vx
//! RR = -vy - vx
//! ```
//!
//! # Example
//! ```rust
//! use mwb_core::utils::math::mixing::WheelSpeeds;
//! let speeds = WheelSpeeds::mix(1.0, 1.0).normalized();
//! assert_eq!(speeds.as_array(), [1.0, 0.0, 0.0, -1.0]);
//! ```

use core::ops::Index;

use libm;

/// One of the four mecanum wheels, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl Wheel {
    /// All wheels in the fixed dispatch order.
    pub const ALL: [Wheel; 4] = [
        Wheel::FrontLeft,
        Wheel::FrontRight,
        Wheel::RearLeft,
        Wheel::RearRight,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Signed per-wheel speeds, ordered FL, FR, RL, RR.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds([f32; 4]);

impl WheelSpeeds {
    pub const fn new(speeds: [f32; 4]) -> Self {
        Self(speeds)
    }

    /// Every wheel at the same signed speed.
    pub const fn uniform(speed: f32) -> Self {
        Self([speed; 4])
    }

    pub const fn zero() -> Self {
        Self([0.0; 4])
    }

    /// Apply the mixing matrix to a forward (`vx`) and strafe (`vy`) component.
    ///
    /// The result is not normalized and may reach a magnitude of 2.0 for unit inputs.
    pub fn mix(
        vx: f32,
        vy: f32,
    ) -> Self {
        Self([vy + vx, -vy + vx, vy - vx, -vy - vx])
    }

    /// Largest absolute wheel speed.
    pub fn max_magnitude(&self) -> f32 {
        self.0
            .iter()
            .fold(0.0f32, |acc, &s| acc.max(libm::fabsf(s)))
    }

    /// Scale all four speeds by `1 / max_magnitude` when it exceeds 1.0.
    ///
    /// Sub-unit vectors pass through unchanged, so the direction of motion in
    /// wheel-speed space is always preserved.
    pub fn normalized(self) -> Self {
        let m = self.max_magnitude();
        if m > 1.0 {
            Self(self.0.map(|s| s / m))
        } else {
            self
        }
    }

    pub fn as_array(&self) -> [f32; 4] {
        self.0
    }

    pub fn get(
        &self,
        wheel: Wheel,
    ) -> f32 {
        self.0[wheel.index()]
    }

    /// Iterate `(wheel, speed)` pairs in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (Wheel, f32)> + '_ {
        Wheel::ALL.iter().map(move |&w| (w, self.0[w.index()]))
    }
}

impl Index<Wheel> for WheelSpeeds {
    type Output = f32;

    fn index(
        &self,
        wheel: Wheel,
    ) -> &f32 {
        &self.0[wheel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_matrix_cardinal_inputs() {
        assert_eq!(WheelSpeeds::mix(0.0, 0.0).as_array(), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(WheelSpeeds::mix(1.0, 0.0).as_array(), [1.0, 1.0, -1.0, -1.0]);
        assert_eq!(WheelSpeeds::mix(0.0, 1.0).as_array(), [1.0, -1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_diagonal_is_scaled_back_into_range() {
        let raw = WheelSpeeds::mix(1.0, 1.0);
        assert_eq!(raw.as_array(), [2.0, 0.0, 0.0, -2.0]);
        assert_eq!(raw.max_magnitude(), 2.0);
        assert_eq!(raw.normalized().as_array(), [1.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_normalize_is_noop_within_unit_range() {
        let raw = WheelSpeeds::mix(0.3, 0.2);
        assert!(raw.max_magnitude() <= 1.0);
        assert_eq!(raw.normalized(), raw);

        // exactly at the boundary
        let edge = WheelSpeeds::mix(1.0, 0.0);
        assert_eq!(edge.normalized(), edge);
    }

    #[test]
    fn test_normalize_scales_uniformly() {
        let raw = WheelSpeeds::mix(0.9, -0.6);
        let m = raw.max_magnitude();
        assert!(m > 1.0);
        let norm = raw.normalized();
        for (i, (&before, &after)) in raw.as_array().iter().zip(norm.as_array().iter()).enumerate() {
            assert!(
                (after - before / m).abs() < 1e-6,
                "wheel {} not scaled by 1/m",
                i
            );
        }
        assert!((norm.max_magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_indexing_follows_dispatch_order() {
        let speeds = WheelSpeeds::new([0.1, 0.2, 0.3, 0.4]);
        assert_eq!(speeds[Wheel::FrontRight], 0.2);
        assert_eq!(speeds.get(Wheel::RearRight), 0.4);
        assert!(speeds.iter().map(|(w, _)| w).eq(Wheel::ALL.iter().copied()));
    }
}
