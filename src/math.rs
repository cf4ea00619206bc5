/*
 * Math Module
 *
 * This module extends nannou's Vec2 with the steering-vector operations
 * used throughout the simulation: rescaling to a target magnitude,
 * clamping to a maximum magnitude, and the unsigned angle between two
 * vectors. All operations are safe on zero-length vectors.
 */

use nannou::prelude::*;

pub trait Vec2Ext {
    /// Rescale to the given magnitude. A zero vector stays zero.
    fn set_mag(self, mag: f32) -> Vec2;

    /// Clamp the magnitude to `max`. Never increases it.
    fn limit(self, max: f32) -> Vec2;

    /// Angle between two vectors in [0, PI]. Zero if either vector is zero.
    fn unsigned_angle(self, other: Vec2) -> f32;

    /// Orientation of the vector. Undefined for the zero vector; callers
    /// must guard before using it.
    fn heading(self) -> f32;
}

impl Vec2Ext for Vec2 {
    fn set_mag(self, mag: f32) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            self * (mag / len)
        } else {
            Vec2::ZERO
        }
    }

    fn limit(self, max: f32) -> Vec2 {
        let len = self.length();
        if len > max {
            self * (max / len)
        } else {
            self
        }
    }

    fn unsigned_angle(self, other: Vec2) -> f32 {
        let denom = self.length() * other.length();
        if denom == 0.0 {
            return 0.0;
        }
        // Clamp the cosine against floating-point drift before acos
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }
}
