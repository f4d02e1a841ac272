// Math utilities and helper functions

use glam::Vec2;

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Check if a vector is within `epsilon` of zero length
pub fn nearly_zero(v: Vec2, epsilon: f32) -> bool {
    v.length_squared() < epsilon * epsilon
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
