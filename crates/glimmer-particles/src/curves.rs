//! Interpolation and frame-rate independent decay helpers

use glimmer_core::Vec3;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of the remaining distance covered this step. Clamped so a long
/// frame lands on the target instead of overshooting it.
pub fn lerp_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Move `current` toward `target` by `rate * dt` of the remaining distance
pub fn approach(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, lerp_factor(rate, dt))
}

/// Scalar counterpart of [`approach`]
pub fn approach_f32(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    lerp_f32(current, target, lerp_factor(rate, dt))
}

/// Convert a per-frame multiplier tuned at `reference_fps` into the
/// multiplier for a step of `dt` seconds.
pub fn frame_decay(per_frame: f32, reference_fps: f32, dt: f32) -> f32 {
    per_frame.powf(dt.max(0.0) * reference_fps)
}
