//! Initial ray directions for an emitter.
//!
//! Fan directions depend only on the ray index. Cone directions draw two
//! uniforms from the rebuild's generator, so the order in which rays are
//! sampled must stay emitter-major then ray-major.

use glam::{Quat, Vec3};

use crate::emitter::{Emitter, EmitterPattern};
use crate::prng::Xorshift64;

/// World-space unit direction of ray `index` of `emitter`.
///
/// Cone emitters advance `rng` by two draws; fan emitters leave it untouched.
pub fn sample_direction(emitter: &Emitter, index: usize, rng: &mut Xorshift64) -> Vec3 {
    let local = match emitter.pattern {
        EmitterPattern::Fan {
            yaw_degrees,
            pitch_degrees,
        } => fan_direction(emitter.ray_count.max(1), index, yaw_degrees, pitch_degrees),
        EmitterPattern::Cone { spread_degrees } => {
            cone_direction(spread_degrees.to_radians(), rng.next_f32(), rng.next_f32())
        }
    };
    (emitter.rotation * local).normalize_or(Vec3::NEG_Z)
}

/// Yaw of ray `index` in a fan of `ray_count` rays spanning `yaw_total` radians.
pub fn fan_yaw(ray_count: usize, index: usize, yaw_total: f32) -> f32 {
    if ray_count <= 1 {
        return 0.0;
    }
    let u = index as f32 / (ray_count - 1) as f32;
    -yaw_total * 0.5 + yaw_total * u
}

/// Local direction of a fan ray: forward (-Z) turned by yaw about +Y, then
/// by pitch about +X.
pub fn fan_direction(ray_count: usize, index: usize, yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
    let yaw = fan_yaw(ray_count, index, yaw_degrees.to_radians());
    let pitch = pitch_degrees.to_radians();
    let dir = Quat::from_axis_angle(Vec3::Y, yaw) * Vec3::NEG_Z;
    Quat::from_axis_angle(Vec3::X, pitch) * dir
}

/// Local direction inside a cone around -Z, from two uniforms in [0, 1).
///
/// `cos(theta)` is interpolated between 1 and `cos(spread)`, which spreads
/// samples uniformly over the spherical cap.
pub fn cone_direction(spread_radians: f32, u: f32, v: f32) -> Vec3 {
    let cos_theta = 1.0 + (spread_radians.cos() - 1.0) * u;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = std::f32::consts::TAU * v;
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), -cos_theta).normalize_or(Vec3::NEG_Z)
}
