//! Field accumulation: the net acceleration felt at a point.
//!
//! Sources superpose linearly. When a scene has no sources at all, the
//! integrator falls back to [`center_acceleration`], a single power-law pull
//! toward a configured center.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::field_source::FieldSource;

/// Minimum radius used by the single-center fallback field.
const CENTER_MIN_RADIUS: f32 = 0.001;

/// Tolerance used when comparing cached field parameters.
const PARAM_EPSILON: f32 = 1e-5;

/// Ambient field amplitude and exponent, read from the camera once per rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalFieldParams {
    pub beta: f32,
    pub gamma: f32,
}

impl Default for GlobalFieldParams {
    fn default() -> Self {
        Self {
            beta: 0.0,
            gamma: 2.0,
        }
    }
}

impl GlobalFieldParams {
    pub fn new(beta: f32, gamma: f32) -> Self {
        Self { beta, gamma }
    }

    /// True when both values match within a relative tolerance.
    pub fn approx_eq(&self, other: &GlobalFieldParams) -> bool {
        approx_eq(self.beta, other.beta) && approx_eq(self.gamma, other.gamma)
    }

    /// Bends a view ray radially by `|ray|^gamma * beta`.
    ///
    /// Lets a host build camera rays that agree with the beam field. The
    /// result is normalized, falling back to -Z for degenerate input.
    pub fn curve_ray(&self, ray: Vec3) -> Vec3 {
        let k = ray.length().powf(self.gamma) * self.beta;
        (ray + ray.normalize_or_zero() * k).normalize_or(Vec3::NEG_Z)
    }
}

/// Equality within `max(1e-5 * |a|, 1e-5)`.
pub fn approx_eq(a: f32, b: f32) -> bool {
    if a == b {
        return true;
    }
    let tolerance = (PARAM_EPSILON * a.abs()).max(PARAM_EPSILON);
    (a - b).abs() < tolerance
}

/// Renderer-level amplitude multipliers shared by every source in a rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTuning {
    pub bend_scale: f32,
    pub field_strength: f32,
}

impl FieldTuning {
    /// Combined multiplier applied to every source amplitude.
    pub fn amplitude(&self) -> f32 {
        self.bend_scale * self.field_strength
    }
}

/// Sum of every enabled source's contribution at `point`.
pub fn acceleration_at(
    point: Vec3,
    sources: &[FieldSource],
    global: &GlobalFieldParams,
    tuning: &FieldTuning,
) -> Vec3 {
    sources
        .iter()
        .fold(Vec3::ZERO, |acc, s| acc + s.contribution(point, global, tuning))
}

/// Single-center power-law pull used when no sources exist.
pub fn center_acceleration(
    point: Vec3,
    center: Vec3,
    global: &GlobalFieldParams,
    tuning: &FieldTuning,
) -> Vec3 {
    let rvec = point - center;
    let rr = rvec.length().max(CENTER_MIN_RADIUS);
    (-rvec / rr) * (global.beta * rr.powf(global.gamma) * tuning.amplitude())
}
