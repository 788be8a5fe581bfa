//! Ray emitters: an origin, an orientation and a pattern for a bundle of rays.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::RayError;

/// How an emitter spreads its rays around local forward (-Z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmitterPattern {
    /// Evenly spaced yaw sweep at a fixed pitch. Deterministic.
    Fan {
        #[serde(default = "default_fan_yaw")]
        yaw_degrees: f32,
        #[serde(default)]
        pitch_degrees: f32,
    },
    /// Seeded random directions inside a cone of the given half-angle.
    Cone {
        #[serde(default = "default_spread")]
        spread_degrees: f32,
    },
}

fn default_fan_yaw() -> f32 {
    60.0
}
fn default_spread() -> f32 {
    45.0
}

impl EmitterPattern {
    /// Names accepted in the `kind` tag.
    pub const NAMES: &'static [&'static str] = &["fan", "cone"];

    pub fn fan(yaw_degrees: f32, pitch_degrees: f32) -> Self {
        EmitterPattern::Fan {
            yaw_degrees,
            pitch_degrees,
        }
    }

    pub fn cone(spread_degrees: f32) -> Self {
        EmitterPattern::Cone { spread_degrees }
    }
}

impl Default for EmitterPattern {
    fn default() -> Self {
        EmitterPattern::fan(default_fan_yaw(), 0.0)
    }
}

/// Most rays a single emitter may cast.
pub const MAX_RAY_COUNT: usize = 65_536;

/// A snapshot of one ray emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emitter {
    pub position: Vec3,
    /// Orientation applied to pattern directions; identity aims down -Z.
    pub rotation: Quat,
    pub ray_count: usize,
    pub pattern: EmitterPattern,
    /// Path length after which a ray stops.
    pub max_distance: f32,
    /// Multiplies the renderer's base alpha.
    pub intensity: f32,
    pub color: Rgba,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            ray_count: 32,
            pattern: EmitterPattern::default(),
            max_distance: 25.0,
            intensity: 1.0,
            color: Rgba::MAGENTA,
        }
    }
}

impl Emitter {
    /// Emitter at `position` aimed down -Z with default settings.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: turn the emitter so local forward points along `direction`.
    pub fn aimed(mut self, direction: Vec3) -> Self {
        self.rotation = Quat::from_rotation_arc(Vec3::NEG_Z, direction.normalize_or(Vec3::NEG_Z));
        self
    }

    /// Builder: replace the pattern and ray count.
    pub fn with_pattern(mut self, pattern: EmitterPattern, ray_count: usize) -> Self {
        self.pattern = pattern;
        self.ray_count = ray_count;
        self
    }

    /// World-space forward axis.
    pub fn forward(&self) -> Vec3 {
        (self.rotation * Vec3::NEG_Z).normalize_or(Vec3::NEG_Z)
    }

    /// Worst-case number of samples this emitter can produce.
    pub fn instance_capacity(&self, steps_per_ray: usize) -> usize {
        self.ray_count
            .max(1)
            .saturating_mul(steps_per_ray.saturating_add(1))
    }

    /// Checks load-time invariants: between 1 and [`MAX_RAY_COUNT`] rays, and
    /// finite non-negative distance and intensity.
    pub fn validate(&self) -> Result<(), RayError> {
        if self.ray_count == 0 || self.ray_count > MAX_RAY_COUNT {
            return Err(RayError::InvalidRayCount(self.ray_count));
        }
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(RayError::InvalidParam {
                name: "max_distance".into(),
                reason: format!("must be finite and >= 0, got {}", self.max_distance),
            });
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(RayError::InvalidParam {
                name: "intensity".into(),
                reason: format!("must be finite and >= 0, got {}", self.intensity),
            });
        }
        Ok(())
    }
}
