//! Static analytic colliders answering [`CollisionQuery`].
//!
//! Stands in for a host physics world in tests, the CLI and hosts without
//! one. Shapes are static and filtered by layer bits against the query mask.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionQuery;

/// Geometry of one static collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Infinite two-sided plane.
    Plane { point: Vec3, normal: Vec3 },
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box between `min` and `max`.
    Aabb { min: Vec3, max: Vec3 },
}

impl Shape {
    /// Earliest `t` in `[0, 1]` at which `from + t * motion` touches this
    /// shape grown by `inflate`. Starting inside reports `t = 0`.
    fn first_contact(&self, from: Vec3, motion: Vec3, inflate: f32) -> Option<f32> {
        match *self {
            Shape::Plane { point, normal } => {
                let n = normal.normalize_or(Vec3::Y);
                let d0 = n.dot(from - point);
                let d1 = n.dot(from + motion - point);
                if d0.abs() <= inflate {
                    return Some(0.0);
                }
                let target = if d0 > 0.0 { inflate } else { -inflate };
                let reaches = if d0 > 0.0 { d1 <= target } else { d1 >= target };
                reaches.then(|| (d0 - target) / (d0 - d1))
            }
            Shape::Sphere { center, radius } => {
                let r = radius + inflate;
                let m = from - center;
                let c = m.length_squared() - r * r;
                if c <= 0.0 {
                    return Some(0.0);
                }
                let a = motion.length_squared();
                if a <= f32::EPSILON {
                    return None;
                }
                let b = m.dot(motion);
                let disc = b * b - a * c;
                if b > 0.0 || disc < 0.0 {
                    return None;
                }
                let t = (-b - disc.sqrt()) / a;
                (0.0..=1.0).contains(&t).then_some(t)
            }
            Shape::Aabb { min, max } => {
                let lo = min.min(max) - Vec3::splat(inflate);
                let hi = min.max(max) + Vec3::splat(inflate);
                let mut t_enter = 0.0_f32;
                let mut t_exit = 1.0_f32;
                for axis in 0..3 {
                    let (o, d) = (from[axis], motion[axis]);
                    if d.abs() <= f32::EPSILON {
                        if o < lo[axis] || o > hi[axis] {
                            return None;
                        }
                        continue;
                    }
                    let t0 = (lo[axis] - o) / d;
                    let t1 = (hi[axis] - o) / d;
                    t_enter = t_enter.max(t0.min(t1));
                    t_exit = t_exit.min(t0.max(t1));
                    if t_enter > t_exit {
                        return None;
                    }
                }
                Some(t_enter)
            }
        }
    }
}

/// A shape plus the collision layers it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default = "all_layers")]
    pub layers: u32,
}

fn all_layers() -> u32 {
    u32::MAX
}

impl Collider {
    /// Collider on every layer.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            layers: u32::MAX,
        }
    }
}

/// A fixed set of colliders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticColliders {
    colliders: Vec<Collider>,
}

impl StaticColliders {
    pub fn new(colliders: Vec<Collider>) -> Self {
        Self { colliders }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn earliest(&self, from: Vec3, motion: Vec3, inflate: f32, mask: u32) -> Option<f32> {
        self.colliders
            .iter()
            .filter(|c| c.layers & mask != 0)
            .filter_map(|c| c.shape.first_contact(from, motion, inflate))
            .min_by(f32::total_cmp)
    }
}

impl CollisionQuery for StaticColliders {
    fn cast_sphere(&self, from: Vec3, motion: Vec3, radius: f32, mask: u32) -> Option<f32> {
        self.earliest(from, motion, radius.max(0.0), mask)
    }

    fn cast_ray(&self, from: Vec3, to: Vec3, mask: u32) -> Option<Vec3> {
        let motion = to - from;
        self.earliest(from, motion, 0.0, mask)
            .map(|t| from + motion * t)
    }
}
