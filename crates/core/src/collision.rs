//! Two-tier segment collision: an optional plane broad phase, then a
//! pluggable narrow phase that asks the host's collision queries.

use glam::{Quat, Vec3};

/// Segments shorter than this never hit.
const MIN_SEGMENT_LENGTH: f32 = 1e-6;
/// Smallest radius handed to sphere casts.
const MIN_SWEEP_RADIUS: f32 = 0.0005;
/// Upper bound on raycast subdivisions regardless of configuration.
pub const SUBSTEP_CEILING: usize = 64;

/// Collision queries answered by the host's physics world.
///
/// Both queries must be pure: the same arguments give the same answer for
/// the duration of one rebuild.
pub trait CollisionQuery {
    /// Sweeps a sphere of `radius` from `from` along `motion`.
    ///
    /// Returns the fraction of `motion` travelled before first contact, or
    /// `None` when nothing selected by `mask` is touched.
    fn cast_sphere(&self, from: Vec3, motion: Vec3, radius: f32, mask: u32) -> Option<f32>;

    /// Casts a zero-width ray from `from` to `to`, returning the first hit point.
    fn cast_ray(&self, from: Vec3, to: Vec3, mask: u32) -> Option<Vec3>;
}

/// A world with nothing to hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCollision;

impl CollisionQuery for NoCollision {
    fn cast_sphere(&self, _from: Vec3, _motion: Vec3, _radius: f32, _mask: u32) -> Option<f32> {
        None
    }

    fn cast_ray(&self, _from: Vec3, _to: Vec3, _mask: u32) -> Option<Vec3> {
        None
    }
}

/// Narrow-phase strategy deciding whether segment `a -> b` hits anything.
pub trait NarrowPhase {
    fn hit(&self, query: &dyn CollisionQuery, a: Vec3, b: Vec3) -> Option<Vec3>;
}

/// Treats the beam as a sphere swept along the segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSweep {
    pub radius: f32,
    pub mask: u32,
}

impl NarrowPhase for SphereSweep {
    fn hit(&self, query: &dyn CollisionQuery, a: Vec3, b: Vec3) -> Option<Vec3> {
        let motion = b - a;
        if motion.length() <= MIN_SEGMENT_LENGTH {
            return None;
        }
        let radius = self.radius.max(MIN_SWEEP_RADIUS);
        query
            .cast_sphere(a, motion, radius, self.mask)
            .filter(|t| *t < 1.0)
            .map(|t| a + motion * t.max(0.0))
    }
}

/// Approximates a thick beam with several short zero-width rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubdividedRaycast {
    /// Longest sub-ray before the segment is split further.
    pub threshold: f32,
    pub max_substeps: usize,
    pub mask: u32,
}

impl SubdividedRaycast {
    /// Number of sub-rays used for a segment of `length`.
    pub fn substeps(&self, length: f32) -> usize {
        let mut sub = 1;
        if self.threshold > 0.0 && length > self.threshold {
            sub = (length / self.threshold).ceil() as usize;
        }
        sub.clamp(1, self.max_substeps.clamp(1, SUBSTEP_CEILING))
    }
}

impl NarrowPhase for SubdividedRaycast {
    fn hit(&self, query: &dyn CollisionQuery, a: Vec3, b: Vec3) -> Option<Vec3> {
        let d = b - a;
        let len = d.length();
        if len <= MIN_SEGMENT_LENGTH {
            return None;
        }
        let steps = self.substeps(len);
        let mut prev = a;
        for i in 1..=steps {
            let cur = a + d * (i as f32 / steps as f32);
            if let Some(p) = query.cast_ray(prev, cur, self.mask) {
                return Some(p);
            }
            prev = cur;
        }
        None
    }
}

/// Reference plane used to skip segments that cannot reach the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFilter {
    pub normal: Vec3,
    pub point: Vec3,
}

impl PlaneFilter {
    /// Plane through `point` with the given normal (normalized, +Y fallback).
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal: normal.normalize_or(Vec3::Y),
            point,
        }
    }

    /// Plane of a node's transform: its +Y axis through its origin.
    pub fn from_transform(position: Vec3, rotation: Quat) -> Self {
        Self::new(rotation * Vec3::Y, position)
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.point)
    }

    /// True when the segment touches the plane within `eps` or straddles it.
    pub fn may_cross(&self, a: Vec3, b: Vec3, eps: f32) -> bool {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        if da.abs() <= eps || db.abs() <= eps {
            return true;
        }
        (da > 0.0) != (db > 0.0)
    }
}

/// Broad phase plus narrow phase for beam segments.
pub struct CollisionDetector {
    filter: Option<PlaneFilter>,
    filter_eps: f32,
    narrow: Box<dyn NarrowPhase>,
}

impl CollisionDetector {
    pub fn new(narrow: Box<dyn NarrowPhase>) -> Self {
        Self {
            filter: None,
            filter_eps: 0.001,
            narrow,
        }
    }

    /// Builder: reject segments that cannot cross `filter` (within `eps`).
    pub fn with_plane_filter(mut self, filter: PlaneFilter, eps: f32) -> Self {
        self.filter = Some(filter);
        self.filter_eps = eps;
        self
    }

    pub fn plane_filter(&self) -> Option<&PlaneFilter> {
        self.filter.as_ref()
    }

    /// Hit position for segment `a -> b`, or `None`.
    pub fn test_segment(&self, query: &dyn CollisionQuery, a: Vec3, b: Vec3) -> Option<Vec3> {
        if let Some(plane) = &self.filter {
            if !plane.may_cross(a, b, self.filter_eps) {
                return None;
            }
        }
        self.narrow.hit(query, a, b)
    }
}
