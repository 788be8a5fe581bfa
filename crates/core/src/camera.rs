//! Camera-like collaborator state captured once per rebuild.

use glam::{Mat3, Quat, Vec3};

use crate::field::GlobalFieldParams;

/// World position, orthonormal basis and field parameters of the viewing camera.
///
/// The basis follows the usual right-handed convention: right is +X, up is
/// +Y and the camera looks down -Z of its transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub field: GlobalFieldParams,
}

impl CameraSnapshot {
    /// Snapshot from a position and orientation.
    pub fn from_rotation(position: Vec3, rotation: Quat, field: GlobalFieldParams) -> Self {
        let basis = Mat3::from_quat(rotation);
        Self::from_basis(position, basis, field)
    }

    /// Snapshot from a (possibly scaled) basis matrix. Axes are normalized.
    pub fn from_basis(position: Vec3, basis: Mat3, field: GlobalFieldParams) -> Self {
        Self {
            position,
            right: basis.x_axis.normalize_or(Vec3::X),
            up: basis.y_axis.normalize_or(Vec3::Y),
            forward: (-basis.z_axis).normalize_or(Vec3::NEG_Z),
            field,
        }
    }

    /// Camera at `position` looking at `target`.
    ///
    /// Falls back to looking down -Z when `target` coincides with `position`,
    /// and picks another up vector when `up` is parallel to the view direction.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3, field: GlobalFieldParams) -> Self {
        let forward = (target - position).normalize_or(Vec3::NEG_Z);
        let mut right = forward.cross(up);
        if right.length_squared() < 1e-12 {
            right = forward.cross(Vec3::Z);
            if right.length_squared() < 1e-12 {
                right = forward.cross(Vec3::X);
            }
        }
        let right = right.normalize_or(Vec3::X);
        let up = right.cross(forward).normalize_or(Vec3::Y);
        Self {
            position,
            right,
            up,
            forward,
            field,
        }
    }
}

impl Default for CameraSnapshot {
    fn default() -> Self {
        Self::from_rotation(Vec3::ZERO, Quat::IDENTITY, GlobalFieldParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rotation_looks_down_negative_z() {
        let cam = CameraSnapshot::default();
        assert_eq!(cam.right, Vec3::X);
        assert_eq!(cam.up, Vec3::Y);
        assert_eq!(cam.forward, Vec3::NEG_Z);
    }

    #[test]
    fn from_basis_normalizes_scaled_axes() {
        let cam = CameraSnapshot::from_basis(
            Vec3::ZERO,
            Mat3::from_diagonal(Vec3::new(2.0, 3.0, 4.0)),
            GlobalFieldParams::default(),
        );
        assert!((cam.right.length() - 1.0).abs() < 1e-6);
        assert!((cam.up.length() - 1.0).abs() < 1e-6);
        assert!((cam.forward.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn look_at_builds_orthonormal_basis() {
        let cam = CameraSnapshot::look_at(
            Vec3::new(0.0, 2.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            GlobalFieldParams::default(),
        );
        assert!(cam.right.dot(cam.up).abs() < 1e-5);
        assert!(cam.right.dot(cam.forward).abs() < 1e-5);
        assert!(cam.up.dot(cam.forward).abs() < 1e-5);
        assert!(cam.forward.z < 0.0);
        assert!(cam.up.y > 0.0);
    }

    #[test]
    fn look_at_survives_parallel_up() {
        let cam = CameraSnapshot::look_at(
            Vec3::ZERO,
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::Y,
            GlobalFieldParams::default(),
        );
        assert!(cam.right.is_finite() && cam.up.is_finite());
        assert!((cam.right.length() - 1.0).abs() < 1e-5);
    }
}
