//! Per-sample shading: distance fade, field tint and the camera-facing billboard.

use glam::{Affine3A, Mat3A, Vec3, Vec3A};
use serde::Serialize;

use crate::camera::CameraSnapshot;
use crate::color::Rgba;

/// One rendered sample handed to the instanced renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub transform: Affine3A,
    pub color: Rgba,
}

impl Instance {
    /// World position of the billboard center.
    pub fn position(&self) -> Vec3 {
        self.transform.translation.into()
    }
}

/// Flat, serializable form of an [`Instance`] for dumps.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceRecord {
    pub position: [f32; 3],
    /// Column-major 3x3 basis.
    pub basis: [f32; 9],
    pub color: Rgba,
}

impl From<&Instance> for InstanceRecord {
    fn from(inst: &Instance) -> Self {
        Self {
            position: inst.position().to_array(),
            basis: inst.transform.matrix3.to_cols_array(),
            color: inst.color,
        }
    }
}

/// Shading inputs that stay fixed for a whole rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    pub steps_per_ray: usize,
    pub alpha: f32,
    pub quad_size: f32,
    pub color_by_field: bool,
    pub field_color_gain: f32,
    pub hot_color: Rgba,
}

/// Quadratic fade-out along the ray: `(1 - step / steps)^2`.
pub fn fade(step: usize, steps_per_ray: usize) -> f32 {
    let progress = if steps_per_ray == 0 {
        0.0
    } else {
        step as f32 / steps_per_ray as f32
    };
    let remain = 1.0 - progress;
    remain * remain
}

impl ShadingParams {
    /// Final alpha of sample `step`, clamped to `[0, 1]`.
    pub fn alpha_at(&self, step: usize, intensity: f32) -> f32 {
        (self.alpha * intensity * fade(step, self.steps_per_ray)).clamp(0.0, 1.0)
    }

    /// Color of a sample feeling `accel_magnitude`, before alpha is applied.
    pub fn tint(&self, base: Rgba, accel_magnitude: f32) -> Rgba {
        if !self.color_by_field {
            return base;
        }
        let heat = (accel_magnitude * self.field_color_gain).clamp(0.0, 1.0);
        base.lerp(self.hot_color, heat)
    }

    /// Full RGBA of one sample.
    pub fn shade(&self, base: Rgba, intensity: f32, step: usize, accel_magnitude: f32) -> Rgba {
        self.tint(base, accel_magnitude)
            .with_alpha(self.alpha_at(step, intensity))
    }

    /// Camera-facing quad at `position`, sized by `quad_size`.
    pub fn billboard(&self, camera: &CameraSnapshot, position: Vec3) -> Affine3A {
        billboard(camera, position, self.quad_size)
    }
}

/// Transform whose X/Y axes are the camera right/up scaled by `quad_size`
/// and whose Z axis is the unscaled camera forward.
pub fn billboard(camera: &CameraSnapshot, position: Vec3, quad_size: f32) -> Affine3A {
    let basis = Mat3A::from_cols(
        Vec3A::from(camera.right * quad_size),
        Vec3A::from(camera.up * quad_size),
        Vec3A::from(camera.forward),
    );
    Affine3A {
        matrix3: basis,
        translation: position.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ShadingParams {
        ShadingParams {
            steps_per_ray: 10,
            alpha: 0.5,
            quad_size: 0.04,
            color_by_field: true,
            field_color_gain: 0.5,
            hot_color: Rgba::CYAN_GLOW,
        }
    }

    #[test]
    fn fade_is_quadratic() {
        assert_eq!(fade(0, 10), 1.0);
        assert!((fade(5, 10) - 0.25).abs() < 1e-6);
        assert_eq!(fade(10, 10), 0.0);
    }

    #[test]
    fn zero_steps_means_no_fade() {
        assert_eq!(fade(0, 0), 1.0);
        assert_eq!(fade(3, 0), 1.0);
    }

    #[test]
    fn alpha_is_clamped() {
        let p = params();
        assert!((p.alpha_at(0, 1.0) - 0.5).abs() < 1e-6);
        assert_eq!(p.alpha_at(0, 10.0), 1.0);
        assert_eq!(p.alpha_at(0, -1.0), 0.0);
    }

    #[test]
    fn tint_blends_toward_hot_color() {
        let p = params();
        assert_eq!(p.tint(Rgba::MAGENTA, 0.0), Rgba::MAGENTA);
        assert_eq!(p.tint(Rgba::MAGENTA, 100.0), Rgba::CYAN_GLOW);
        let half = p.tint(Rgba::BLACK, 1.0);
        assert!((half.g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tint_disabled_keeps_base() {
        let p = ShadingParams {
            color_by_field: false,
            ..params()
        };
        assert_eq!(p.tint(Rgba::MAGENTA, 100.0), Rgba::MAGENTA);
    }

    #[test]
    fn shade_replaces_alpha() {
        let c = params().shade(Rgba::WHITE, 1.0, 5, 0.0);
        assert!((c.a - 0.125).abs() < 1e-6);
        assert_eq!(c.r, 1.0);
    }

    #[test]
    fn billboard_scales_right_and_up_only() {
        let cam = CameraSnapshot::default();
        let t = billboard(&cam, Vec3::new(1.0, 2.0, 3.0), 0.1);
        assert!((t.matrix3.x_axis.length() - 0.1).abs() < 1e-6);
        assert!((t.matrix3.y_axis.length() - 0.1).abs() < 1e-6);
        assert!((t.matrix3.z_axis.length() - 1.0).abs() < 1e-6);
        assert_eq!(Vec3::from(t.translation), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn record_flattens_instance() {
        let inst = Instance {
            transform: billboard(&CameraSnapshot::default(), Vec3::X, 1.0),
            color: Rgba::WHITE,
        };
        let rec = InstanceRecord::from(&inst);
        assert_eq!(rec.position, [1.0, 0.0, 0.0]);
        assert_eq!(rec.basis[0], 1.0);
        assert_eq!(rec.basis[8], -1.0);
    }
}
