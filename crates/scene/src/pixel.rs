//! Pure-computation preview rasterizer for instance lists.
//!
//! Always available (no feature gate) so callers can inspect or encode the
//! buffer themselves; [`crate::snapshot`] wraps it for PNG output.

use glam::Vec3;
use raybend_core::{CameraSnapshot, Instance};

/// Points closer than this along the view axis are not drawn.
const NEAR_PLANE: f32 = 1e-3;
/// Largest square splat edge, in pixels.
const MAX_SPLAT: f32 = 8.0;

/// Perspective pixel position of `p`, with the projected size of `world_size`.
fn project(
    p: Vec3,
    camera: &CameraSnapshot,
    focal: f32,
    width: usize,
    height: usize,
    world_size: f32,
) -> Option<(f32, f32, f32)> {
    let rel = p - camera.position;
    let depth = rel.dot(camera.forward);
    if depth <= NEAR_PLANE {
        return None;
    }
    let sx = width as f32 * 0.5 + rel.dot(camera.right) * focal / depth;
    let sy = height as f32 * 0.5 - rel.dot(camera.up) * focal / depth;
    Some((sx, sy, world_size * focal / depth))
}

/// Splats instances additively into an RGBA8 buffer of `width * height * 4` bytes.
///
/// Each instance adds `rgb * alpha` over a square whose edge is the projected
/// quad size clamped to 1..=8 pixels. The background is opaque black.
pub fn instances_to_rgba(
    instances: &[Instance],
    camera: &CameraSnapshot,
    width: usize,
    height: usize,
    fov_y_degrees: f32,
) -> Vec<u8> {
    let mut accum = vec![[0.0_f32; 3]; width * height];
    let half_fov = (fov_y_degrees.clamp(1.0, 179.0) * 0.5).to_radians();
    let focal = height as f32 * 0.5 / half_fov.tan();

    for inst in instances {
        let quad = inst.transform.matrix3.x_axis.length();
        let Some((sx, sy, size)) =
            project(inst.position(), camera, focal, width, height, quad)
        else {
            continue;
        };
        let edge = size.clamp(1.0, MAX_SPLAT) as i64;
        let x0 = (sx - edge as f32 * 0.5).round() as i64;
        let y0 = (sy - edge as f32 * 0.5).round() as i64;
        let c = inst.color;
        let add = [c.r * c.a, c.g * c.a, c.b * c.a];
        for y in y0.max(0)..(y0 + edge).min(height as i64) {
            for x in x0.max(0)..(x0 + edge).min(width as i64) {
                let px = &mut accum[y as usize * width + x as usize];
                px[0] += add[0];
                px[1] += add[1];
                px[2] += add[2];
            }
        }
    }

    accum
        .iter()
        .flat_map(|px| {
            let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            [q(px[0]), q(px[1]), q(px[2]), 255u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use raybend_core::shading::billboard;
    use proptest::prelude::*;
    use raybend_core::{GlobalFieldParams, Rgba};

    fn camera() -> CameraSnapshot {
        CameraSnapshot::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            GlobalFieldParams::default(),
        )
    }

    fn dot(at: Vec3, color: Rgba) -> Instance {
        Instance {
            transform: billboard(&camera(), at, 0.04),
            color,
        }
    }

    fn pixel(buf: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * width + x) * 4;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    #[test]
    fn buffer_has_rgba_length_and_opaque_background() {
        let buf = instances_to_rgba(&[], &camera(), 8, 4, 60.0);
        assert_eq!(buf.len(), 8 * 4 * 4);
        assert!(buf.chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn center_instance_lights_center_pixel() {
        let buf = instances_to_rgba(&[dot(Vec3::ZERO, Rgba::WHITE)], &camera(), 16, 16, 60.0);
        assert_eq!(pixel(&buf, 16, 8, 8), [255, 255, 255, 255]);
        assert_eq!(pixel(&buf, 16, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn right_and_up_map_to_screen_right_and_top() {
        let cam = camera();
        let buf = instances_to_rgba(&[dot(Vec3::new(3.0, 3.0, 0.0), Rgba::WHITE)], &cam, 32, 32, 60.0);
        let lit: Vec<(usize, usize)> = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter(|&(x, y)| pixel(&buf, 32, x, y)[0] > 0)
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| x > 16 && y < 16), "lit: {lit:?}");
    }

    #[test]
    fn blending_is_additive_and_alpha_weighted() {
        let half = Rgba::new(1.0, 0.0, 0.0, 0.25);
        let one = instances_to_rgba(&[dot(Vec3::ZERO, half)], &camera(), 16, 16, 60.0);
        let two = instances_to_rgba(&[dot(Vec3::ZERO, half), dot(Vec3::ZERO, half)], &camera(), 16, 16, 60.0);
        assert_eq!(pixel(&one, 16, 8, 8)[0], 64);
        assert_eq!(pixel(&two, 16, 8, 8)[0], 128);
        assert_eq!(pixel(&two, 16, 8, 8)[1], 0);
    }

    proptest! {
        #[test]
        fn splats_never_leave_the_buffer(
            x in -50.0f32..50.0,
            y in -50.0f32..50.0,
            z in -50.0f32..9.0,
            w in 1usize..40,
            h in 1usize..40,
        ) {
            let buf = instances_to_rgba(&[dot(Vec3::new(x, y, z), Rgba::WHITE)], &camera(), w, h, 60.0);
            prop_assert_eq!(buf.len(), w * h * 4);
        }
    }

    #[test]
    fn points_behind_camera_are_skipped() {
        let buf = instances_to_rgba(&[dot(Vec3::new(0.0, 0.0, 20.0), Rgba::WHITE)], &camera(), 8, 8, 60.0);
        assert!(buf.chunks(4).all(|p| p == [0, 0, 0, 255]));
    }
}
