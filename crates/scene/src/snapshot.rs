//! PNG output of a preview render.
//!
//! Feature-gated behind `png` (default on) so library users that only need
//! instance lists do not pull in the `image` crate. The rasterizer itself
//! lives in [`crate::pixel`].

use std::path::Path;

use raybend_core::{CameraSnapshot, Instance, RayError};

use crate::pixel::instances_to_rgba;

/// Rasterizes `instances` through `camera` and writes the result as a PNG.
///
/// Returns `RayError::InvalidParam` for a zero or oversized image, or
/// `RayError::Io` on write failure.
pub fn write_png(
    instances: &[Instance],
    camera: &CameraSnapshot,
    width: usize,
    height: usize,
    fov_y_degrees: f32,
    path: &Path,
) -> Result<(), RayError> {
    let w = image_dim("width", width)?;
    let h = image_dim("height", height)?;
    let rgba = instances_to_rgba(instances, camera, width, height, fov_y_degrees);
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| RayError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| RayError::Io(e.to_string()))
}

fn image_dim(name: &str, v: usize) -> Result<u32, RayError> {
    u32::try_from(v)
        .ok()
        .filter(|&d| d > 0)
        .ok_or_else(|| RayError::InvalidParam {
            name: name.into(),
            reason: format!("must be between 1 and {}, got {v}", u32::MAX),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scene;

    #[test]
    fn write_png_round_trip() {
        let scene = Scene::from_json_str(r#"{"camera": {}, "emitters": [{"ray_count": 4}]}"#).unwrap();
        let (renderer, _) = scene.render_frames(1);
        let camera = scene.camera_snapshot().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beams.png");

        write_png(renderer.instances(), &camera, 24, 16, 60.0, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 24);
        assert_eq!(img.height(), 16);
        assert!(img.pixels().any(|p| p.0[0] > 0), "expected some lit pixels");
    }

    #[test]
    fn zero_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(&[], &CameraSnapshot::default(), 0, 8, 60.0, &dir.path().join("x.png"))
            .unwrap_err();
        assert!(matches!(err, RayError::InvalidParam { ref name, .. } if name == "width"));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let err = write_png(
            &[],
            &CameraSnapshot::default(),
            4,
            4,
            60.0,
            Path::new("/nonexistent-dir/beams.png"),
        )
        .unwrap_err();
        assert!(matches!(err, RayError::Io(_)));
    }
}
