#![deny(unsafe_code)]
//! Scene files and CPU previews for the raybend core.
//!
//! A scene is a JSON document holding the renderer options, a camera, field
//! sources, emitters, static colliders and an optional filter plane. It plays
//! the host's role: it builds the per-frame [`FrameInputs`] snapshot and
//! answers collision queries with its analytic colliders.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use std::path::Path;

use glam::{Quat, Vec3};
use log::{debug, info};
use raybend_core::{
    BeamRenderer, CameraSnapshot, Emitter, FieldSource, FrameInputs, GlobalFieldParams,
    PlaneFilter, RayError, RendererConfig, StaticColliders,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Viewing camera as written in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub beta: f32,
    pub gamma: f32,
    /// Vertical field of view of the preview, in degrees.
    pub fov_degrees: f32,
}

impl Default for CameraSpec {
    fn default() -> Self {
        let field = GlobalFieldParams::default();
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            beta: field.beta,
            gamma: field.gamma,
            fov_degrees: 60.0,
        }
    }
}

impl CameraSpec {
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot::look_at(
            self.position,
            self.look_at,
            self.up,
            GlobalFieldParams::new(self.beta, self.gamma),
        )
    }
}

/// An emitter plus an optional world-space aim direction.
///
/// `aim` overrides `rotation` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterSpec {
    #[serde(flatten)]
    pub emitter: Emitter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aim: Option<Vec3>,
}

impl EmitterSpec {
    pub fn resolve(&self) -> Emitter {
        match self.aim {
            Some(dir) => self.emitter.clone().aimed(dir),
            None => self.emitter.clone(),
        }
    }
}

/// Transform of the node whose +Y axis is the collision filter plane normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Option<Quat>,
}

impl PlaneSpec {
    pub fn filter(&self) -> PlaneFilter {
        PlaneFilter::from_transform(self.position, self.rotation.unwrap_or(Quat::IDENTITY))
    }
}

/// On-disk layout; `config` stays raw JSON so it goes through the param helpers.
#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    config: Value,
    #[serde(default)]
    camera: Option<CameraSpec>,
    #[serde(default)]
    sources: Vec<FieldSource>,
    #[serde(default)]
    emitters: Vec<EmitterSpec>,
    #[serde(default)]
    colliders: StaticColliders,
    #[serde(default)]
    plane_filter: Option<PlaneSpec>,
    #[serde(default = "one_frame")]
    frames: usize,
}

fn one_frame() -> usize {
    1
}

/// A loaded, validated scene.
#[derive(Debug, Clone)]
pub struct Scene {
    pub config: RendererConfig,
    /// `None` renders nothing.
    pub camera: Option<CameraSpec>,
    pub sources: Vec<FieldSource>,
    pub emitters: Vec<EmitterSpec>,
    pub colliders: StaticColliders,
    pub plane_filter: Option<PlaneSpec>,
    /// Frames to tick when rendering; the last frame is the output.
    pub frames: usize,
}

impl Scene {
    /// Reads and parses a scene file.
    pub fn load(path: &Path) -> Result<Self, RayError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RayError::Io(format!("{}: {e}", path.display())))?;
        let scene = Self::from_json_str(&text)?;
        info!(
            "loaded scene {} ({} emitters, {} sources, {} colliders)",
            path.display(),
            scene.emitters.len(),
            scene.sources.len(),
            scene.colliders.len()
        );
        Ok(scene)
    }

    /// Parses and validates a scene document.
    pub fn from_json_str(text: &str) -> Result<Self, RayError> {
        let file: SceneFile =
            serde_json::from_str(text).map_err(|e| RayError::InvalidScene(e.to_string()))?;
        let scene = Self {
            config: RendererConfig::from_json(&file.config)?,
            camera: file.camera,
            sources: file.sources,
            emitters: file.emitters,
            colliders: file.colliders,
            plane_filter: file.plane_filter,
            frames: file.frames,
        };
        scene.validate()?;
        Ok(scene)
    }

    /// Checks the configuration, every source and every emitter.
    pub fn validate(&self) -> Result<(), RayError> {
        self.config.validate()?;
        self.sources.iter().try_for_each(FieldSource::validate)?;
        self.emitters.iter().try_for_each(|e| e.emitter.validate())
    }

    pub fn camera_snapshot(&self) -> Option<CameraSnapshot> {
        self.camera.as_ref().map(CameraSpec::snapshot)
    }

    /// Per-rebuild snapshot of everything the renderer reads.
    pub fn frame_inputs(&self) -> FrameInputs {
        FrameInputs {
            camera: self.camera_snapshot(),
            sources: self.sources.clone(),
            emitters: self.emitters.iter().map(EmitterSpec::resolve).collect(),
            plane_filter: self.plane_filter.as_ref().map(PlaneSpec::filter),
        }
    }

    /// Ticks a fresh renderer `frames` times (at least once) against this
    /// scene's colliders. Returns the renderer and how many ticks rebuilt.
    pub fn render_frames(&self, frames: usize) -> (BeamRenderer, usize) {
        let mut renderer = BeamRenderer::new(self.config.clone());
        let inputs = self.frame_inputs();
        let rebuilt = (0..frames.max(1))
            .filter(|_| renderer.tick(&inputs, &self.colliders))
            .count();
        debug!(
            "{} frames, {rebuilt} rebuilds, {} instances",
            frames.max(1),
            renderer.instances().len()
        );
        (renderer, rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raybend_core::{EmitterPattern, Profile, Rgba};

    const SCENE: &str = r##"{
        "config": {"steps_per_ray": 8, "stop_on_hit": true},
        "camera": {"position": [0, 0, 10], "beta": 0.5},
        "sources": [{"position": [1, 0, -2], "profile": {"kind": "gaussian", "sigma": 2}}],
        "emitters": [
            {"position": [0, 0, 0], "ray_count": 3, "color": "#ff0000"},
            {"position": [0, -1, 0], "ray_count": 2, "pattern": {"kind": "cone", "spread_degrees": 10}, "aim": [0, 1, 0]}
        ],
        "colliders": [{"kind": "sphere", "center": [0, 5, 0], "radius": 1}],
        "plane_filter": {"position": [0, -3, 0]},
        "frames": 3
    }"##;

    #[test]
    fn parses_full_scene() {
        let scene = Scene::from_json_str(SCENE).unwrap();
        assert_eq!(scene.config.steps_per_ray, 8);
        assert!(scene.config.stop_on_hit);
        assert_eq!(scene.frames, 3);
        assert_eq!(scene.sources[0].profile, Profile::gaussian(2.0));
        assert_eq!(scene.emitters[0].emitter.color, Rgba::rgb(1.0, 0.0, 0.0));
        assert_eq!(scene.emitters[1].emitter.pattern, EmitterPattern::cone(10.0));
        assert_eq!(scene.colliders.len(), 1);
        assert_eq!(scene.camera.as_ref().unwrap().gamma, 2.0);
    }

    #[test]
    fn frame_inputs_resolve_aim_and_plane() {
        let scene = Scene::from_json_str(SCENE).unwrap();
        let inputs = scene.frame_inputs();
        assert!((inputs.emitters[1].forward() - Vec3::Y).length() < 1e-5);
        assert_eq!(inputs.emitters[0].forward(), Vec3::NEG_Z);
        let plane = inputs.plane_filter.unwrap();
        assert_eq!(plane.normal, Vec3::Y);
        assert_eq!(plane.point, Vec3::new(0.0, -3.0, 0.0));
        assert!((inputs.camera.unwrap().field.beta - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn minimal_scene_uses_defaults() {
        let scene = Scene::from_json_str(r#"{"camera": {}, "emitters": [{}]}"#).unwrap();
        assert_eq!(scene.config, RendererConfig::default());
        assert_eq!(scene.frames, 1);
        assert_eq!(scene.emitters[0].emitter, Emitter::default());
        let (renderer, rebuilt) = scene.render_frames(1);
        assert_eq!(rebuilt, 1);
        assert_eq!(renderer.instances().len(), 32 * 65);
    }

    #[test]
    fn missing_camera_renders_nothing() {
        let scene = Scene::from_json_str(r#"{"emitters": [{}]}"#).unwrap();
        let (renderer, _) = scene.render_frames(2);
        assert!(renderer.instances().is_empty());
    }

    #[test]
    fn static_scene_rebuilds_once() {
        let scene = Scene::from_json_str(r#"{"camera": {}, "emitters": [{"ray_count": 2}]}"#).unwrap();
        let (_, rebuilt) = scene.render_frames(5);
        assert_eq!(rebuilt, 1);
    }

    #[test]
    fn scene_with_sources_rebuilds_every_frame() {
        let scene = Scene::from_json_str(SCENE).unwrap();
        let (renderer, rebuilt) = scene.render_frames(scene.frames);
        assert_eq!(rebuilt, 3);
        assert!(!renderer.instances().is_empty());
    }

    #[test]
    fn malformed_json_is_invalid_scene() {
        let err = Scene::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, RayError::InvalidScene(_)));
    }

    #[test]
    fn invalid_source_is_rejected() {
        let err = Scene::from_json_str(r#"{"sources": [{"softening": 0}]}"#).unwrap_err();
        assert!(matches!(err, RayError::InvalidSoftening(_)));
    }

    #[test]
    fn zero_ray_emitter_is_rejected() {
        let err = Scene::from_json_str(r#"{"emitters": [{"ray_count": 0}]}"#).unwrap_err();
        assert!(matches!(err, RayError::InvalidRayCount(0)));
    }

    #[test]
    fn bad_config_is_rejected() {
        let err = Scene::from_json_str(r#"{"config": 3}"#).unwrap_err();
        assert!(matches!(err, RayError::ParamTypeMismatch { .. }));
    }

    #[test]
    fn load_reports_missing_file_as_io() {
        let err = Scene::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, RayError::Io(_)));
    }
}
