//! Per-frame orchestration: the change gate and the full instance rebuild.

use glam::Vec3;
use log::debug;

use crate::camera::CameraSnapshot;
use crate::collision::{CollisionQuery, PlaneFilter};
use crate::config::RendererConfig;
use crate::emitter::Emitter;
use crate::field::GlobalFieldParams;
use crate::field_source::FieldSource;
use crate::integrator::{FieldModel, FieldSnapshot, RayIntegrator};
use crate::prng::Xorshift64;
use crate::sampler::sample_direction;
use crate::shading::Instance;

/// Everything a rebuild reads from the host, captured once per frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInputs {
    /// Viewing camera; without one the output is empty.
    pub camera: Option<CameraSnapshot>,
    pub sources: Vec<FieldSource>,
    pub emitters: Vec<Emitter>,
    pub plane_filter: Option<PlaneFilter>,
}

/// Largest instance buffer reserved before tracing; longer outputs grow on demand.
const MAX_UPFRONT_RESERVE: usize = 1 << 20;

impl FrameInputs {
    /// Upper bound on the number of instances a rebuild can produce.
    pub fn capacity(&self, steps_per_ray: usize) -> usize {
        self.emitters
            .iter()
            .map(|e| e.instance_capacity(steps_per_ray))
            .fold(0usize, usize::saturating_add)
    }
}

/// Owns the configuration, the change-gate cache and the instance buffer.
#[derive(Debug, Clone)]
pub struct BeamRenderer {
    config: RendererConfig,
    /// Field parameters of the last rebuild; `None` until the first one.
    last_field: Option<GlobalFieldParams>,
    /// Set when the configuration changed since the last rebuild.
    rebuild_pending: bool,
    instances: Vec<Instance>,
}

impl BeamRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            last_field: None,
            rebuild_pending: true,
            instances: Vec::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Replaces the configuration and forces the next tick to rebuild.
    pub fn set_config(&mut self, config: RendererConfig) {
        self.config = config;
        self.rebuild_pending = true;
    }

    /// Instances of the last rebuild, emitter-major, then ray-major, then step-major.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Field parameters cached by the last rebuild.
    pub fn last_field(&self) -> Option<GlobalFieldParams> {
        self.last_field
    }

    /// True when the next tick would rebuild.
    ///
    /// Field sources may move between frames, so any source forces a
    /// rebuild. Otherwise only a change in camera field parameters does.
    pub fn needs_rebuild(&self, inputs: &FrameInputs) -> bool {
        if self.rebuild_pending || self.config.rebuild_every_frame || !inputs.sources.is_empty() {
            return true;
        }
        match (inputs.camera.map(|c| c.field), self.last_field) {
            (Some(now), Some(last)) => !now.approx_eq(&last),
            (None, None) => false,
            _ => true,
        }
    }

    /// Rebuilds when the gate says so. Returns whether a rebuild ran.
    pub fn tick(&mut self, inputs: &FrameInputs, query: &dyn CollisionQuery) -> bool {
        if !self.needs_rebuild(inputs) {
            return false;
        }
        self.rebuild(inputs, query);
        true
    }

    /// Regenerates every instance from `inputs`.
    pub fn rebuild(&mut self, inputs: &FrameInputs, query: &dyn CollisionQuery) {
        self.rebuild_pending = false;
        self.instances.clear();
        self.last_field = inputs.camera.map(|c| c.field);

        let Some(camera) = inputs.camera.as_ref() else {
            debug!("rebuild skipped: no camera");
            return;
        };
        if inputs.emitters.is_empty() {
            debug!("rebuild skipped: no emitters");
            return;
        }

        let cfg = &self.config;
        let capacity = inputs.capacity(cfg.steps_per_ray);
        self.instances.reserve(capacity.min(MAX_UPFRONT_RESERVE));

        let model = if inputs.sources.is_empty() {
            FieldModel::Center(self.fallback_center(camera))
        } else {
            FieldModel::Sources(&inputs.sources)
        };
        let detector = cfg.detector(inputs.plane_filter);
        let integrator = RayIntegrator {
            config: cfg,
            field: FieldSnapshot {
                model,
                global: camera.field,
                tuning: cfg.tuning(),
            },
            camera,
            detector: &detector,
            query,
        };
        let shading = cfg.shading();
        let mut rng = Xorshift64::for_rebuild();

        for emitter in &inputs.emitters {
            for ray in 0..emitter.ray_count.max(1) {
                let dir = sample_direction(emitter, ray, &mut rng);
                let trace = integrator.trace(emitter.position, dir, emitter.max_distance);
                self.instances.extend(trace.samples.iter().map(|s| Instance {
                    transform: shading.billboard(camera, s.position),
                    color: shading.shade(emitter.color, emitter.intensity, s.step, s.accel_magnitude),
                }));
            }
        }
        self.instances.truncate(capacity);

        debug!(
            "rebuilt {} instances from {} emitters and {} sources (capacity {capacity})",
            self.instances.len(),
            inputs.emitters.len(),
            inputs.sources.len(),
        );
    }

    fn fallback_center(&self, camera: &CameraSnapshot) -> Vec3 {
        if self.config.field_center_is_camera {
            camera.position
        } else {
            self.config.field_center
        }
    }
}

impl Default for BeamRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}
