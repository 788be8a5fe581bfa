//! Renderer configuration: every recognized option with its default.
//!
//! Options are read from a JSON object with the `param_*` helpers, so a
//! missing or malformed key falls back to its default. Range checks happen
//! afterwards in [`RendererConfig::validate`].

use glam::Vec3;
use serde_json::{json, Value};

use crate::collision::{CollisionDetector, NarrowPhase, PlaneFilter, SphereSweep, SubdividedRaycast};
use crate::color::Rgba;
use crate::error::RayError;
use crate::field::FieldTuning;
use crate::params::{
    json_type_name, param_bool, param_color, param_f32, param_u32, param_usize, param_vec3,
};
use crate::shading::ShadingParams;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_STEPS_PER_RAY: usize = 64;
pub const DEFAULT_STEP_LENGTH: f32 = 0.25;
pub const DEFAULT_MIN_STEP_LENGTH: f32 = 0.05;
pub const DEFAULT_MAX_STEP_LENGTH: f32 = 0.5;
pub const DEFAULT_STEP_ADAPT_GAIN: f32 = 0.05;
pub const DEFAULT_BEND_SCALE: f32 = 0.12;
pub const DEFAULT_FIELD_STRENGTH: f32 = 1.0;
pub const DEFAULT_ALPHA: f32 = 0.2;
pub const DEFAULT_QUAD_SIZE: f32 = 0.04;
pub const DEFAULT_FIELD_COLOR_GAIN: f32 = 0.15;
pub const DEFAULT_COLLISION_RADIUS: f32 = 0.03;
pub const DEFAULT_SUBDIVIDE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_MAX_COLLISION_SUBSTEPS: usize = 16;
pub const DEFAULT_MAX_ACCELERATION: f32 = 50.0;

pub const MAX_STEPS_PER_RAY: usize = 4096;
pub const MAX_STEP_ADAPT_GAIN: f32 = 10.0;

/// All renderer options.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub steps_per_ray: usize,
    pub step_length: f32,
    pub min_step_length: f32,
    pub max_step_length: f32,
    pub step_adapt_gain: f32,
    pub bend_scale: f32,
    pub field_strength: f32,
    pub max_acceleration: f32,

    pub alpha: f32,
    pub quad_size: f32,
    pub color_by_field: bool,
    pub field_color_gain: f32,
    pub hot_color: Rgba,

    pub stop_on_hit: bool,
    pub collision_mask: u32,
    pub collision_radius: f32,
    pub use_sphere_sweep_collision: bool,
    pub collision_every_n_steps: usize,
    pub render_every_n_steps: usize,
    pub use_insight_plane_filter: bool,
    pub collision_ray_subdivide_threshold: f32,
    pub max_collision_substeps: usize,

    pub use_integrated_field: bool,
    pub field_center: Vec3,
    pub field_center_is_camera: bool,
    pub rebuild_every_frame: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            steps_per_ray: DEFAULT_STEPS_PER_RAY,
            step_length: DEFAULT_STEP_LENGTH,
            min_step_length: DEFAULT_MIN_STEP_LENGTH,
            max_step_length: DEFAULT_MAX_STEP_LENGTH,
            step_adapt_gain: DEFAULT_STEP_ADAPT_GAIN,
            bend_scale: DEFAULT_BEND_SCALE,
            field_strength: DEFAULT_FIELD_STRENGTH,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            alpha: DEFAULT_ALPHA,
            quad_size: DEFAULT_QUAD_SIZE,
            color_by_field: true,
            field_color_gain: DEFAULT_FIELD_COLOR_GAIN,
            hot_color: Rgba::CYAN_GLOW,
            stop_on_hit: false,
            collision_mask: u32::MAX,
            collision_radius: DEFAULT_COLLISION_RADIUS,
            use_sphere_sweep_collision: true,
            collision_every_n_steps: 1,
            render_every_n_steps: 1,
            use_insight_plane_filter: true,
            collision_ray_subdivide_threshold: DEFAULT_SUBDIVIDE_THRESHOLD,
            max_collision_substeps: DEFAULT_MAX_COLLISION_SUBSTEPS,
            use_integrated_field: true,
            field_center: Vec3::ZERO,
            field_center_is_camera: true,
            rebuild_every_frame: false,
        }
    }
}

impl RendererConfig {
    /// Reads options from a JSON object, then validates them.
    ///
    /// `null` means "all defaults". Any other non-object value is a
    /// [`RayError::ParamTypeMismatch`].
    pub fn from_json(params: &Value) -> Result<Self, RayError> {
        if !(params.is_object() || params.is_null()) {
            return Err(RayError::ParamTypeMismatch {
                name: "config".into(),
                expected: "object".into(),
                got: json_type_name(params).into(),
            });
        }
        let d = Self::default();
        let cfg = Self {
            steps_per_ray: param_usize(params, "steps_per_ray", d.steps_per_ray),
            step_length: param_f32(params, "step_length", d.step_length),
            min_step_length: param_f32(params, "min_step_length", d.min_step_length),
            max_step_length: param_f32(params, "max_step_length", d.max_step_length),
            step_adapt_gain: param_f32(params, "step_adapt_gain", d.step_adapt_gain),
            bend_scale: param_f32(params, "bend_scale", d.bend_scale),
            field_strength: param_f32(params, "field_strength", d.field_strength),
            max_acceleration: param_f32(params, "max_acceleration", d.max_acceleration),
            alpha: param_f32(params, "alpha", d.alpha),
            quad_size: param_f32(params, "quad_size", d.quad_size),
            color_by_field: param_bool(params, "color_by_field", d.color_by_field),
            field_color_gain: param_f32(params, "field_color_gain", d.field_color_gain),
            hot_color: param_color(params, "hot_color", d.hot_color),
            stop_on_hit: param_bool(params, "stop_on_hit", d.stop_on_hit),
            collision_mask: param_u32(params, "collision_mask", d.collision_mask),
            collision_radius: param_f32(params, "collision_radius", d.collision_radius),
            use_sphere_sweep_collision: param_bool(
                params,
                "use_sphere_sweep_collision",
                d.use_sphere_sweep_collision,
            ),
            collision_every_n_steps: param_usize(
                params,
                "collision_every_n_steps",
                d.collision_every_n_steps,
            ),
            render_every_n_steps: param_usize(
                params,
                "render_every_n_steps",
                d.render_every_n_steps,
            ),
            use_insight_plane_filter: param_bool(
                params,
                "use_insight_plane_filter",
                d.use_insight_plane_filter,
            ),
            collision_ray_subdivide_threshold: param_f32(
                params,
                "collision_ray_subdivide_threshold",
                d.collision_ray_subdivide_threshold,
            ),
            max_collision_substeps: param_usize(
                params,
                "max_collision_substeps",
                d.max_collision_substeps,
            ),
            use_integrated_field: param_bool(params, "use_integrated_field", d.use_integrated_field),
            field_center: param_vec3(params, "field_center", d.field_center),
            field_center_is_camera: param_bool(
                params,
                "field_center_is_camera",
                d.field_center_is_camera,
            ),
            rebuild_every_frame: param_bool(params, "rebuild_every_frame", d.rebuild_every_frame),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks option ranges.
    pub fn validate(&self) -> Result<(), RayError> {
        let lengths_ok = self.min_step_length.is_finite()
            && self.max_step_length.is_finite()
            && self.min_step_length > 0.0
            && self.min_step_length <= self.max_step_length;
        if !lengths_ok {
            return Err(RayError::InvalidStepLengths {
                min: self.min_step_length,
                max: self.max_step_length,
            });
        }
        if self.steps_per_ray > MAX_STEPS_PER_RAY {
            return Err(RayError::InvalidParam {
                name: "steps_per_ray".into(),
                reason: format!("must be <= {MAX_STEPS_PER_RAY}, got {}", self.steps_per_ray),
            });
        }
        positive("step_length", self.step_length)?;
        within("step_adapt_gain", self.step_adapt_gain, MAX_STEP_ADAPT_GAIN)?;
        non_negative("max_acceleration", self.max_acceleration)?;
        within("alpha", self.alpha, 1.0)?;
        non_negative("quad_size", self.quad_size)?;
        non_negative("collision_radius", self.collision_radius)?;
        positive(
            "collision_ray_subdivide_threshold",
            self.collision_ray_subdivide_threshold,
        )?;
        finite("bend_scale", self.bend_scale)?;
        finite("field_strength", self.field_strength)?;
        finite("field_color_gain", self.field_color_gain)?;
        at_least_one("collision_every_n_steps", self.collision_every_n_steps)?;
        at_least_one("render_every_n_steps", self.render_every_n_steps)?;
        at_least_one("max_collision_substeps", self.max_collision_substeps)?;
        Ok(())
    }

    /// Amplitude multipliers shared by every source.
    pub fn tuning(&self) -> FieldTuning {
        FieldTuning {
            bend_scale: self.bend_scale,
            field_strength: self.field_strength,
        }
    }

    pub fn shading(&self) -> ShadingParams {
        ShadingParams {
            steps_per_ray: self.steps_per_ray,
            alpha: self.alpha,
            quad_size: self.quad_size,
            color_by_field: self.color_by_field,
            field_color_gain: self.field_color_gain,
            hot_color: self.hot_color,
        }
    }

    /// Narrow-phase strategy selected by `use_sphere_sweep_collision`.
    pub fn narrow_phase(&self) -> Box<dyn NarrowPhase> {
        if self.use_sphere_sweep_collision {
            Box::new(SphereSweep {
                radius: self.collision_radius,
                mask: self.collision_mask,
            })
        } else {
            Box::new(SubdividedRaycast {
                threshold: self.collision_ray_subdivide_threshold,
                max_substeps: self.max_collision_substeps,
                mask: self.collision_mask,
            })
        }
    }

    /// Detector for one rebuild. The plane filter is used only when enabled
    /// and present; its tolerance is the collision radius.
    pub fn detector(&self, plane: Option<PlaneFilter>) -> CollisionDetector {
        let detector = CollisionDetector::new(self.narrow_phase());
        match plane {
            Some(p) if self.use_insight_plane_filter => {
                detector.with_plane_filter(p, self.collision_radius)
            }
            _ => detector,
        }
    }

    /// Current option values as a JSON object.
    pub fn params(&self) -> Value {
        json!({
            "steps_per_ray": self.steps_per_ray,
            "step_length": self.step_length,
            "min_step_length": self.min_step_length,
            "max_step_length": self.max_step_length,
            "step_adapt_gain": self.step_adapt_gain,
            "bend_scale": self.bend_scale,
            "field_strength": self.field_strength,
            "max_acceleration": self.max_acceleration,
            "alpha": self.alpha,
            "quad_size": self.quad_size,
            "color_by_field": self.color_by_field,
            "field_color_gain": self.field_color_gain,
            "hot_color": self.hot_color.to_hex(),
            "stop_on_hit": self.stop_on_hit,
            "collision_mask": self.collision_mask,
            "collision_radius": self.collision_radius,
            "use_sphere_sweep_collision": self.use_sphere_sweep_collision,
            "collision_every_n_steps": self.collision_every_n_steps,
            "render_every_n_steps": self.render_every_n_steps,
            "use_insight_plane_filter": self.use_insight_plane_filter,
            "collision_ray_subdivide_threshold": self.collision_ray_subdivide_threshold,
            "max_collision_substeps": self.max_collision_substeps,
            "use_integrated_field": self.use_integrated_field,
            "field_center": self.field_center.to_array(),
            "field_center_is_camera": self.field_center_is_camera,
            "rebuild_every_frame": self.rebuild_every_frame,
        })
    }

    /// Type, default, range and description of every option.
    pub fn param_schema() -> Value {
        json!({
            "steps_per_ray": {
                "type": "integer",
                "default": DEFAULT_STEPS_PER_RAY,
                "min": 0,
                "max": MAX_STEPS_PER_RAY,
                "description": "Integration steps per ray; each ray yields at most steps + 1 samples"
            },
            "step_length": {
                "type": "number",
                "default": DEFAULT_STEP_LENGTH,
                "min": 0.0,
                "description": "Base step length before field adaptation"
            },
            "min_step_length": {
                "type": "number",
                "default": DEFAULT_MIN_STEP_LENGTH,
                "min": 0.0,
                "description": "Lower bound of the adaptive step"
            },
            "max_step_length": {
                "type": "number",
                "default": DEFAULT_MAX_STEP_LENGTH,
                "min": 0.0,
                "description": "Upper bound of the adaptive step"
            },
            "step_adapt_gain": {
                "type": "number",
                "default": DEFAULT_STEP_ADAPT_GAIN,
                "min": 0.0,
                "max": MAX_STEP_ADAPT_GAIN,
                "description": "How strongly field magnitude shrinks the step"
            },
            "bend_scale": {
                "type": "number",
                "default": DEFAULT_BEND_SCALE,
                "description": "Global multiplier on every field amplitude"
            },
            "field_strength": {
                "type": "number",
                "default": DEFAULT_FIELD_STRENGTH,
                "description": "Second global multiplier on every field amplitude"
            },
            "max_acceleration": {
                "type": "number",
                "default": DEFAULT_MAX_ACCELERATION,
                "min": 0.0,
                "description": "Ceiling on acceleration magnitude per step"
            },
            "alpha": {
                "type": "number",
                "default": DEFAULT_ALPHA,
                "min": 0.0,
                "max": 1.0,
                "description": "Base sample alpha before fade and intensity"
            },
            "quad_size": {
                "type": "number",
                "default": DEFAULT_QUAD_SIZE,
                "min": 0.0,
                "description": "Billboard edge length in world units"
            },
            "color_by_field": {
                "type": "boolean",
                "default": true,
                "description": "Blend sample color toward hot_color by field magnitude"
            },
            "field_color_gain": {
                "type": "number",
                "default": DEFAULT_FIELD_COLOR_GAIN,
                "min": 0.0,
                "description": "Field magnitude to blend factor multiplier"
            },
            "hot_color": {
                "type": "color",
                "default": Rgba::CYAN_GLOW.to_hex(),
                "description": "Color reached at full field tint"
            },
            "stop_on_hit": {
                "type": "boolean",
                "default": false,
                "description": "Terminate a ray at its first collision"
            },
            "collision_mask": {
                "type": "integer",
                "default": u32::MAX,
                "description": "Layer bits passed to collision queries"
            },
            "collision_radius": {
                "type": "number",
                "default": DEFAULT_COLLISION_RADIUS,
                "min": 0.0,
                "description": "Sweep radius and plane filter tolerance"
            },
            "use_sphere_sweep_collision": {
                "type": "boolean",
                "default": true,
                "description": "Sphere sweep narrow phase; false uses subdivided raycasts"
            },
            "collision_every_n_steps": {
                "type": "integer",
                "default": 1,
                "min": 1,
                "description": "Collision test stride in steps"
            },
            "render_every_n_steps": {
                "type": "integer",
                "default": 1,
                "min": 1,
                "description": "Sample emission stride in steps"
            },
            "use_insight_plane_filter": {
                "type": "boolean",
                "default": true,
                "description": "Skip segments that cannot cross the filter plane"
            },
            "collision_ray_subdivide_threshold": {
                "type": "number",
                "default": DEFAULT_SUBDIVIDE_THRESHOLD,
                "min": 0.0,
                "description": "Longest sub-ray of the subdivided raycast"
            },
            "max_collision_substeps": {
                "type": "integer",
                "default": DEFAULT_MAX_COLLISION_SUBSTEPS,
                "min": 1,
                "max": crate::collision::SUBSTEP_CEILING,
                "description": "Most sub-rays per tested segment"
            },
            "use_integrated_field": {
                "type": "boolean",
                "default": true,
                "description": "Integrate the field; false uses the closed-form bend"
            },
            "field_center": {
                "type": "vec3",
                "default": [0.0, 0.0, 0.0],
                "description": "Fallback field center when no sources exist"
            },
            "field_center_is_camera": {
                "type": "boolean",
                "default": true,
                "description": "Use the camera position as the fallback field center"
            },
            "rebuild_every_frame": {
                "type": "boolean",
                "default": false,
                "description": "Rebuild on every tick even when nothing changed"
            }
        })
    }
}

fn finite(name: &str, v: f32) -> Result<(), RayError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(RayError::InvalidParam {
            name: name.into(),
            reason: format!("must be finite, got {v}"),
        })
    }
}

fn non_negative(name: &str, v: f32) -> Result<(), RayError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(RayError::InvalidParam {
            name: name.into(),
            reason: format!("must be finite and >= 0, got {v}"),
        })
    }
}

fn within(name: &str, v: f32, max: f32) -> Result<(), RayError> {
    if v.is_finite() && (0.0..=max).contains(&v) {
        Ok(())
    } else {
        Err(RayError::InvalidParam {
            name: name.into(),
            reason: format!("must be in [0, {max}], got {v}"),
        })
    }
}

fn positive(name: &str, v: f32) -> Result<(), RayError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(RayError::InvalidParam {
            name: name.into(),
            reason: format!("must be finite and > 0, got {v}"),
        })
    }
}

fn at_least_one(name: &str, v: usize) -> Result<(), RayError> {
    if v >= 1 {
        Ok(())
    } else {
        Err(RayError::InvalidParam {
            name: name.into(),
            reason: "must be at least 1".into(),
        })
    }
}
