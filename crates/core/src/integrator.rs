//! Adaptive-step ray integration through the accumulated field.
//!
//! Each ray is advanced from its emitter with a cheap explicit Euler scheme:
//! the field bends the unit velocity, the step shrinks where the field is
//! strong, and samples are recorded at the render stride. A closed-form
//! analytic mode skips field evaluation entirely.

use glam::{Vec2, Vec3};
use log::trace;

use crate::camera::CameraSnapshot;
use crate::collision::{CollisionDetector, CollisionQuery};
use crate::config::RendererConfig;
use crate::field::{acceleration_at, center_acceleration, FieldTuning, GlobalFieldParams};
use crate::field_source::FieldSource;

/// One recorded point along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySample {
    pub position: Vec3,
    /// Step index that produced this sample (drives the fade).
    pub step: usize,
    /// Clamped acceleration magnitude at the start of that step.
    pub accel_magnitude: f32,
}

/// Why a ray stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// Path length exceeded the emitter's max distance.
    MaxDistance,
    /// The tested segment hit geometry at this point.
    Collision(Vec3),
    /// Every step was taken.
    StepBudget,
}

/// Samples of one ray plus its termination reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RayTrace {
    pub samples: Vec<RaySample>,
    pub termination: Termination,
}

/// Where the acceleration comes from during one rebuild.
#[derive(Debug, Clone, Copy)]
pub enum FieldModel<'a> {
    /// Superposition of field sources.
    Sources(&'a [FieldSource]),
    /// Single power-law pull toward a center, used when no sources exist.
    Center(Vec3),
}

/// Field state frozen for one rebuild.
#[derive(Debug, Clone, Copy)]
pub struct FieldSnapshot<'a> {
    pub model: FieldModel<'a>,
    pub global: GlobalFieldParams,
    pub tuning: FieldTuning,
}

impl FieldSnapshot<'_> {
    /// Raw (unclamped) acceleration at `point`.
    pub fn acceleration(&self, point: Vec3) -> Vec3 {
        match self.model {
            FieldModel::Sources(sources) => {
                acceleration_at(point, sources, &self.global, &self.tuning)
            }
            FieldModel::Center(center) => {
                center_acceleration(point, center, &self.global, &self.tuning)
            }
        }
    }
}

/// Scales `a` down so its length does not exceed `max`.
pub fn clamp_acceleration(a: Vec3, max: f32) -> Vec3 {
    let len = a.length();
    if len > max && len > 0.0 {
        a * (max / len)
    } else {
        a
    }
}

/// `clamp(base / (1 + |a| * gain), min, max)`.
pub fn adaptive_step(base: f32, accel_magnitude: f32, gain: f32, min: f32, max: f32) -> f32 {
    (base / (1.0 + accel_magnitude * gain)).clamp(min, max)
}

/// Direction in the camera plane along which the analytic mode bends `dir`.
///
/// Projects `dir` onto camera right/up and bends away from screen center.
pub fn bend_direction(dir: Vec3, camera: &CameraSnapshot) -> Vec3 {
    let d2 = Vec2::new(dir.dot(camera.right), -dir.dot(camera.up));
    let d2n = if d2.length() > 1e-6 { d2 / d2.length() } else { Vec2::X };
    (camera.right * d2n.x + camera.up * -d2n.y).normalize_or(camera.right)
}

/// Drives single rays for one rebuild.
pub struct RayIntegrator<'a> {
    pub config: &'a RendererConfig,
    pub field: FieldSnapshot<'a>,
    pub camera: &'a CameraSnapshot,
    pub detector: &'a CollisionDetector,
    pub query: &'a dyn CollisionQuery,
}

/// Running state of one ray.
struct RayState {
    position: Vec3,
    velocity: Vec3,
    traveled: f32,
}

impl RayIntegrator<'_> {
    /// Integrates one ray from `origin` along unit `dir`.
    ///
    /// Steps run `0..=steps_per_ray`; sample `s` is the position after step
    /// `s`. When `stop_on_hit` is set, every collision-stride step tests the
    /// segment from the last tested point, so skipped steps are still covered.
    pub fn trace(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> RayTrace {
        let cfg = self.config;
        let collide_every = cfg.collision_every_n_steps.max(1);
        let render_every = cfg.render_every_n_steps.max(1);
        let bend = bend_direction(dir, self.camera);

        let mut state = RayState {
            position: origin,
            velocity: dir,
            traveled: 0.0,
        };
        let mut anchor = origin;
        let mut samples = Vec::with_capacity(cfg.steps_per_ray / render_every + 1);

        for s in 0..=cfg.steps_per_ray {
            let (next, accel_magnitude) = if cfg.use_integrated_field {
                self.integrate_step(&mut state)
            } else {
                let t = s as f32 * cfg.step_length;
                state.traveled = t;
                (self.analytic_point(origin, dir, bend, t), 0.0)
            };

            if state.traveled > max_distance {
                trace!("ray stopped at step {s}: max distance {max_distance}");
                return RayTrace {
                    samples,
                    termination: Termination::MaxDistance,
                };
            }

            if cfg.stop_on_hit && s % collide_every == 0 {
                if let Some(hit) = self.detector.test_segment(self.query, anchor, next) {
                    trace!("ray hit at {hit} on step {s}");
                    samples.push(RaySample {
                        position: hit,
                        step: s,
                        accel_magnitude,
                    });
                    return RayTrace {
                        samples,
                        termination: Termination::Collision(hit),
                    };
                }
                anchor = next;
            }

            if s % render_every == 0 {
                samples.push(RaySample {
                    position: next,
                    step: s,
                    accel_magnitude,
                });
            }
            state.position = next;
        }

        RayTrace {
            samples,
            termination: Termination::StepBudget,
        }
    }

    /// One Euler step. Returns the next position and the clamped acceleration
    /// magnitude; updates velocity and traveled distance.
    fn integrate_step(&self, state: &mut RayState) -> (Vec3, f32) {
        let cfg = self.config;
        let a = clamp_acceleration(
            self.field.acceleration(state.position),
            cfg.max_acceleration,
        );
        let a_len = a.length();
        let step = adaptive_step(
            cfg.step_length,
            a_len,
            cfg.step_adapt_gain,
            cfg.min_step_length,
            cfg.max_step_length,
        );
        state.velocity = (state.velocity + a * step).normalize_or(state.velocity);
        let next = state.position + state.velocity * step;
        state.traveled += step;
        (next, a_len)
    }

    fn analytic_point(&self, origin: Vec3, dir: Vec3, bend: Vec3, t: f32) -> Vec3 {
        let global = &self.field.global;
        let offset = global.beta * t.powf(global.gamma) * self.config.bend_scale;
        origin + dir * t + bend * offset
    }
}
