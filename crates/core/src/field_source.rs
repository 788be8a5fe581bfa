//! Field sources: point influences that bend rays.
//!
//! A [`FieldSource`] contributes an acceleration toward (or away from) its
//! position. The magnitude follows one of four [`Profile`] shapes evaluated
//! at the softened radius, scaled by the global field amplitude.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::RayError;
use crate::field::{FieldTuning, GlobalFieldParams};

/// Lower bound used for exponents, sigma and shell edges.
pub const PROFILE_EPS: f32 = 1e-4;

/// Floor applied to softening at evaluation time.
const MIN_SOFTENING: f32 = 1e-5;

/// Magnitude-versus-radius shape of a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    /// `amp * r^gamma`.
    #[default]
    Power,
    /// `amp / r^max(gamma, eps)`.
    InversePower,
    /// `amp * exp(-(r / sigma)^2)`.
    Gaussian {
        #[serde(default = "default_sigma")]
        sigma: f32,
    },
    /// Power law confined to a band with smoothstepped edges.
    Shell {
        #[serde(default = "default_inner_radius")]
        inner_radius: f32,
        #[serde(default = "default_outer_radius")]
        outer_radius: f32,
        #[serde(default = "default_edge_softness")]
        edge_softness: f32,
    },
}

fn default_sigma() -> f32 {
    1.0
}
fn default_inner_radius() -> f32 {
    1.0
}
fn default_outer_radius() -> f32 {
    2.0
}
fn default_edge_softness() -> f32 {
    0.25
}

impl Profile {
    /// Names accepted in the `kind` tag.
    pub const NAMES: &'static [&'static str] = &["power", "inverse_power", "gaussian", "shell"];

    /// Gaussian profile with the given width.
    pub fn gaussian(sigma: f32) -> Self {
        Profile::Gaussian { sigma }
    }

    /// Shell profile spanning `[inner, outer]` with soft edges of half-width `edge`.
    pub fn shell(inner_radius: f32, outer_radius: f32, edge_softness: f32) -> Self {
        Profile::Shell {
            inner_radius,
            outer_radius,
            edge_softness,
        }
    }

    /// Magnitude at softened radius `r` for base amplitude `amp` and exponent `gamma`.
    pub fn magnitude(&self, amp: f32, r: f32, gamma: f32) -> f32 {
        match *self {
            Profile::Power => amp * r.powf(gamma),
            Profile::InversePower => amp / r.powf(gamma.max(PROFILE_EPS)),
            Profile::Gaussian { sigma } => {
                let x = r / sigma.max(PROFILE_EPS);
                amp * (-x * x).exp()
            }
            Profile::Shell {
                inner_radius,
                outer_radius,
                edge_softness,
            } => {
                let inner = inner_radius.max(0.0);
                let outer = outer_radius.max(inner + PROFILE_EPS);
                let edge = edge_softness.max(PROFILE_EPS);
                let w_in = smoothstep(inner - edge, inner + edge, r);
                let w_out = 1.0 - smoothstep(outer - edge, outer + edge, r);
                let w = (w_in * w_out).clamp(0.0, 1.0);
                amp * w * r.powf(gamma)
            }
        }
    }
}

/// Hermite smoothstep of `x` across `[a, b]`.
pub fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    let t = ((x - a) / (b - a)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// A point influence contributing acceleration to every ray sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSource {
    pub position: Vec3,
    pub enabled: bool,
    /// Pull toward the source when true, push away when false.
    pub attract: bool,
    /// Multiplies the global beta.
    pub strength: f32,
    /// Added in quadrature to the distance; must be > 0.
    pub softening: f32,
    /// Ignore points whose softened radius is below this (0 = no limit).
    pub min_radius: f32,
    /// Ignore points whose softened radius is above this (0 = no limit).
    pub max_radius: f32,
    pub profile: Profile,
    /// Replaces the global gamma when set.
    pub gamma: Option<f32>,
    /// Multiplies the amplitude when set (otherwise 1).
    pub beta_scale: Option<f32>,
}

impl Default for FieldSource {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            enabled: true,
            attract: true,
            strength: 1.0,
            softening: 0.25,
            min_radius: 0.0,
            max_radius: 0.0,
            profile: Profile::Power,
            gamma: None,
            beta_scale: None,
        }
    }
}

impl FieldSource {
    /// Attracting power-law source at `position` with default settings.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: replace the profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Builder: override the global gamma.
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Builder: repel instead of attract.
    pub fn repelling(mut self) -> Self {
        self.attract = false;
        self
    }

    /// Checks load-time invariants.
    ///
    /// Softening must be finite and positive; a shell's outer radius must
    /// exceed its inner radius.
    pub fn validate(&self) -> Result<(), RayError> {
        if !self.softening.is_finite() || self.softening <= 0.0 {
            return Err(RayError::InvalidSoftening(self.softening));
        }
        if let Profile::Shell {
            inner_radius,
            outer_radius,
            ..
        } = self.profile
        {
            let ordered = outer_radius > inner_radius;
            if !ordered {
                return Err(RayError::InvalidShellRadii {
                    inner: inner_radius,
                    outer: outer_radius,
                });
            }
        }
        Ok(())
    }

    /// Softened distance from `point` to the source.
    pub fn softened_radius(&self, point: Vec3) -> f32 {
        let soft = self.softening.max(MIN_SOFTENING);
        (point.distance_squared(self.position) + soft * soft).sqrt()
    }

    /// Acceleration this source alone applies at `point`.
    ///
    /// Disabled sources and points outside the `[min_radius, max_radius]`
    /// zone contribute zero.
    pub fn contribution(
        &self,
        point: Vec3,
        global: &GlobalFieldParams,
        tuning: &FieldTuning,
    ) -> Vec3 {
        if !self.enabled {
            return Vec3::ZERO;
        }
        let rvec = point - self.position;
        let r = self.softened_radius(point);

        if self.min_radius > 0.0 && r < self.min_radius {
            return Vec3::ZERO;
        }
        if self.max_radius > 0.0 && r > self.max_radius {
            return Vec3::ZERO;
        }

        let toward = -rvec / r;
        let dir = if self.attract { toward } else { -toward };

        let gamma = self.gamma.unwrap_or(global.gamma);
        let beta_scale = self.beta_scale.unwrap_or(1.0);
        let amp = global.beta * beta_scale * tuning.amplitude() * self.strength;

        dir * self.profile.magnitude(amp, r, gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_global() -> GlobalFieldParams {
        GlobalFieldParams {
            beta: 1.0,
            gamma: 2.0,
        }
    }

    fn unit_tuning() -> FieldTuning {
        FieldTuning {
            bend_scale: 1.0,
            field_strength: 1.0,
        }
    }

    /// Source with negligible softening so r ~= raw distance.
    fn sharp(position: Vec3, profile: Profile) -> FieldSource {
        FieldSource {
            softening: 1e-4,
            ..FieldSource::at(position).with_profile(profile)
        }
    }

    #[test]
    fn default_source_is_valid_attracting_power() {
        let s = FieldSource::default();
        assert!(s.validate().is_ok());
        assert!(s.attract && s.enabled);
        assert_eq!(s.profile, Profile::Power);
        assert!((s.softening - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn validate_rejects_non_positive_softening() {
        let s = FieldSource {
            softening: 0.0,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(RayError::InvalidSoftening(_))));
        let s = FieldSource {
            softening: f32::NAN,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_shell() {
        let s = FieldSource::default().with_profile(Profile::shell(3.0, 3.0, 0.1));
        assert!(matches!(
            s.validate(),
            Err(RayError::InvalidShellRadii { .. })
        ));
    }

    #[test]
    fn attracting_source_pulls_toward_position() {
        let s = FieldSource::at(Vec3::new(0.0, 5.0, 0.0));
        let a = s.contribution(Vec3::ZERO, &unit_global(), &unit_tuning());
        assert!(a.y > 0.0 && a.x.abs() < 1e-6 && a.z.abs() < 1e-6, "got {a}");
    }

    #[test]
    fn repelling_negates_exactly() {
        let p = Vec3::new(1.0, -2.0, 0.5);
        let s = FieldSource::at(Vec3::new(3.0, 1.0, -1.0));
        let pull = s.contribution(p, &unit_global(), &unit_tuning());
        let push = s.clone().repelling().contribution(p, &unit_global(), &unit_tuning());
        assert_eq!(pull, -push);
    }

    #[test]
    fn disabled_source_contributes_nothing() {
        let s = FieldSource {
            enabled: false,
            ..FieldSource::at(Vec3::X)
        };
        assert_eq!(s.contribution(Vec3::ZERO, &unit_global(), &unit_tuning()), Vec3::ZERO);
    }

    #[test]
    fn zone_limits_gate_contribution() {
        let near = FieldSource {
            min_radius: 2.0,
            ..FieldSource::at(Vec3::ZERO)
        };
        assert_eq!(near.contribution(Vec3::X, &unit_global(), &unit_tuning()), Vec3::ZERO);

        let far = FieldSource {
            max_radius: 2.0,
            ..FieldSource::at(Vec3::ZERO)
        };
        let p = Vec3::new(5.0, 0.0, 0.0);
        assert_eq!(far.contribution(p, &unit_global(), &unit_tuning()), Vec3::ZERO);
        assert_ne!(far.contribution(Vec3::X, &unit_global(), &unit_tuning()), Vec3::ZERO);
    }

    #[test]
    fn power_profile_matches_formula() {
        let s = sharp(Vec3::ZERO, Profile::Power);
        let a = s.contribution(Vec3::new(3.0, 0.0, 0.0), &unit_global(), &unit_tuning());
        assert!((a.length() - 9.0).abs() < 1e-3, "got {}", a.length());
    }

    #[test]
    fn inverse_power_survives_zero_gamma() {
        let s = sharp(Vec3::ZERO, Profile::InversePower).with_gamma(0.0);
        let a = s.contribution(Vec3::new(2.0, 0.0, 0.0), &unit_global(), &unit_tuning());
        assert!(a.is_finite());
        assert!((a.length() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn gaussian_decays_with_distance() {
        let s = sharp(Vec3::ZERO, Profile::gaussian(1.0));
        let near = s.contribution(Vec3::new(0.5, 0.0, 0.0), &unit_global(), &unit_tuning());
        let far = s.contribution(Vec3::new(2.0, 0.0, 0.0), &unit_global(), &unit_tuning());
        assert!(near.length() > far.length());
        assert!((far.length() - (-4.0_f32).exp()).abs() < 1e-4);
    }

    #[test]
    fn shell_is_zero_outside_band_and_positive_inside() {
        let s = sharp(Vec3::ZERO, Profile::shell(2.0, 4.0, 0.5));
        let g = unit_global();
        let t = unit_tuning();
        for r in [0.5_f32, 1.4, 4.6, 8.0] {
            let a = s.contribution(Vec3::new(r, 0.0, 0.0), &g, &t);
            assert!(a.length() < 1e-5, "r={r} gave {}", a.length());
        }
        for r in [2.1_f32, 3.0, 3.9] {
            let a = s.contribution(Vec3::new(r, 0.0, 0.0), &g, &t);
            assert!(a.length() > 0.0, "r={r} gave zero");
        }
    }

    #[test]
    fn overrides_replace_global_gamma_and_scale_beta() {
        let p = Vec3::new(2.0, 0.0, 0.0);
        let base = sharp(Vec3::ZERO, Profile::Power);
        let over = FieldSource {
            gamma: Some(1.0),
            beta_scale: Some(3.0),
            ..base.clone()
        };
        let a = over.contribution(p, &unit_global(), &unit_tuning());
        assert!((a.length() - 6.0).abs() < 1e-3, "got {}", a.length());
    }

    #[test]
    fn smoothstep_clamps_and_is_symmetric() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn profile_deserializes_from_tagged_json() {
        let p: Profile =
            serde_json::from_str(r#"{"kind": "shell", "inner_radius": 1.5, "outer_radius": 3}"#)
                .unwrap();
        assert_eq!(p, Profile::shell(1.5, 3.0, 0.25));
        let g: Profile = serde_json::from_str(r#"{"kind": "gaussian"}"#).unwrap();
        assert_eq!(g, Profile::gaussian(1.0));
    }

    #[test]
    fn source_deserializes_with_defaults() {
        let s: FieldSource =
            serde_json::from_str(r#"{"position": [0, 5, 0], "profile": {"kind": "power"}}"#)
                .unwrap();
        assert_eq!(s.position, Vec3::new(0.0, 5.0, 0.0));
        assert!(s.attract);
        assert_eq!(s.gamma, None);
    }
}
