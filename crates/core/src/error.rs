//! Error types for the raybend core.
//!
//! Only load-time validation fails. Rebuilds, integration and field
//! evaluation clamp or substitute instead of returning errors.

use thiserror::Error;

/// Errors produced when loading or validating raybend inputs.
#[derive(Debug, Error)]
pub enum RayError {
    /// A field source had a softening radius that is zero, negative or not finite.
    #[error("invalid softening {0}: must be finite and > 0")]
    InvalidSoftening(f32),

    /// A shell profile had an outer radius that does not exceed its inner radius.
    #[error("invalid shell radii: outer ({outer}) must be greater than inner ({inner})")]
    InvalidShellRadii { inner: f32, outer: f32 },

    /// An emitter asked for zero rays, or more than the per-emitter ceiling.
    #[error("invalid ray count {0}: emitters need between 1 and {max} rays", max = crate::emitter::MAX_RAY_COUNT)]
    InvalidRayCount(usize),

    /// Adaptive step bounds were non-positive or inverted.
    #[error("invalid step lengths: min ({min}) must be > 0 and <= max ({max})")]
    InvalidStepLengths { min: f32, max: f32 },

    /// A scalar option was outside its accepted range.
    #[error("invalid value for '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A scene description could not be parsed.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_softening_includes_value() {
        let msg = RayError::InvalidSoftening(-0.5).to_string();
        assert!(msg.contains("-0.5"), "missing value in: {msg}");
        assert!(msg.contains("softening"), "missing field name in: {msg}");
    }

    #[test]
    fn invalid_shell_radii_includes_both_radii() {
        let msg = RayError::InvalidShellRadii {
            inner: 3.0,
            outer: 2.0,
        }
        .to_string();
        assert!(msg.contains('3'), "missing inner in: {msg}");
        assert!(msg.contains('2'), "missing outer in: {msg}");
    }

    #[test]
    fn invalid_ray_count_mentions_rays() {
        let msg = RayError::InvalidRayCount(0).to_string();
        assert!(msg.contains("ray"), "got: {msg}");
    }

    #[test]
    fn invalid_step_lengths_includes_bounds() {
        let msg = RayError::InvalidStepLengths { min: 0.7, max: 0.2 }.to_string();
        assert!(msg.contains("0.7") && msg.contains("0.2"), "got: {msg}");
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = RayError::ParamTypeMismatch {
            name: "steps_per_ray".into(),
            expected: "integer".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("steps_per_ray"), "missing param name in: {msg}");
        assert!(msg.contains("integer"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn invalid_param_includes_name_and_reason() {
        let err = RayError::InvalidParam {
            name: "quad_size".into(),
            reason: "must be >= 0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("quad_size") && msg.contains(">= 0"), "got: {msg}");
    }

    #[test]
    fn invalid_scene_includes_detail() {
        let msg = RayError::InvalidScene("missing field `emitters`".into()).to_string();
        assert!(msg.starts_with("invalid scene"), "got: {msg}");
        assert!(msg.contains("emitters"), "got: {msg}");
    }

    #[test]
    fn ray_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RayError>();
    }

    #[test]
    fn ray_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<RayError>();
    }
}
