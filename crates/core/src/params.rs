//! Pure helper functions for extracting typed options from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing the default is returned silently; if it is present but has the
//! wrong shape a warning is logged and the default is used. These never fail.

use glam::Vec3;
use log::warn;
use serde_json::Value;

use crate::color::Rgba;

/// Extracts an `f32` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts any JSON number, including integers.
pub fn param_f32(params: &Value, name: &str, default: f32) -> f32 {
    match params.get(name) {
        None | Some(Value::Null) => default,
        Some(v) => v.as_f64().map(|f| f as f32).unwrap_or_else(|| {
            warn!("option '{name}' is not a number ({v}); using {default}");
            default
        }),
    }
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only succeeds for non-negative integers.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    match params.get(name) {
        None | Some(Value::Null) => default,
        Some(v) => v.as_u64().map(|n| n as usize).unwrap_or_else(|| {
            warn!("option '{name}' is not a non-negative integer ({v}); using {default}");
            default
        }),
    }
}

/// Extracts a `u32` bit mask from `params[name]`.
///
/// Accepts a non-negative integer that fits in 32 bits, or a `"0x..."` hex string.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    let parsed = match params.get(name) {
        None | Some(Value::Null) => return default,
        Some(Value::String(s)) => s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok()),
        Some(v) => v.as_u64().and_then(|n| u32::try_from(n).ok()),
    };
    parsed.unwrap_or_else(|| {
        warn!("option '{name}' is not a 32-bit mask; using {default:#x}");
        default
    })
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    match params.get(name) {
        None | Some(Value::Null) => default,
        Some(v) => v.as_bool().unwrap_or_else(|| {
            warn!("option '{name}' is not a boolean ({v}); using {default}");
            default
        }),
    }
}

/// Extracts a `Vec3` written as `[x, y, z]`.
pub fn param_vec3(params: &Value, name: &str, default: Vec3) -> Vec3 {
    let Some(v) = params.get(name).filter(|v| !v.is_null()) else {
        return default;
    };
    let parsed = v.as_array().filter(|a| a.len() == 3).and_then(|a| {
        let x = a[0].as_f64()?;
        let y = a[1].as_f64()?;
        let z = a[2].as_f64()?;
        Some(Vec3::new(x as f32, y as f32, z as f32))
    });
    parsed.unwrap_or_else(|| {
        warn!("option '{name}' is not a [x, y, z] array ({v}); using {default}");
        default
    })
}

/// Extracts a hex color string (`"#rrggbb"` or `"#rrggbbaa"`).
pub fn param_color(params: &Value, name: &str, default: Rgba) -> Rgba {
    let Some(v) = params.get(name).filter(|v| !v.is_null()) else {
        return default;
    };
    match v.as_str().map(Rgba::from_hex) {
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            warn!("option '{name}': {e}; using {}", default.to_hex());
            default
        }
        None => {
            warn!("option '{name}' is not a color string ({v}); using {}", default.to_hex());
            default
        }
    }
}

/// Short JSON type name used in error messages.
pub fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
