use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::ser::SerializeMap;

use crate::foundation::error::{PixelcastError, PixelcastResult};

const MAX_TRANSITION_MS: u64 = 10_000;

/// Runtime-adjustable settings, read by the render loop on every tick and
/// written by the HTTP surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub pattern_transition_duration: Duration,
    pub color_mask_transition_duration: Duration,
    pub pattern_transition_enabled: bool,
    pub color_mask_transition_enabled: bool,
    /// Global post-composite scale, percent in `[0, 100]`.
    pub brightness: f64,
    /// Gamma curve exponent in `[0.2, 3.0]`; 1.0 is the identity.
    pub gamma: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pattern_transition_duration: Duration::from_millis(2000),
            color_mask_transition_duration: Duration::from_millis(1000),
            pattern_transition_enabled: true,
            color_mask_transition_enabled: true,
            brightness: 100.0,
            gamma: 1.0,
        }
    }
}

impl Options {
    /// Update one option by its public id. Type mismatches and out-of-range
    /// values are rejected without changing state.
    pub fn set(&mut self, id: &str, value: &serde_json::Value) -> PixelcastResult<()> {
        match id {
            "patternTransitionDuration" => {
                self.pattern_transition_duration = duration_ms(id, value)?;
            }
            "colorMaskTransitionDuration" => {
                self.color_mask_transition_duration = duration_ms(id, value)?;
            }
            "patternTransitionEnabled" => {
                self.pattern_transition_enabled = boolean(id, value)?;
            }
            "colorMaskTransitionEnabled" => {
                self.color_mask_transition_enabled = boolean(id, value)?;
            }
            "brightness" => {
                self.brightness = float_in(id, value, 0.0, 100.0)?;
            }
            "gamma" => {
                self.gamma = float_in(id, value, 0.2, 3.0)?;
            }
            _ => return Err(PixelcastError::unknown_name(format!("option {id}"))),
        }
        Ok(())
    }

    /// Restore every option to its default value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The brightness scale factor applied to every channel.
    pub fn brightness_scale(&self) -> f64 {
        self.brightness / 100.0
    }
}

fn duration_ms(id: &str, value: &serde_json::Value) -> PixelcastResult<Duration> {
    let ms = value
        .as_f64()
        .ok_or_else(|| PixelcastError::parameter_type(format!("option {id} expects a number")))?;
    if !(0.0..=MAX_TRANSITION_MS as f64).contains(&ms) {
        return Err(PixelcastError::parameter_range(format!(
            "option {id} value {ms} outside of range 0 to {MAX_TRANSITION_MS}"
        )));
    }
    Ok(Duration::from_millis(ms as u64))
}

fn boolean(id: &str, value: &serde_json::Value) -> PixelcastResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| PixelcastError::parameter_type(format!("option {id} expects a boolean")))
}

fn float_in(id: &str, value: &serde_json::Value, min: f64, max: f64) -> PixelcastResult<f64> {
    let v = value
        .as_f64()
        .ok_or_else(|| PixelcastError::parameter_type(format!("option {id} expects a number")))?;
    if !(min..=max).contains(&v) {
        return Err(PixelcastError::parameter_range(format!(
            "option {id} value {v} outside of range {min} to {max}"
        )));
    }
    Ok(v)
}

impl serde::Serialize for Options {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        fn registered(
            id: &str,
            label: &str,
            kind: &str,
            value: serde_json::Value,
            bounds: Option<(f64, f64)>,
        ) -> serde_json::Value {
            let mut entry = serde_json::json!({
                "id": id,
                "label": label,
                "type": kind,
                "value": value,
            });
            if let Some((min, max)) = bounds {
                entry["min"] = serde_json::json!(min);
                entry["max"] = serde_json::json!(max);
            }
            entry
        }

        let entries = [
            registered(
                "patternTransitionDuration",
                "Pattern Transition Duration",
                "duration",
                serde_json::json!(self.pattern_transition_duration.as_millis() as u64),
                Some((0.0, MAX_TRANSITION_MS as f64)),
            ),
            registered(
                "colorMaskTransitionDuration",
                "Color Mask Transition Duration",
                "duration",
                serde_json::json!(self.color_mask_transition_duration.as_millis() as u64),
                Some((0.0, MAX_TRANSITION_MS as f64)),
            ),
            registered(
                "patternTransitionEnabled",
                "Pattern Transition Enabled",
                "boolean",
                serde_json::json!(self.pattern_transition_enabled),
                None,
            ),
            registered(
                "colorMaskTransitionEnabled",
                "Color Mask Transition Enabled",
                "boolean",
                serde_json::json!(self.color_mask_transition_enabled),
                None,
            ),
            registered(
                "brightness",
                "Brightness",
                "float",
                serde_json::json!(self.brightness),
                Some((0.0, 100.0)),
            ),
            registered(
                "gamma",
                "Gamma Correction",
                "float",
                serde_json::json!(self.gamma),
                Some((0.2, 3.0)),
            ),
        ];

        let mut state = serializer.serialize_map(Some(entries.len()))?;
        for entry in &entries {
            let id = entry["id"].as_str().unwrap_or_default();
            state.serialize_entry(id, entry)?;
        }
        state.end()
    }
}

/// Options shared between the controller (per-tick reads) and the HTTP
/// surface (the single writer).
pub type SharedOptions = Arc<RwLock<Options>>;

pub fn shared(options: Options) -> SharedOptions {
    Arc::new(RwLock::new(options))
}

#[cfg(test)]
#[path = "../../tests/unit/engine/options.rs"]
mod tests;
