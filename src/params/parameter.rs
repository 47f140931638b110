use rand::Rng;
use serde::ser::SerializeMap;

use crate::foundation::color::Color;
use crate::foundation::error::{PixelcastError, PixelcastResult};

/// A typed, bounded, randomizable adjustable value.
///
/// Bounds are inclusive. A failed update leaves the current value unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum Parameter {
    Float {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    Int {
        value: i64,
        min: Option<i64>,
        max: Option<i64>,
    },
    Color {
        value: Color,
    },
    Boolean {
        value: bool,
    },
}

impl Parameter {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Float { .. } => "float",
            Self::Int { .. } => "int",
            Self::Color { .. } => "color",
            Self::Boolean { .. } => "bool",
        }
    }

    /// Apply a raw JSON value. The request may carry either the bare value or
    /// the `{"value": …}` object the HTTP surface uses.
    pub fn update(&mut self, name: &str, raw: &serde_json::Value) -> PixelcastResult<()> {
        let raw = raw.get("value").unwrap_or(raw);
        match self {
            Self::Float { value, min, max } => {
                let new = raw.as_f64().ok_or_else(|| {
                    PixelcastError::parameter_type(format!("{name} expects a float"))
                })?;
                if min.is_some_and(|m| new < m) || max.is_some_and(|m| new > m) {
                    return Err(PixelcastError::parameter_range(format!(
                        "value {new} for {name} outside of range {:?} to {:?}",
                        min, max
                    )));
                }
                *value = new;
            }
            Self::Int { value, min, max } => {
                let new = raw.as_i64().ok_or_else(|| {
                    PixelcastError::parameter_type(format!("{name} expects an integer"))
                })?;
                if min.is_some_and(|m| new < m) || max.is_some_and(|m| new > m) {
                    return Err(PixelcastError::parameter_range(format!(
                        "value {new} for {name} outside of range {:?} to {:?}",
                        min, max
                    )));
                }
                *value = new;
            }
            Self::Color { value } => {
                let channel = |key: &str, required: bool| -> PixelcastResult<u8> {
                    match raw.get(key) {
                        None if !required => Ok(0),
                        None => Err(PixelcastError::parameter_type(format!(
                            "{name} expects a color object with '{key}'"
                        ))),
                        Some(v) => {
                            let n = v.as_u64().ok_or_else(|| {
                                PixelcastError::parameter_type(format!(
                                    "{name}.{key} expects a number"
                                ))
                            })?;
                            u8::try_from(n).map_err(|_| {
                                PixelcastError::parameter_range(format!(
                                    "{name}.{key} value {n} outside of range 0 to 255"
                                ))
                            })
                        }
                    }
                };
                *value = Color {
                    r: channel("r", true)?,
                    g: channel("g", true)?,
                    b: channel("b", true)?,
                    w: channel("w", false)?,
                };
            }
            Self::Boolean { value } => {
                *value = raw.as_bool().ok_or_else(|| {
                    PixelcastError::parameter_type(format!("{name} expects a boolean"))
                })?;
            }
        }
        Ok(())
    }

    /// Sample a fresh value uniformly within bounds.
    ///
    /// Unbounded numeric parameters are left untouched. Colors sample a uniform
    /// hue at full saturation and value.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        match self {
            Self::Float { value, min, max } => {
                if let (Some(min), Some(max)) = (*min, *max) {
                    if max > min {
                        *value = rng.gen_range(min..=max);
                    }
                }
            }
            Self::Int { value, min, max } => {
                if let (Some(min), Some(max)) = (*min, *max) {
                    if max > min {
                        *value = rng.gen_range(min..=max);
                    }
                }
            }
            Self::Color { value } => {
                let hue = rng.gen_range(0.0..360.0);
                *value = Color::from_hsv(hue, 1.0, 1.0);
            }
            Self::Boolean { value } => {
                *value = rng.gen_bool(0.5);
            }
        }
    }

    fn value_json(&self) -> serde_json::Value {
        match self {
            Self::Float { value, .. } => serde_json::json!(value),
            Self::Int { value, .. } => serde_json::json!(value),
            Self::Color { value } => serde_json::json!(value),
            Self::Boolean { value } => serde_json::json!(value),
        }
    }

    fn zero_json(&self) -> serde_json::Value {
        match self {
            Self::Float { .. } => serde_json::json!(0.0),
            Self::Int { .. } => serde_json::json!(0),
            Self::Color { .. } => serde_json::json!(Color::BLACK),
            Self::Boolean { .. } => serde_json::json!(false),
        }
    }
}

impl serde::Serialize for Parameter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(None)?;
        state.serialize_entry("type", self.kind())?;
        state.serialize_entry("value", &self.value_json())?;
        match self {
            Self::Float { min, max, .. } => {
                if let Some(min) = min {
                    state.serialize_entry("min", min)?;
                }
                if let Some(max) = max {
                    state.serialize_entry("max", max)?;
                }
            }
            Self::Int { min, max, .. } => {
                if let Some(min) = min {
                    state.serialize_entry("min", min)?;
                }
                if let Some(max) = max {
                    state.serialize_entry("max", max)?;
                }
            }
            Self::Color { .. } | Self::Boolean { .. } => {}
        }
        state.end()
    }
}

/// Inbound parameter update: `{"parameters": {name: {"value": …}, …}}`.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Ordered, named collection of parameters owned by a pattern or color mask.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Parameter)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn float(mut self, name: &str, value: f64, min: f64, max: f64) -> Self {
        self.entries.push((
            name.to_string(),
            Parameter::Float {
                value,
                min: Some(min),
                max: Some(max),
            },
        ));
        self
    }

    pub fn int(mut self, name: &str, value: i64, min: i64, max: i64) -> Self {
        self.entries.push((
            name.to_string(),
            Parameter::Int {
                value,
                min: Some(min),
                max: Some(max),
            },
        ));
        self
    }

    pub fn color(mut self, name: &str, value: Color) -> Self {
        self.entries
            .push((name.to_string(), Parameter::Color { value }));
        self
    }

    pub fn boolean(mut self, name: &str, value: bool) -> Self {
        self.entries
            .push((name.to_string(), Parameter::Boolean { value }));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current value of a float parameter; 0.0 for an unknown name.
    pub fn float_value(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(Parameter::Float { value, .. }) => *value,
            _ => 0.0,
        }
    }

    pub fn int_value(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(Parameter::Int { value, .. }) => *value,
            _ => 0,
        }
    }

    pub fn color_value(&self, name: &str) -> Color {
        match self.get(name) {
            Some(Parameter::Color { value }) => *value,
            _ => Color::BLACK,
        }
    }

    pub fn bool_value(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Parameter::Boolean { value: true }))
    }

    /// Merge an inbound request. Names the target doesn't declare are a shape
    /// mismatch; omitted names keep their current values. Validation stops at
    /// the first failing entry, leaving it unchanged.
    pub fn update_from(&mut self, request: &UpdateRequest) -> PixelcastResult<()> {
        for (name, raw) in &request.parameters {
            let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) else {
                return Err(PixelcastError::parameter_type(format!(
                    "no parameter named {name}"
                )));
            };
            entry.1.update(name, raw)?;
        }
        Ok(())
    }

    pub fn randomize_all<R: Rng>(&mut self, rng: &mut R) {
        for (_, parameter) in &mut self.entries {
            parameter.randomize(rng);
        }
    }

    /// A zero-valued request whose shape matches this parameter set, used by
    /// callers that need the expected update layout.
    pub fn zero_request(&self) -> UpdateRequest {
        let mut parameters = serde_json::Map::new();
        for (name, parameter) in &self.entries {
            parameters.insert(
                name.clone(),
                serde_json::json!({ "value": parameter.zero_json() }),
            );
        }
        UpdateRequest { parameters }
    }
}

impl serde::Serialize for Parameters {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, parameter) in &self.entries {
            state.serialize_entry(name, parameter)?;
        }
        state.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/parameter.rs"]
mod tests;
