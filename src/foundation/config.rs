use crate::foundation::error::{FilterError, FilterResult};

/// Per-filter parameters handed to [`SoftFilter::create`](crate::SoftFilter::create).
///
/// A flat JSON object. Getters return the caller's default when a key is absent and a
/// [`FilterError::Config`] when it is present with the wrong type.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FilterConfig {
    params: serde_json::Map<String, serde_json::Value>,
}

impl FilterConfig {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object.
    pub fn from_json_str(s: &str) -> FilterResult<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| FilterError::config(format!("invalid filter config json: {e}")))?;
        match value {
            serde_json::Value::Object(params) => Ok(Self { params }),
            _ => Err(FilterError::config("filter config must be a JSON object")),
        }
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.params.insert(key.into(), value.into());
    }

    /// Return `true` when `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Integer parameter in `u32` range.
    pub fn get_u32(&self, key: &str, default: u32) -> FilterResult<u32> {
        let Some(v) = self.params.get(key) else {
            return Ok(default);
        };
        let Some(n) = v.as_u64() else {
            return Err(FilterError::config(format!(
                "filter param '{key}' must be an integer"
            )));
        };
        u32::try_from(n)
            .map_err(|_| FilterError::config(format!("filter param '{key}' is out of range")))
    }

    /// Finite floating point parameter.
    pub fn get_f32(&self, key: &str, default: f32) -> FilterResult<f32> {
        let Some(v) = self.params.get(key) else {
            return Ok(default);
        };
        let Some(n) = v.as_f64() else {
            return Err(FilterError::config(format!(
                "filter param '{key}' must be a number"
            )));
        };
        let n = n as f32;
        if !n.is_finite() {
            return Err(FilterError::config(format!(
                "filter param '{key}' must be finite"
            )));
        }
        Ok(n)
    }

    /// Boolean parameter.
    pub fn get_bool(&self, key: &str, default: bool) -> FilterResult<bool> {
        match self.params.get(key) {
            None => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| {
                FilterError::config(format!("filter param '{key}' must be a boolean"))
            }),
        }
    }

    /// String parameter.
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> FilterResult<&'a str> {
        match self.params.get(key) {
            None => Ok(default),
            Some(v) => v.as_str().ok_or_else(|| {
                FilterError::config(format!("filter param '{key}' must be a string"))
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
