//! Typed setting values
//!
//! Every setting in the catalog carries one of a closed set of value kinds.
//! Callers match on [`SettingValue`] instead of downcasting.

use serde_json::Value;
use std::fmt;

use super::error::SettingsError;
use super::id::SettingId;
use crate::constants::UNSET_TOKENS;

/// A single catalog entry: identity, display metadata and current value
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    id: SettingId,
    display_name: &'static str,
    description: &'static str,
    value: SettingValue,
}

/// Value kinds a setting can hold
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// String constrained to an enumerated set
    Whitelisted(WhitelistedValue),
    /// Optional integer, `None` defers to the target's original value
    Primitive(PrimitiveValue),
}

/// String value that is always a member of `allowed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistedValue {
    allowed: &'static [&'static str],
    default: &'static str,
    value: String,
}

/// Nullable integer override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimitiveValue {
    default: Option<i32>,
    value: Option<i32>,
}

impl Setting {
    pub fn new(
        id: SettingId,
        display_name: &'static str,
        description: &'static str,
        value: SettingValue,
    ) -> Self {
        Self {
            id,
            display_name,
            description,
            value,
        }
    }

    pub fn id(&self) -> SettingId {
        self.id
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    /// Current value as a JSON token (string for whitelisted, number or null for primitive)
    pub fn get_serializable(&self) -> Value {
        match &self.value {
            SettingValue::Whitelisted(w) => Value::String(w.value.clone()),
            SettingValue::Primitive(p) => p.value.map_or(Value::Null, Value::from),
        }
    }

    /// Catalog default as a JSON token
    pub fn default_value(&self) -> Value {
        match &self.value {
            SettingValue::Whitelisted(w) => Value::String(w.default.to_string()),
            SettingValue::Primitive(p) => p.default.map_or(Value::Null, Value::from),
        }
    }

    /// Overwrite the current value from a deserialized JSON token
    pub fn set_from_external(&mut self, token: &Value) -> Result<(), SettingsError> {
        let id = self.id.as_str();
        match &mut self.value {
            SettingValue::Whitelisted(w) => match token {
                Value::String(s) => w.set(id, s),
                other => Err(SettingsError::invalid(id, other, "expected a string")),
            },
            SettingValue::Primitive(p) => {
                p.value = match token {
                    Value::Null => None,
                    Value::Number(n) => Some(number_to_i32(n).ok_or_else(|| {
                        SettingsError::invalid(id, n, "expected a 32-bit integer")
                    })?),
                    other => {
                        return Err(SettingsError::invalid(id, other, "expected a number or null"));
                    }
                };
                Ok(())
            }
        }
    }

    /// Overwrite the current value from user-typed text
    ///
    /// For primitive settings any of `UNSET_TOKENS` clears the override.
    pub fn set_from_input(&mut self, input: &str) -> Result<(), SettingsError> {
        let id = self.id.as_str();
        let input = input.trim();
        match &mut self.value {
            SettingValue::Whitelisted(w) => w.set(id, input),
            SettingValue::Primitive(p) => {
                if UNSET_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(input)) {
                    p.value = None;
                    return Ok(());
                }
                let parsed = input.parse::<i32>().map_err(|e| {
                    SettingsError::invalid(id, format!("\"{input}\""), e.to_string())
                })?;
                p.value = Some(parsed);
                Ok(())
            }
        }
    }

    /// Restore the catalog default
    pub fn reset(&mut self) {
        match &mut self.value {
            SettingValue::Whitelisted(w) => w.value = w.default.to_string(),
            SettingValue::Primitive(p) => p.value = p.default,
        }
    }
}

impl WhitelistedValue {
    /// `initial` must be one of `allowed`
    pub fn new(id: SettingId, allowed: &'static [&'static str], initial: &'static str) -> Self {
        debug_assert!(
            allowed.contains(&initial),
            "default {initial:?} of {id} is not an allowed value"
        );
        Self {
            allowed,
            default: initial,
            value: initial.to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn allowed_values(&self) -> &'static [&'static str] {
        self.allowed
    }

    fn set(&mut self, id: &str, candidate: &str) -> Result<(), SettingsError> {
        if !self.allowed.contains(&candidate) {
            return Err(SettingsError::invalid(
                id,
                format!("\"{candidate}\""),
                format!("expected one of: {}", self.allowed.join(", ")),
            ));
        }
        self.value = candidate.to_string();
        Ok(())
    }
}

impl PrimitiveValue {
    pub fn new(initial: Option<i32>) -> Self {
        Self {
            default: initial,
            value: initial,
        }
    }

    pub fn value(&self) -> Option<i32> {
        self.value
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Whitelisted(w) => f.write_str(&w.value),
            SettingValue::Primitive(p) => match p.value {
                Some(v) => write!(f, "{v}"),
                None => f.write_str("unset"),
            },
        }
    }
}

/// Accepts integers and whole floats (`300` and `300.0`) that fit in an i32
fn number_to_i32(n: &serde_json::Number) -> Option<i32> {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).ok();
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}
