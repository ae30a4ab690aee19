//! Render property definitions with defaults from render_properties.json
//!
//! The JSON file is embedded at compile time and is the single place where
//! property names, kinds, defaults and enumerated values are defined. Readers
//! fall back to these defaults whenever a user value is missing or invalid.

use crate::error::{FlowError, Result};
use std::collections::HashMap;
use std::path::Path;

/// render_properties.json embedded at compile time
const PROPERTIES_JSON: &str = include_str!("../render_properties.json");

/// Property definition from render_properties.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Enumerated,
    Double,
    Integer,
    Boolean,
}

/// Registry of all render properties with their defaults
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse the embedded render_properties.json
    ///
    /// Panics if the embedded file is malformed; it is checked in with the
    /// source and covered by the registry tests.
    pub fn from_embedded_json() -> Self {
        let json: serde_json::Value = serde_json::from_str(PROPERTIES_JSON)
            .expect("render_properties.json is invalid JSON");

        let properties_array = json["properties"]
            .as_array()
            .expect("render_properties.json missing 'properties' array");

        let mut properties = HashMap::new();

        for prop in properties_array {
            let name = prop["name"]
                .as_str()
                .expect("property missing 'name'")
                .to_string();

            let kind = match prop["kind"].as_str().expect("property missing 'kind'") {
                "StringProperty" => PropertyKind::String,
                "EnumeratedProperty" => PropertyKind::Enumerated,
                "DoubleProperty" => PropertyKind::Double,
                "IntegerProperty" => PropertyKind::Integer,
                "BooleanProperty" => PropertyKind::Boolean,
                other => panic!("Unknown property kind: {}", other),
            };

            let default_value = prop["defaultValue"].as_str().unwrap_or("").to_string();
            let description = prop["description"].as_str().unwrap_or("").to_string();

            let valid_values = if kind == PropertyKind::Enumerated {
                prop["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value,
                    description,
                    valid_values,
                },
            );
        }

        Self { properties }
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All property names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.properties.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

/// Global registry instance (initialized lazily)
static REGISTRY: std::sync::OnceLock<PropertyRegistry> = std::sync::OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(PropertyRegistry::from_embedded_json)
}

/// Typed property reader
///
/// Holds user-set values and resolves everything else from the registry
/// defaults. Invalid user values are logged and replaced by the default.
#[derive(Debug, Clone, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    /// Create from raw name → value pairs; empty values count as unset
    pub fn new(values: HashMap<String, String>) -> Self {
        let user_values = values
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        Self { user_values }
    }

    /// Reader with no user values (all defaults)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of property values
    ///
    /// Strings, numbers and booleans are accepted; `null` counts as unset.
    /// Nested values are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| FlowError::Config(format!("Invalid configuration JSON: {}", e)))?;

        let object = value.as_object().ok_or_else(|| {
            FlowError::Config("Configuration must be a JSON object".to_string())
        })?;

        let mut values = HashMap::new();
        for (name, raw) in object {
            let text = match raw {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => continue,
                _ => {
                    log::warn!("Ignoring non-scalar value for property '{}'", name);
                    continue;
                }
            };
            if registry().get_property(name).is_none() {
                log::warn!("Unknown property '{}' ignored", name);
                continue;
            }
            values.insert(name.clone(), text);
        }

        Ok(Self::new(values))
    }

    /// Read a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_json(&text)
    }

    /// Set a single user value, replacing any previous one
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.user_values.remove(name);
        } else {
            self.user_values.insert(name.to_string(), value);
        }
    }

    /// Get string property (user value or registry default)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get enumerated property with validation
    ///
    /// Returns the user value (lowercased) if it is one of the registered
    /// values, otherwise the default.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            let value = value.trim();
            if reg.is_valid_enum_value(name, value) {
                return value.to_ascii_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            log::warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    /// Get f64 property, falling back to the default on parse failure
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = default_parsed::<f64>(name).unwrap_or(0.0);
        let Some(value) = self.user_values.get(name) else {
            return default;
        };

        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                log::warn!(
                    "Invalid numeric value '{}' for property '{}'. Using default: {}",
                    value,
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        let default = default_parsed::<f64>(name).unwrap_or(0.0);

        if value >= min && value <= max {
            value
        } else {
            log::warn!(
                "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
                value,
                name,
                min,
                max,
                default
            );
            default
        }
    }

    /// Get a non-negative integer property
    pub fn get_usize(&self, name: &str) -> usize {
        let default = default_parsed::<usize>(name).unwrap_or(0);
        let Some(value) = self.user_values.get(name) else {
            return default;
        };

        match value.trim().parse::<usize>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!(
                    "Invalid integer value '{}' for property '{}'. Using default: {}",
                    value,
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get boolean property; accepts `true`/`false` in any case
    pub fn get_bool(&self, name: &str) -> bool {
        let default = parse_bool(registry().get_default(name).unwrap_or("")).unwrap_or(false);
        let Some(value) = self.user_values.get(name) else {
            return default;
        };

        match parse_bool(value) {
            Some(v) => v,
            None => {
                log::warn!(
                    "Invalid boolean value '{}' for property '{}'. Using default: {}",
                    value,
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get optional u64 property (None if unset or invalid)
    pub fn get_optional_u64(&self, name: &str) -> Option<u64> {
        let value = self.get_string(name);
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        match value.parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!(
                    "Invalid unsigned value '{}' for property '{}'. Ignoring",
                    value,
                    name
                );
                None
            }
        }
    }
}

fn default_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    registry().get_default(name).and_then(|d| d.parse::<T>().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
