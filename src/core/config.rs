use std::fmt;

use serde::{Deserialize, Serialize};

/// Global switch of the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationMode {
    /// Every conversion returns its input unchanged.
    Disable,
    #[default]
    Enable,
    /// Like `Enable`, and traces input and output of each object and array conversion.
    Logging,
}

/// Where `null` values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueCheckingMode {
    AllowNull,
    /// Null is accepted for objects and arrays, not for primitives.
    #[default]
    AllowObjectNull,
    DisallowNull,
}

impl ValueCheckingMode {
    /// Tells whether null is accepted where an object (`true`) or a primitive
    /// (`false`) is expected.
    pub fn allows_null(&self, object_level: bool) -> bool {
        match self {
            ValueCheckingMode::AllowNull => true,
            ValueCheckingMode::AllowObjectNull => object_level,
            ValueCheckingMode::DisallowNull => false,
        }
    }
}

impl fmt::Display for ValueCheckingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueCheckingMode::AllowNull => "ALLOW_NULL",
            ValueCheckingMode::AllowObjectNull => "ALLOW_OBJECT_NULL",
            ValueCheckingMode::DisallowNull => "DISALLOW_NULL",
        })
    }
}

/// How JSON keys are matched against mapped JSON property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyMatchingRule {
    #[default]
    CaseStrict,
    /// An exact match is preferred, then the first key equal ignoring ASCII case.
    CaseInsensitive,
}

pub const DEFAULT_DISCRIMINATOR_PROPERTY_NAME: &str = "$type";

/// Engine wide conversion switches.
///
/// The configuration can be read from JSON, every field being optional:
///
/// ```
/// use json_class_mapper::{MapperConfig, ValueCheckingMode};
///
/// let config: MapperConfig = serde_json::from_str(
///     r#"{"valueCheckingMode": "DISALLOW_NULL", "useDiscriminator": true}"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.value_checking_mode, ValueCheckingMode::DisallowNull);
/// assert!(config.use_discriminator);
/// assert_eq!(config.discriminator_property_name, "$type");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapperConfig {
    pub operation_mode: OperationMode,
    pub value_checking_mode: ValueCheckingMode,
    /// Passes primitives of the wrong kind through unchanged.
    pub ignore_primitive_checks: bool,
    /// Treats every property as optional.
    pub ignore_required_check: bool,
    /// Treats absent source values as explicit nulls.
    pub map_missing_to_null: bool,
    pub use_discriminator: bool,
    pub discriminator_property_name: String,
    pub property_matching_rule: PropertyMatchingRule,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            operation_mode: OperationMode::default(),
            value_checking_mode: ValueCheckingMode::default(),
            ignore_primitive_checks: false,
            ignore_required_check: false,
            map_missing_to_null: false,
            use_discriminator: false,
            discriminator_property_name: DEFAULT_DISCRIMINATOR_PROPERTY_NAME.to_string(),
            property_matching_rule: PropertyMatchingRule::default(),
        }
    }
}
