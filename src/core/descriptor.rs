use std::{fmt, sync::Arc};

use serde_json::Value;

use super::{
    class::ClassRef,
    value::{FieldValue, Mappable},
};

/// Primitive JSON kinds a property can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
        }
    }

    pub fn matches_json(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (PrimitiveType::String, Value::String(_))
                | (PrimitiveType::Number, Value::Number(_))
                | (PrimitiveType::Boolean, Value::Bool(_))
        )
    }

    pub fn matches_field(&self, value: &FieldValue) -> bool {
        match value {
            FieldValue::String(_) => *self == PrimitiveType::String,
            FieldValue::Number(_) => *self == PrimitiveType::Number,
            FieldValue::Bool(_) => *self == PrimitiveType::Boolean,
            FieldValue::Json(json) => self.matches_json(json),
            _ => false,
        }
    }
}

/// User supplied converter replacing type verification for a property.
///
/// Converters are stateless: the same instance is shared by every mapping that
/// refers to it. Their output is not validated.
///
/// # Examples
///
/// ```
/// use json_class_mapper::{CustomConverter, FieldValue};
/// use serde_json::{json, Value};
///
/// /// Stores a flag as "yes"/"no" in JSON.
/// struct YesNoConverter;
///
/// impl CustomConverter for YesNoConverter {
///     fn serialize(&self, value: &FieldValue) -> anyhow::Result<Value> {
///         match value {
///             FieldValue::Bool(true) => Ok(json!("yes")),
///             FieldValue::Bool(false) => Ok(json!("no")),
///             other => anyhow::bail!("expected a flag, got {}", other.kind_name()),
///         }
///     }
///
///     fn deserialize(&self, json: &Value) -> anyhow::Result<FieldValue> {
///         match json.as_str() {
///             Some("yes") => Ok(FieldValue::Bool(true)),
///             Some("no") => Ok(FieldValue::Bool(false)),
///             _ => anyhow::bail!("expected yes or no, got {json}"),
///         }
///     }
/// }
///
/// let converter = YesNoConverter;
/// assert_eq!(converter.serialize(&FieldValue::Bool(true)).unwrap(), json!("yes"));
/// ```
pub trait CustomConverter: Send + Sync {
    fn serialize(&self, value: &FieldValue) -> anyhow::Result<Value>;

    fn deserialize(&self, json: &Value) -> anyhow::Result<FieldValue>;
}

/// Expected shape of a property.
#[derive(Clone)]
pub enum TypeDescriptor {
    /// Accepts any value unchanged.
    Any,
    Primitive(PrimitiveType),
    /// A mapped class, converted recursively with its own metadata.
    Class(ClassRef),
    /// A class referenced by registry key, resolved at conversion time.
    Lazy(String),
    Converter(Arc<dyn CustomConverter>),
    /// Per-position element descriptors; the last one is reused for the
    /// remaining positions and an empty list accepts any content.
    Array(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveType::String)
    }

    pub fn number() -> Self {
        TypeDescriptor::Primitive(PrimitiveType::Number)
    }

    pub fn boolean() -> Self {
        TypeDescriptor::Primitive(PrimitiveType::Boolean)
    }

    pub fn class<T: Mappable + Default>() -> Self {
        TypeDescriptor::Class(ClassRef::of::<T>())
    }

    pub fn lazy(name: impl Into<String>) -> Self {
        TypeDescriptor::Lazy(name.into())
    }

    pub fn converter(converter: impl CustomConverter + 'static) -> Self {
        TypeDescriptor::Converter(Arc::new(converter))
    }

    /// Array whose every element has the given descriptor.
    pub fn array_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array(vec![element])
    }

    /// Human readable description used in error messages.
    pub fn expected_type_name(&self) -> String {
        match self {
            TypeDescriptor::Any => "any".to_string(),
            TypeDescriptor::Primitive(primitive) => primitive.name().to_string(),
            TypeDescriptor::Class(class) => class.name().to_string(),
            TypeDescriptor::Lazy(name) => name.clone(),
            TypeDescriptor::Converter(_) => "custom converter".to_string(),
            TypeDescriptor::Array(elements) => format!(
                "[{}]",
                elements
                    .iter()
                    .map(TypeDescriptor::expected_type_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_))
    }
}

impl From<PrimitiveType> for TypeDescriptor {
    fn from(primitive: PrimitiveType) -> Self {
        TypeDescriptor::Primitive(primitive)
    }
}

impl From<ClassRef> for TypeDescriptor {
    fn from(class: ClassRef) -> Self {
        TypeDescriptor::Class(class)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Any => f.write_str("Any"),
            TypeDescriptor::Primitive(primitive) => write!(f, "Primitive({primitive:?})"),
            TypeDescriptor::Class(class) => write!(f, "Class({})", class.name()),
            TypeDescriptor::Lazy(name) => write!(f, "Lazy({name})"),
            TypeDescriptor::Converter(_) => f.write_str("Converter"),
            TypeDescriptor::Array(elements) => f.debug_tuple("Array").field(elements).finish(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expected_type_name())
    }
}

/// Describes the kind of a JSON value, array element kinds included.
pub fn json_type_name(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Object(_) => "object".to_string(),
        Value::Array(items) => format!(
            "[{}]",
            items
                .iter()
                .map(json_type_name)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Element descriptors extended to `len` positions by repeating the last one.
///
/// The stored descriptors are only borrowed; the extension lives in the
/// returned buffer.
pub(crate) fn autofill(elements: &[TypeDescriptor], len: usize) -> Vec<&TypeDescriptor> {
    let mut working: Vec<&TypeDescriptor> = elements.iter().take(len).collect();
    if let Some(last) = elements.last() {
        while working.len() < len {
            working.push(last);
        }
    }
    working
}
