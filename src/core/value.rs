use std::{any::Any, fmt::Debug};

use serde_json::{Number, Value};

use crate::MapperError;

use super::class::ClassRef;

/// Class identity and cloning support for [`Mappable`] instances.
///
/// Implemented automatically for every `Mappable` type that is `Clone + Default`.
pub trait ClassIdentity {
    /// Runtime class of the instance.
    fn class_ref(&self) -> ClassRef;
    fn clone_boxed(&self) -> Box<dyn Mappable>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> ClassIdentity for T
where
    T: Mappable + Clone + Default,
{
    fn class_ref(&self) -> ClassRef {
        ClassRef::of::<T>()
    }

    fn clone_boxed(&self) -> Box<dyn Mappable> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A typed instance whose properties can be read and written by name.
///
/// The mapping metadata registered for the class decides which properties are
/// converted; `Mappable` only gives the mapper access to them.
///
/// # Examples
///
/// ```
/// use json_class_mapper::{FieldValue, Mappable, MapperError};
///
/// #[derive(Debug, Clone, Default)]
/// struct User {
///     name: String,
///     age: Option<i64>,
/// }
///
/// impl Mappable for User {
///     fn get_property(&self, property: &str) -> Option<FieldValue> {
///         match property {
///             "name" => Some(self.name.clone().into()),
///             "age" => Some(self.age.into()),
///             _ => None,
///         }
///     }
///
///     fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
///         match property {
///             "name" => self.name = value.take()?,
///             "age" => self.age = value.take()?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Mappable: ClassIdentity + Debug + Send + Sync + 'static {
    /// Reads a property. `None` means the property is absent, which is distinct
    /// from a present [`FieldValue::Null`].
    fn get_property(&self, property: &str) -> Option<FieldValue>;

    /// Writes a property converted from JSON.
    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError>;
}

impl Clone for Box<dyn Mappable> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Instance-side value tree.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Object(Box<dyn Mappable>),
    Array(Vec<FieldValue>),
    /// Untyped JSON kept as is (wildcard properties, disabled mode).
    Json(Value),
}

impl FieldValue {
    /// Wraps a typed instance.
    pub fn object<T: Mappable>(instance: T) -> FieldValue {
        FieldValue::Object(Box::new(instance))
    }

    /// Wraps an optional typed instance, `None` becoming [`FieldValue::Null`].
    pub fn optional_object<T: Mappable>(instance: Option<T>) -> FieldValue {
        instance.map_or(FieldValue::Null, FieldValue::object)
    }

    /// Wraps a sequence of typed instances.
    pub fn objects<T: Mappable>(instances: impl IntoIterator<Item = T>) -> FieldValue {
        FieldValue::Array(instances.into_iter().map(FieldValue::object).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Json(Value::Null))
    }

    /// Converts the value into a Rust field type.
    pub fn take<T: FromFieldValue>(self) -> Result<T, MapperError> {
        T::from_field_value(self)
    }

    /// Downcasts an object value into the concrete class `T`.
    pub fn into_instance<T: Mappable>(self) -> Result<T, MapperError> {
        match self {
            FieldValue::Object(instance) => {
                let actual = instance.class_ref().name();
                instance
                    .into_any()
                    .downcast::<T>()
                    .map(|boxed| *boxed)
                    .map_err(|_| MapperError::InstanceMismatch {
                        expected: std::any::type_name::<T>().to_string(),
                        actual: actual.to_string(),
                    })
            }
            other => Err(MapperError::InstanceMismatch {
                expected: std::any::type_name::<T>().to_string(),
                actual: other.kind_name(),
            }),
        }
    }

    /// Like [`FieldValue::into_instance`] but maps null to `None`.
    pub fn into_optional_instance<T: Mappable>(self) -> Result<Option<T>, MapperError> {
        if self.is_null() {
            return Ok(None);
        }
        self.into_instance().map(Some)
    }

    /// Downcasts an array of objects into instances of `T`.
    pub fn into_instances<T: Mappable>(self) -> Result<Vec<T>, MapperError> {
        match self {
            FieldValue::Array(items) => items.into_iter().map(FieldValue::into_instance).collect(),
            other => Err(MapperError::InstanceMismatch {
                expected: format!("[{}]", std::any::type_name::<T>()),
                actual: other.kind_name(),
            }),
        }
    }

    /// Describes the runtime kind of the value, class names included.
    pub fn kind_name(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(_) => "boolean".to_string(),
            FieldValue::Number(_) => "number".to_string(),
            FieldValue::String(_) => "string".to_string(),
            FieldValue::Object(instance) => instance.class_ref().name().to_string(),
            FieldValue::Array(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(FieldValue::kind_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            FieldValue::Json(value) => super::descriptor::json_type_name(value),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Null
    }
}

impl From<Value> for FieldValue {
    /// Scalars and arrays become structured values, JSON objects stay untyped.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(flag) => FieldValue::Bool(flag),
            Value::Number(number) => FieldValue::Number(number),
            Value::String(text) => FieldValue::String(text),
            Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            object @ Value::Object(_) => FieldValue::Json(object),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    /// Non-finite numbers have no JSON representation and become null.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(FieldValue::Null, FieldValue::Number)
    }
}

macro_rules! integer_field_value {
    ($($int:ty),*) => {
        $(
            impl From<$int> for FieldValue {
                fn from(value: $int) -> Self {
                    FieldValue::Number(Number::from(value))
                }
            }
        )*
    };
}

integer_field_value!(i32, i64, u32, u64, usize);

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a [`FieldValue`] into a Rust field type.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError>;
}

fn mismatch(expected: &str, actual: &FieldValue) -> MapperError {
    MapperError::PrimitiveTypeMismatch {
        expected: expected.to_string(),
        actual: actual.kind_name(),
    }
}

/// Unwraps untyped scalars so field conversions see structured values.
fn structured(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Json(json) if !json.is_object() => FieldValue::from(json),
        other => other,
    }
}

impl FromFieldValue for FieldValue {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        Ok(value)
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        match structured(value) {
            FieldValue::String(text) => Ok(text),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        match structured(value) {
            FieldValue::Bool(flag) => Ok(flag),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        match structured(value) {
            FieldValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| mismatch("number", &FieldValue::Number(number))),
            other => Err(mismatch("number", &other)),
        }
    }
}

impl FromFieldValue for i64 {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        match structured(value) {
            FieldValue::Number(number) => match number.as_i64() {
                Some(integer) => Ok(integer),
                None => Err(mismatch("integer", &FieldValue::Number(number))),
            },
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromFieldValue for u64 {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        match structured(value) {
            FieldValue::Number(number) => match number.as_u64() {
                Some(integer) => Ok(integer),
                None => Err(mismatch("unsigned integer", &FieldValue::Number(number))),
            },
            other => Err(mismatch("unsigned integer", &other)),
        }
    }
}

impl FromFieldValue for i32 {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        let integer = i64::from_field_value(value)?;
        i32::try_from(integer).map_err(|_| MapperError::PrimitiveTypeMismatch {
            expected: "32-bit integer".to_string(),
            actual: integer.to_string(),
        })
    }
}

impl FromFieldValue for Value {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        match value {
            FieldValue::Null => Ok(Value::Null),
            FieldValue::Bool(flag) => Ok(Value::Bool(flag)),
            FieldValue::Number(number) => Ok(Value::Number(number)),
            FieldValue::String(text) => Ok(Value::String(text)),
            FieldValue::Json(json) => Ok(json),
            FieldValue::Array(items) => items
                .into_iter()
                .map(Value::from_field_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other @ FieldValue::Object(_) => Err(mismatch("untyped JSON", &other)),
        }
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_field_value(value).map(Some)
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, MapperError> {
        match structured(value) {
            FieldValue::Array(items) => items.into_iter().map(T::from_field_value).collect(),
            other => Err(MapperError::ShapeMismatch {
                expected: "array".to_string(),
                actual: other.kind_name(),
            }),
        }
    }
}
