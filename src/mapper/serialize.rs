use std::borrow::Cow;

use log::debug;
use serde_json::{Map, Value};

use crate::{
    core::{
        class::ClassRef,
        descriptor::{autofill, TypeDescriptor},
        mapping::{Direction, Nullability, PropertyMapping},
        value::{FieldValue, Mappable},
    },
    MapperError,
};

use super::{preview, shape_error, untyped_name, JsonMapper, MapperResult};

/// Unwraps untyped scalars and arrays so they verify like structured values.
fn structured(value: &FieldValue) -> Cow<'_, FieldValue> {
    match value {
        FieldValue::Json(json) if !json.is_object() => Cow::Owned(FieldValue::from(json.clone())),
        other => Cow::Borrowed(other),
    }
}

fn class_label(class: Option<&ClassRef>) -> &'static str {
    class.map_or("runtime class", ClassRef::name)
}

impl JsonMapper {
    pub(super) fn serialize_value_tree(
        &self,
        value: &FieldValue,
        class: Option<&ClassRef>,
        partial: bool,
    ) -> MapperResult<Value> {
        if self.is_disabled() {
            return Ok(self.plain_json(value));
        }

        match structured(value).as_ref() {
            FieldValue::Array(_) => self
                .serialize_array_with(value, class, partial)
                .map(Value::Array),
            FieldValue::Object(_) | FieldValue::Null => {
                self.serialize_object_with(value, class, partial)
            }
            FieldValue::Json(Value::Object(_)) if class.is_some() => {
                self.serialize_object_with(value, class, partial)
            }
            FieldValue::Json(json) => Err(shape_error("object or array", untyped_name(json))),
            other => Err(shape_error("object or array", other.kind_name())),
        }
    }

    pub(super) fn serialize_object_with(
        &self,
        value: &FieldValue,
        class: Option<&ClassRef>,
        partial: bool,
    ) -> MapperResult<Value> {
        if self.is_disabled() {
            return Ok(self.plain_json(value));
        }

        self.traced("serialize object", class_label(class), value, || {
            match value {
                FieldValue::Null => {
                    self.check_null(class_label(class), true)?;
                    Ok(Value::Null)
                }
                FieldValue::Object(instance) => {
                    self.serialize_instance_with(instance.as_ref(), class, partial)
                }
                FieldValue::Json(Value::Object(object)) => match class {
                    Some(class) => self.serialize_plain_with(object, class, partial),
                    None => Err(shape_error("object", "untyped JSON object".to_string())),
                },
                FieldValue::Json(json) => Err(shape_error("object", untyped_name(json))),
                other => Err(shape_error("object", other.kind_name())),
            }
        })
    }

    pub(super) fn serialize_array_with(
        &self,
        value: &FieldValue,
        class: Option<&ClassRef>,
        partial: bool,
    ) -> MapperResult<Vec<Value>> {
        let value = structured(value);
        let FieldValue::Array(items) = value.as_ref() else {
            return Err(shape_error("array", value.kind_name()));
        };

        self.traced("serialize array", class_label(class), items, || {
            items
                .iter()
                .map(|item| self.serialize_object_with(item, class, partial))
                .collect()
        })
    }

    /// Serializes one instance with the metadata of its class.
    ///
    /// Without discriminators the statically expected class decides which
    /// properties are written; with them the runtime class does, and its
    /// registry key is written under the discriminator property.
    pub(super) fn serialize_instance_with(
        &self,
        instance: &dyn Mappable,
        expected: Option<&ClassRef>,
        partial: bool,
    ) -> MapperResult<Value> {
        let runtime = instance.class_ref();
        if let Some(expected) = expected {
            if !self.store.is_subclass_of(&runtime, expected) {
                return Err(MapperError::InstanceMismatch {
                    expected: expected.name().to_string(),
                    actual: runtime.name().to_string(),
                });
            }
        }

        let mut json = Map::new();
        let class = if self.config.use_discriminator {
            self.write_discriminator(&mut json, &runtime);
            runtime
        } else {
            expected.copied().unwrap_or(runtime)
        };

        for mapping in self.store.properties(&class)? {
            let source = instance.get_property(mapping.class_property_name());
            if let Some(value) = self.serialize_property(source, &class, mapping, partial)? {
                json.insert(mapping.json_property_name().to_string(), value);
            }
        }

        Ok(Value::Object(json))
    }

    /// Serializes a plain JSON object keyed by class property names.
    ///
    /// The object has no runtime class, so the expected class decides which
    /// keys are read. Keys it does not declare are ignored.
    fn serialize_plain_with(
        &self,
        object: &Map<String, Value>,
        class: &ClassRef,
        partial: bool,
    ) -> MapperResult<Value> {
        let mut json = Map::new();
        if self.config.use_discriminator {
            self.write_discriminator(&mut json, class);
        }

        for mapping in self.store.properties(class)? {
            let source = object
                .get(mapping.class_property_name())
                .cloned()
                .map(FieldValue::from);
            if let Some(value) = self.serialize_property(source, class, mapping, partial)? {
                json.insert(mapping.json_property_name().to_string(), value);
            }
        }

        Ok(Value::Object(json))
    }

    fn write_discriminator(&self, json: &mut Map<String, Value>, class: &ClassRef) {
        let key = self.store.registry_key(class);
        if self.registry.is_registered_as(&key, class) {
            json.insert(
                self.config.discriminator_property_name.clone(),
                Value::String(key),
            );
        } else {
            debug!(
                "Class {} is not registered, discriminator left out",
                class.name()
            );
        }
    }

    /// Converts one property; `None` leaves it out of the JSON object.
    fn serialize_property(
        &self,
        source: Option<FieldValue>,
        class: &ClassRef,
        mapping: &PropertyMapping,
        partial: bool,
    ) -> MapperResult<Option<Value>> {
        let property = mapping.class_property_name();
        let mode = mapping.converting_mode();

        let source = match source {
            Some(value) => value,
            None if self.config.map_missing_to_null => FieldValue::Null,
            None if partial
                || self.config.ignore_required_check
                || mode.optionality.allows_missing(Direction::Serialize) =>
            {
                return Ok(None);
            }
            None => {
                return Err(MapperError::RequiredPropertyMissing {
                    class: class.name().to_string(),
                    property: property.to_string(),
                    source_kind: "instance",
                });
            }
        };

        if source.is_null() {
            match mode.nullability {
                Nullability::Ignore => return Ok(None),
                Nullability::Pass => return Ok(Some(Value::Null)),
                Nullability::Map => {}
            }
        }

        let result = match mapping.custom_converter() {
            Some(converter) => converter
                .serialize(&source)
                .map_err(|error| MapperError::Converter(error.into())),
            None => self.serialize_value(mapping.expected_type(), &source, partial),
        };

        let json = result.map_err(|cause| {
            let plain = self.plain_json(&source);
            MapperError::Conversion {
                class: class.name().to_string(),
                property: property.to_string(),
                expected: expected_label(mapping),
                actual: source.kind_name(),
                value: preview(&plain),
                source: Box::new(cause),
            }
        })?;

        if json.is_null() && mode.nullability == Nullability::Ignore {
            return Ok(None);
        }
        Ok(Some(json))
    }

    /// Verifies a value against its expected type and converts it.
    fn serialize_value(
        &self,
        expected: &TypeDescriptor,
        value: &FieldValue,
        partial: bool,
    ) -> MapperResult<Value> {
        let value = structured(value);
        let value = value.as_ref();

        match expected {
            TypeDescriptor::Converter(converter) => converter
                .serialize(value)
                .map_err(|error| MapperError::Converter(error.into())),
            TypeDescriptor::Any => {
                if value.is_null() {
                    self.check_null("any", true)?;
                }
                Ok(self.plain_json(value))
            }
            TypeDescriptor::Array(elements) => match value {
                FieldValue::Null => {
                    self.check_null(&expected.expected_type_name(), true)?;
                    Ok(Value::Null)
                }
                FieldValue::Array(items) if items.is_empty() => Ok(Value::Array(Vec::new())),
                FieldValue::Array(_) if elements.is_empty() => Ok(self.plain_json(value)),
                FieldValue::Array(items) => items
                    .iter()
                    .zip(autofill(elements, items.len()))
                    .map(|(item, element)| self.serialize_value(element, item, partial))
                    .collect::<MapperResult<Vec<_>>>()
                    .map(Value::Array),
                other => Err(MapperError::ShapeMismatch {
                    expected: expected.expected_type_name(),
                    actual: other.kind_name(),
                }),
            },
            _ if matches!(value, FieldValue::Array(_)) => Err(MapperError::ShapeMismatch {
                expected: expected.expected_type_name(),
                actual: value.kind_name(),
            }),
            TypeDescriptor::Primitive(primitive) => {
                if value.is_null() {
                    self.check_null(primitive.name(), false)?;
                    Ok(Value::Null)
                } else if primitive.matches_field(value) || self.config.ignore_primitive_checks {
                    Ok(self.plain_json(value))
                } else {
                    Err(MapperError::PrimitiveTypeMismatch {
                        expected: primitive.name().to_string(),
                        actual: value.kind_name(),
                    })
                }
            }
            TypeDescriptor::Class(class) => self.serialize_nested(class, value, partial),
            TypeDescriptor::Lazy(name) => {
                let class = self.resolve_lazy(name)?;
                self.serialize_nested(&class, value, partial)
            }
        }
    }

    fn serialize_nested(
        &self,
        class: &ClassRef,
        value: &FieldValue,
        partial: bool,
    ) -> MapperResult<Value> {
        match value {
            FieldValue::Null => {
                self.check_null(class.name(), true)?;
                Ok(Value::Null)
            }
            FieldValue::Object(instance) => {
                self.serialize_instance_with(instance.as_ref(), Some(class), partial)
            }
            FieldValue::Json(Value::Object(object)) => {
                self.serialize_plain_with(object, class, partial)
            }
            other => Err(MapperError::UnknownType {
                expected: class.name().to_string(),
                actual: other.kind_name(),
            }),
        }
    }
}

pub(super) fn expected_label(mapping: &PropertyMapping) -> String {
    match mapping.custom_converter() {
        Some(_) => "custom converter".to_string(),
        None => mapping.expected_type().expected_type_name(),
    }
}
