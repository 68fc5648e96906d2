use log::debug;
use serde_json::{Map, Value};

use crate::{
    core::{
        class::ClassRef,
        config::PropertyMatchingRule,
        descriptor::{autofill, json_type_name, TypeDescriptor},
        mapping::{Direction, Nullability, PropertyMapping},
        value::{FieldValue, Mappable},
    },
    MapperError,
};

use super::{preview, serialize::expected_label, shape_error, JsonMapper, MapperResult};

static NULL: Value = Value::Null;

impl JsonMapper {
    pub(super) fn deserialize_value_tree(
        &self,
        json: &Value,
        class: &ClassRef,
        partial: bool,
    ) -> MapperResult<FieldValue> {
        if self.is_disabled() {
            return Ok(FieldValue::Json(json.clone()));
        }

        match json {
            Value::Array(_) => self
                .deserialize_array_with(json, class, partial)
                .map(FieldValue::Array),
            Value::Object(_) | Value::Null => self.deserialize_object_with(json, class, partial),
            other => Err(shape_error("object or array", json_type_name(other))),
        }
    }

    pub(super) fn deserialize_object_with(
        &self,
        json: &Value,
        class: &ClassRef,
        partial: bool,
    ) -> MapperResult<FieldValue> {
        if self.is_disabled() {
            return Ok(FieldValue::Json(json.clone()));
        }

        self.traced("deserialize object", class.name(), json, || match json {
            Value::Null => {
                self.check_null(class.name(), true)?;
                Ok(FieldValue::Null)
            }
            Value::Object(object) => self
                .deserialize_instance(object, class, partial)
                .map(FieldValue::Object),
            other => Err(shape_error("object", json_type_name(other))),
        })
    }

    pub(super) fn deserialize_array_with(
        &self,
        json: &Value,
        class: &ClassRef,
        partial: bool,
    ) -> MapperResult<Vec<FieldValue>> {
        let Value::Array(items) = json else {
            return Err(shape_error("array", json_type_name(json)));
        };

        self.traced("deserialize array", class.name(), json, || {
            items
                .iter()
                .map(|item| self.deserialize_object_with(item, class, partial))
                .collect()
        })
    }

    /// Builds an instance of `expected`, or of the subclass named by the
    /// discriminator, from a JSON object.
    fn deserialize_instance(
        &self,
        object: &Map<String, Value>,
        expected: &ClassRef,
        partial: bool,
    ) -> MapperResult<Box<dyn Mappable>> {
        let class = self.resolve_discriminator(object, expected)?;
        let mut instance = class.instantiate();

        for mapping in self.store.properties(&class)? {
            self.deserialize_property(object, &class, mapping, instance.as_mut(), partial)?;
        }

        Ok(instance)
    }

    fn resolve_discriminator(
        &self,
        object: &Map<String, Value>,
        expected: &ClassRef,
    ) -> MapperResult<ClassRef> {
        if !self.config.use_discriminator {
            return Ok(*expected);
        }
        let Some(tag) = object.get(&self.config.discriminator_property_name) else {
            return Ok(*expected);
        };

        let key = tag
            .as_str()
            .ok_or_else(|| MapperError::UnknownDiscriminator(tag.to_string()))?;
        let class = self
            .registry
            .resolve(key)
            .ok_or_else(|| MapperError::UnknownDiscriminator(key.to_string()))?;

        if !self.store.is_subclass_of(&class, expected) {
            return Err(MapperError::IncompatibleSubtype {
                expected: expected.name().to_string(),
                actual: class.name().to_string(),
            });
        }

        debug!(
            "Discriminator {} resolved to class {} (expected {})",
            key,
            class.name(),
            expected.name()
        );
        Ok(class)
    }

    /// Finds the JSON value of a mapped property according to the matching rule.
    fn lookup<'a>(&self, object: &'a Map<String, Value>, json_name: &str) -> Option<&'a Value> {
        object.get(json_name).or_else(|| {
            match self.config.property_matching_rule {
                PropertyMatchingRule::CaseStrict => None,
                PropertyMatchingRule::CaseInsensitive => object
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(json_name))
                    .map(|(_, value)| value),
            }
        })
    }

    fn deserialize_property(
        &self,
        object: &Map<String, Value>,
        class: &ClassRef,
        mapping: &PropertyMapping,
        instance: &mut dyn Mappable,
        partial: bool,
    ) -> MapperResult<()> {
        let property = mapping.class_property_name();
        let mode = mapping.converting_mode();

        let source = match self.lookup(object, mapping.json_property_name()) {
            Some(value) => value,
            None if self.config.map_missing_to_null => &NULL,
            None if partial
                || self.config.ignore_required_check
                || mode.optionality.allows_missing(Direction::Deserialize) =>
            {
                return Ok(());
            }
            None => {
                return Err(MapperError::RequiredPropertyMissing {
                    class: class.name().to_string(),
                    property: property.to_string(),
                    source_kind: "JSON",
                });
            }
        };

        let wrap = |cause: MapperError| MapperError::Conversion {
            class: class.name().to_string(),
            property: property.to_string(),
            expected: expected_label(mapping),
            actual: json_type_name(source),
            value: preview(source),
            source: Box::new(cause),
        };

        if source.is_null() {
            match mode.nullability {
                Nullability::Ignore => return Ok(()),
                Nullability::Pass => {
                    return instance.set_property(property, FieldValue::Null).map_err(wrap);
                }
                Nullability::Map => {}
            }
        }

        let value = match mapping.custom_converter() {
            Some(converter) => converter
                .deserialize(source)
                .map_err(|error| MapperError::Converter(error.into())),
            None => self.deserialize_value(mapping.expected_type(), source, partial),
        }
        .map_err(wrap)?;

        if value.is_null() && mode.nullability == Nullability::Ignore {
            return Ok(());
        }
        instance.set_property(property, value).map_err(wrap)
    }

    /// Verifies a JSON value against its expected type and converts it.
    fn deserialize_value(
        &self,
        expected: &TypeDescriptor,
        json: &Value,
        partial: bool,
    ) -> MapperResult<FieldValue> {
        match expected {
            TypeDescriptor::Converter(converter) => converter
                .deserialize(json)
                .map_err(|error| MapperError::Converter(error.into())),
            TypeDescriptor::Any => {
                if json.is_null() {
                    self.check_null("any", true)?;
                }
                Ok(FieldValue::from(json.clone()))
            }
            TypeDescriptor::Array(elements) => match json {
                Value::Null => {
                    self.check_null(&expected.expected_type_name(), true)?;
                    Ok(FieldValue::Null)
                }
                Value::Array(items) if items.is_empty() => Ok(FieldValue::Array(Vec::new())),
                Value::Array(_) if elements.is_empty() => Ok(FieldValue::from(json.clone())),
                Value::Array(items) => items
                    .iter()
                    .zip(autofill(elements, items.len()))
                    .map(|(item, element)| self.deserialize_value(element, item, partial))
                    .collect::<MapperResult<Vec<_>>>()
                    .map(FieldValue::Array),
                other => Err(MapperError::ShapeMismatch {
                    expected: expected.expected_type_name(),
                    actual: json_type_name(other),
                }),
            },
            _ if json.is_array() => Err(MapperError::ShapeMismatch {
                expected: expected.expected_type_name(),
                actual: json_type_name(json),
            }),
            TypeDescriptor::Primitive(primitive) => {
                if json.is_null() {
                    self.check_null(primitive.name(), false)?;
                    Ok(FieldValue::Null)
                } else if primitive.matches_json(json) || self.config.ignore_primitive_checks {
                    Ok(FieldValue::from(json.clone()))
                } else {
                    Err(MapperError::PrimitiveTypeMismatch {
                        expected: primitive.name().to_string(),
                        actual: json_type_name(json),
                    })
                }
            }
            TypeDescriptor::Class(class) => self.deserialize_nested(class, json, partial),
            TypeDescriptor::Lazy(name) => {
                let class = self.resolve_lazy(name)?;
                self.deserialize_nested(&class, json, partial)
            }
        }
    }

    fn deserialize_nested(
        &self,
        class: &ClassRef,
        json: &Value,
        partial: bool,
    ) -> MapperResult<FieldValue> {
        match json {
            Value::Null => {
                self.check_null(class.name(), true)?;
                Ok(FieldValue::Null)
            }
            Value::Object(object) => self
                .deserialize_instance(object, class, partial)
                .map(FieldValue::Object),
            other => Err(MapperError::UnknownType {
                expected: class.name().to_string(),
                actual: json_type_name(other),
            }),
        }
    }
}
