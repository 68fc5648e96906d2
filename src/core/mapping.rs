use std::{collections::HashSet, fmt, sync::Arc};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::MapperError;

use super::{
    class::ClassRef,
    descriptor::{CustomConverter, TypeDescriptor},
    value::Mappable,
};

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Serialize,
    Deserialize,
}

/// When a property may be absent from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Optionality {
    /// The property must always be present.
    #[default]
    Never,
    Always,
    /// Optional when producing JSON, required when reading it.
    SerializeOnly,
    /// Optional when reading JSON, required when producing it.
    DeserializeOnly,
}

impl Optionality {
    pub fn allows_missing(&self, direction: Direction) -> bool {
        match self {
            Optionality::Never => false,
            Optionality::Always => true,
            Optionality::SerializeOnly => direction == Direction::Serialize,
            Optionality::DeserializeOnly => direction == Direction::Deserialize,
        }
    }
}

/// How a `null` source value is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Nullability {
    /// Null goes through type verification and the value checking mode.
    #[default]
    Map,
    /// Null is left out of the result.
    Ignore,
    /// Null is written to the result without any check.
    Pass,
}

/// Per-property presence and null policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConvertingMode {
    pub optionality: Optionality,
    pub nullability: Nullability,
}

impl ConvertingMode {
    pub fn required() -> Self {
        ConvertingMode::default()
    }

    pub fn optional() -> Self {
        ConvertingMode {
            optionality: Optionality::Always,
            ..ConvertingMode::default()
        }
    }

    pub fn serialize_optional() -> Self {
        ConvertingMode {
            optionality: Optionality::SerializeOnly,
            ..ConvertingMode::default()
        }
    }

    pub fn deserialize_optional() -> Self {
        ConvertingMode {
            optionality: Optionality::DeserializeOnly,
            ..ConvertingMode::default()
        }
    }

    pub fn ignore_null(mut self) -> Self {
        self.nullability = Nullability::Ignore;
        self
    }

    pub fn pass_null(mut self) -> Self {
        self.nullability = Nullability::Pass;
        self
    }
}

/// Mapping of one class property to one JSON key.
#[derive(Clone)]
pub struct PropertyMapping {
    class_property_name: String,
    json_property_name: String,
    expected_type: TypeDescriptor,
    converting_mode: ConvertingMode,
    custom_converter: Option<Arc<dyn CustomConverter>>,
}

impl PropertyMapping {
    pub fn new(
        class_property_name: impl Into<String>,
        json_property_name: impl Into<String>,
        expected_type: TypeDescriptor,
    ) -> Self {
        Self {
            class_property_name: class_property_name.into(),
            json_property_name: json_property_name.into(),
            expected_type,
            converting_mode: ConvertingMode::default(),
            custom_converter: None,
        }
    }

    pub fn mode(mut self, converting_mode: ConvertingMode) -> Self {
        self.converting_mode = converting_mode;
        self
    }

    pub fn converter(mut self, converter: impl CustomConverter + 'static) -> Self {
        self.custom_converter = Some(Arc::new(converter));
        self
    }

    pub fn shared_converter(mut self, converter: Arc<dyn CustomConverter>) -> Self {
        self.custom_converter = Some(converter);
        self
    }

    pub fn class_property_name(&self) -> &str {
        &self.class_property_name
    }

    pub fn json_property_name(&self) -> &str {
        &self.json_property_name
    }

    pub fn expected_type(&self) -> &TypeDescriptor {
        &self.expected_type
    }

    pub fn converting_mode(&self) -> ConvertingMode {
        self.converting_mode
    }

    pub fn custom_converter(&self) -> Option<&Arc<dyn CustomConverter>> {
        self.custom_converter.as_ref()
    }
}

impl fmt::Debug for PropertyMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMapping")
            .field("class_property_name", &self.class_property_name)
            .field("json_property_name", &self.json_property_name)
            .field("expected_type", &self.expected_type)
            .field("converting_mode", &self.converting_mode)
            .field("custom_converter", &self.custom_converter.is_some())
            .finish()
    }
}

/// Mapping metadata declared by one class.
///
/// Only the class' own declarations are stored here; inherited properties are
/// merged by [`crate::core::store::MetadataStore::properties`].
#[derive(Debug, Clone)]
pub struct ClassMetadata {
    class: ClassRef,
    parent: Option<ClassRef>,
    discriminator: Option<String>,
    properties: Vec<PropertyMapping>,
}

impl ClassMetadata {
    pub fn class(&self) -> ClassRef {
        self.class
    }

    pub fn parent(&self) -> Option<ClassRef> {
        self.parent
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    /// Registry key of the class: its discriminator, or its name.
    pub fn registry_key(&self) -> &str {
        self.discriminator().unwrap_or(self.class.name())
    }

    pub fn properties(&self) -> &[PropertyMapping] {
        &self.properties
    }

    pub fn property(&self, class_property_name: &str) -> Option<&PropertyMapping> {
        self.properties
            .iter()
            .find(|mapping| mapping.class_property_name == class_property_name)
    }

    /// Adds the declarations of `other` (same class) to this metadata.
    pub(crate) fn merge(&mut self, other: ClassMetadata) -> Result<(), MapperError> {
        if let Some(duplicate) = other
            .properties
            .iter()
            .find(|mapping| self.property(&mapping.class_property_name).is_some())
        {
            return Err(MapperError::DuplicatePropertyMapping {
                class: self.class.name().to_string(),
                property: duplicate.class_property_name.clone(),
            });
        }
        self.properties.extend(other.properties);
        if other.parent.is_some() {
            self.parent = other.parent;
        }
        if other.discriminator.is_some() {
            self.discriminator = other.discriminator;
        }
        Ok(())
    }
}

/// Builder of [`ClassMetadata`].
///
/// # Examples
///
/// ```
/// use json_class_mapper::{ClassMetadataBuilder, ClassRef, ConvertingMode, TypeDescriptor};
/// # use json_class_mapper::{FieldValue, Mappable, MapperError};
/// # #[derive(Debug, Clone, Default)]
/// # struct Person { name: String, nickname: Option<String> }
/// # impl Mappable for Person {
/// #     fn get_property(&self, _: &str) -> Option<FieldValue> { None }
/// #     fn set_property(&mut self, _: &str, _: FieldValue) -> Result<(), MapperError> { Ok(()) }
/// # }
///
/// let metadata = ClassMetadataBuilder::new(ClassRef::of::<Person>())
///     .discriminator("person")
///     .map("name", "name", TypeDescriptor::string())
///     .map_with("nickname", "nick", TypeDescriptor::string(), ConvertingMode::optional())
///     .build()
///     .unwrap();
///
/// assert_eq!(metadata.registry_key(), "person");
/// assert_eq!(metadata.properties().len(), 2);
/// ```
pub struct ClassMetadataBuilder {
    class: ClassRef,
    parent: Option<ClassRef>,
    discriminator: Option<String>,
    properties: Vec<PropertyMapping>,
}

impl ClassMetadataBuilder {
    pub fn new(class: ClassRef) -> ClassMetadataBuilder {
        Self {
            class,
            parent: None,
            discriminator: None,
            properties: Vec::new(),
        }
    }

    pub fn of<T: Mappable + Default>() -> ClassMetadataBuilder {
        Self::new(ClassRef::of::<T>())
    }

    /// Declares the parent class whose properties are inherited.
    pub fn extends(mut self, parent: ClassRef) -> ClassMetadataBuilder {
        self.parent = Some(parent);
        self
    }

    pub fn discriminator(mut self, discriminator: impl Into<String>) -> ClassMetadataBuilder {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn property(mut self, mapping: PropertyMapping) -> ClassMetadataBuilder {
        self.properties.push(mapping);
        self
    }

    pub fn map(
        self,
        class_property_name: &str,
        json_property_name: &str,
        expected_type: TypeDescriptor,
    ) -> ClassMetadataBuilder {
        self.property(PropertyMapping::new(
            class_property_name,
            json_property_name,
            expected_type,
        ))
    }

    pub fn map_with(
        self,
        class_property_name: &str,
        json_property_name: &str,
        expected_type: TypeDescriptor,
        converting_mode: ConvertingMode,
    ) -> ClassMetadataBuilder {
        self.property(
            PropertyMapping::new(class_property_name, json_property_name, expected_type)
                .mode(converting_mode),
        )
    }

    /// Builds the metadata, rejecting properties declared more than once.
    pub fn build(self) -> Result<ClassMetadata, MapperError> {
        let mut seen = HashSet::new();
        for mapping in &self.properties {
            if !seen.insert(mapping.class_property_name.as_str()) {
                return Err(MapperError::DuplicatePropertyMapping {
                    class: self.class.name().to_string(),
                    property: mapping.class_property_name.clone(),
                });
            }
        }

        debug!(
            "Mapping metadata built for class {} with {} properties",
            self.class.name(),
            self.properties.len()
        );

        Ok(ClassMetadata {
            class: self.class,
            parent: self.parent,
            discriminator: self.discriminator,
            properties: self.properties,
        })
    }
}
