#![allow(dead_code)]

mod mocks;

pub use mocks::MockConverter;

use anyhow::anyhow;
use json_class_mapper::{
    ClassMetadataBuilder, ClassRef, ConvertingMode, CustomConverter, FieldValue, JsonMapper,
    JsonMapperBuilder, Mappable, MapperError, MetadataStore, TypeDescriptor,
};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl Mappable for Address {
    fn get_property(&self, property: &str) -> Option<FieldValue> {
        match property {
            "street" => Some(self.street.clone().into()),
            "city" => Some(self.city.clone().into()),
            _ => None,
        }
    }

    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
        match property {
            "street" => self.street = value.take()?,
            "city" => self.city = value.take()?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: Option<i64>,
    pub address: Option<Address>,
    pub tags: Vec<String>,
}

impl Mappable for Person {
    fn get_property(&self, property: &str) -> Option<FieldValue> {
        match property {
            "name" => Some(self.name.clone().into()),
            // Unknown values are absent rather than null.
            "age" => self.age.map(FieldValue::from),
            "address" => self.address.clone().map(FieldValue::object),
            "tags" => Some(self.tags.clone().into()),
            _ => None,
        }
    }

    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
        match property {
            "name" => self.name = value.take()?,
            "age" => self.age = value.take()?,
            "address" => self.address = value.into_optional_instance()?,
            "tags" => self.tags = value.take()?,
            _ => {}
        }
        Ok(())
    }
}

/// Stores a list of strings as one comma separated JSON string.
pub struct CommaListConverter;

impl CustomConverter for CommaListConverter {
    fn serialize(&self, value: &FieldValue) -> anyhow::Result<Value> {
        let items: Vec<String> = value.clone().take()?;
        Ok(Value::String(items.join(",")))
    }

    fn deserialize(&self, json: &Value) -> anyhow::Result<FieldValue> {
        let text = json
            .as_str()
            .ok_or_else(|| anyhow!("expected a comma separated string, got {json}"))?;
        let items: Vec<String> = text
            .split(',')
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        Ok(items.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animal {
    pub name: String,
}

impl Mappable for Animal {
    fn get_property(&self, property: &str) -> Option<FieldValue> {
        (property == "name").then(|| self.name.clone().into())
    }

    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
        if property == "name" {
            self.name = value.take()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dog {
    pub name: String,
    pub barks: bool,
}

impl Mappable for Dog {
    fn get_property(&self, property: &str) -> Option<FieldValue> {
        match property {
            "name" => Some(self.name.clone().into()),
            "barks" => Some(self.barks.into()),
            _ => None,
        }
    }

    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
        match property {
            "name" => self.name = value.take()?,
            "barks" => self.barks = value.take()?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cat {
    pub name: String,
    pub lives: i64,
}

impl Mappable for Cat {
    fn get_property(&self, property: &str) -> Option<FieldValue> {
        match property {
            "name" => Some(self.name.clone().into()),
            "lives" => Some(self.lives.into()),
            _ => None,
        }
    }

    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
        match property {
            "name" => self.name = value.take()?,
            "lives" => self.lives = value.take()?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Zoo {
    pub name: String,
    pub animals: Vec<FieldValue>,
}

impl Mappable for Zoo {
    fn get_property(&self, property: &str) -> Option<FieldValue> {
        match property {
            "name" => Some(self.name.clone().into()),
            "animals" => Some(FieldValue::Array(self.animals.clone())),
            _ => None,
        }
    }

    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
        match property {
            "name" => self.name = value.take()?,
            "animals" => self.animals = value.take()?,
            _ => {}
        }
        Ok(())
    }
}

/// A linked list element referring to its own class by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub value: i64,
    pub next: Option<Box<Node>>,
}

impl Mappable for Node {
    fn get_property(&self, property: &str) -> Option<FieldValue> {
        match property {
            "value" => Some(self.value.into()),
            "next" => Some(FieldValue::optional_object(self.next.as_deref().cloned())),
            _ => None,
        }
    }

    fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
        match property {
            "value" => self.value = value.take()?,
            "next" => self.next = value.into_optional_instance()?.map(Box::new),
            _ => {}
        }
        Ok(())
    }
}

pub fn person_metadata() -> ClassMetadataBuilder {
    ClassMetadataBuilder::of::<Person>()
        .map("name", "name", TypeDescriptor::string())
        .map_with(
            "age",
            "age",
            TypeDescriptor::number(),
            ConvertingMode::optional(),
        )
        .map("address", "address", TypeDescriptor::class::<Address>())
        .map("tags", "tags", TypeDescriptor::converter(CommaListConverter))
}

/// Metadata of every fixture class.
pub fn metadata() -> MetadataStore {
    let build = || -> Result<MetadataStore, MapperError> {
        MetadataStore::new()
            .with(
                ClassMetadataBuilder::of::<Address>()
                    .map("street", "streetName", TypeDescriptor::string())
                    .map("city", "city", TypeDescriptor::string())
                    .build()?,
            )?
            .with(person_metadata().build()?)?
            .with(
                ClassMetadataBuilder::of::<Animal>()
                    .map("name", "name", TypeDescriptor::string())
                    .build()?,
            )?
            .with(
                ClassMetadataBuilder::of::<Dog>()
                    .extends(ClassRef::of::<Animal>())
                    .discriminator("Doggy")
                    .map("barks", "barks", TypeDescriptor::boolean())
                    .build()?,
            )?
            .with(
                ClassMetadataBuilder::of::<Cat>()
                    .extends(ClassRef::of::<Animal>())
                    .discriminator("Kitty")
                    .map("lives", "lives", TypeDescriptor::number())
                    .build()?,
            )?
            .with(
                ClassMetadataBuilder::of::<Zoo>()
                    .map("name", "name", TypeDescriptor::string())
                    .map(
                        "animals",
                        "animals",
                        TypeDescriptor::array_of(TypeDescriptor::class::<Animal>()),
                    )
                    .build()?,
            )?
            .with(
                ClassMetadataBuilder::of::<Node>()
                    .map("value", "value", TypeDescriptor::number())
                    .map("next", "next", TypeDescriptor::lazy("Node"))
                    .build()?,
            )
    };
    build().unwrap()
}

pub fn mapper() -> JsonMapper {
    JsonMapperBuilder::new().metadata(metadata()).build()
}

/// Mapper reading and writing discriminators, with the animals registered.
pub fn polymorphic_mapper() -> JsonMapper {
    let mapper = JsonMapperBuilder::new()
        .metadata(metadata())
        .use_discriminator(true)
        .build();
    mapper.register_classes(&[
        ClassRef::of::<Animal>(),
        ClassRef::of::<Dog>(),
        ClassRef::of::<Cat>(),
    ]);
    mapper
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
