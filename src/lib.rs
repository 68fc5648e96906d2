#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 <div align="center">
   <h1>JSON Class Mapper</h1>
   <h3>Metadata driven conversion between JSON and typed instances</h3>

   ![license](https://shields.io/badge/license-MIT%2FApache--2.0-blue)

  </div>

 # JSON Class Mapper

 **JSON Class Mapper** converts untyped JSON documents into instances of your own types and back.
 Every property to convert is declared once, together with the JSON key it maps to and the type it is
 expected to hold. At conversion time the mapper checks every value against that declaration, fills
 missing data according to configurable policies and reports failures with the full property path.

 ## Core Concepts

- **Mappable:** A type whose properties the mapper can read and write by name. Implement it on the structs you want to convert.
- **ClassMetadata:** The declared properties of one class: class property name, JSON property name, expected type and converting mode. Built with `ClassMetadataBuilder`.
- **MetadataStore:** Holds the metadata of every class and resolves inheritance, parent properties first.
- **TypeDescriptor:** What a property is expected to hold: any value, a primitive, a class, a class referenced by name, a custom converter or an array of those.
- **ClassRegistry:** Maps discriminator values and class names to classes, for polymorphic documents and forward references.
- **JsonMapper:** The conversion engine, configured with `JsonMapperBuilder`.

 ## Configuration

| **Switch**              | **Default**         | **Description**                                                          |
|-------------------------|---------------------|--------------------------------------------------------------------------|
| operation_mode          | `Enable`            | `Disable` passes values through untouched, `Logging` traces conversions  |
| value_checking_mode     | `AllowObjectNull`   | Where null is accepted: everywhere, for objects only or nowhere          |
| ignore_primitive_checks | `false`             | Accept primitives of the wrong JSON type                                 |
| ignore_required_check   | `false`             | Treat every property as optional                                         |
| map_missing_to_null     | `false`             | Convert missing properties as if they were null                          |
| use_discriminator       | `false`             | Read and write the discriminator property of registered classes          |
| discriminator_property_name | `"$type"`       | JSON key holding the discriminator                                       |
| property_matching_rule  | `CaseStrict`        | How JSON keys are matched to declared JSON property names               |

 ## Getting Started

```toml
[dependencies]
json-class-mapper = "<version>"
```

Then declare your classes and convert:

```rust
# use json_class_mapper::{
#     ClassMetadataBuilder, ClassRef, FieldValue, JsonMapperBuilder, Mappable, MapperError,
#     MetadataStore, TypeDescriptor,
# };
# use serde_json::json;
#[derive(Debug, Clone, Default)]
struct Animal {
    name: String,
}

#[derive(Debug, Clone, Default)]
struct Dog {
    name: String,
    barks: bool,
}
# impl Mappable for Animal {
#     fn get_property(&self, property: &str) -> Option<FieldValue> {
#         (property == "name").then(|| self.name.clone().into())
#     }
#     fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
#         if property == "name" {
#             self.name = value.take()?;
#         }
#         Ok(())
#     }
# }
# impl Mappable for Dog {
#     fn get_property(&self, property: &str) -> Option<FieldValue> {
#         match property {
#             "name" => Some(self.name.clone().into()),
#             "barks" => Some(self.barks.into()),
#             _ => None,
#         }
#     }
#     fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
#         match property {
#             "name" => self.name = value.take()?,
#             "barks" => self.barks = value.take()?,
#             _ => {}
#         }
#         Ok(())
#     }
# }

fn main() -> Result<(), MapperError> {
    let store = MetadataStore::new()
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
        )?;

    let mapper = JsonMapperBuilder::new()
        .metadata(store)
        .use_discriminator(true)
        .build();
    mapper.register_classes(&[ClassRef::of::<Dog>()]);

    let animal = mapper.deserialize(
        &json!({"$type": "Doggy", "name": "Rex", "barks": true}),
        &ClassRef::of::<Animal>(),
    )?;
    let dog: Dog = animal.into_instance()?;
    assert!(dog.barks);

    let json = mapper.serialize_instance(&dog)?;
    assert_eq!(json, json!({"name": "Rex", "barks": true, "$type": "Doggy"}));

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Metadata model: classes, type descriptors, property mappings and registries
pub mod core;

/// Error types for conversions
pub mod error;

/// The conversion engine
pub mod mapper;

#[doc(inline)]
pub use error::*;

#[doc(inline)]
pub use crate::core::{
    class::ClassRef,
    config::{
        MapperConfig, OperationMode, PropertyMatchingRule, ValueCheckingMode,
        DEFAULT_DISCRIMINATOR_PROPERTY_NAME,
    },
    descriptor::{json_type_name, CustomConverter, PrimitiveType, TypeDescriptor},
    mapping::{
        ClassMetadata, ClassMetadataBuilder, ConvertingMode, Direction, Nullability, Optionality,
        PropertyMapping,
    },
    registry::ClassRegistry,
    store::MetadataStore,
    value::{ClassIdentity, FieldValue, FromFieldValue, Mappable},
};

#[doc(inline)]
pub use mapper::{JsonMapper, JsonMapperBuilder, MapperResult};
