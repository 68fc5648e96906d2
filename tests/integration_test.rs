mod common;

use common::{
    init_logger, mapper, metadata, polymorphic_mapper, Address, Animal, Cat, Dog, Node, Person,
    Zoo,
};

use anyhow::anyhow;
use json_class_mapper::{
    ClassMetadataBuilder, ClassRef, ConvertingMode, CustomConverter, FieldValue,
    JsonMapperBuilder, MapperConfig, MapperError, MetadataStore, OperationMode, PropertyMapping,
    PropertyMatchingRule, TypeDescriptor, ValueCheckingMode,
};
use serde_json::{json, Value};

fn person() -> Person {
    Person {
        name: "Ada".to_string(),
        age: Some(36),
        address: Some(Address {
            street: "St James's Square".to_string(),
            city: "London".to_string(),
        }),
        tags: vec!["math".to_string(), "engines".to_string()],
    }
}

fn person_json() -> serde_json::Value {
    json!({
        "name": "Ada",
        "age": 36,
        "address": {"streetName": "St James's Square", "city": "London"},
        "tags": "math,engines"
    })
}

#[test]
fn person_should_survive_a_round_trip() -> Result<(), MapperError> {
    let mapper = mapper();

    let person: Person = mapper.deserialize_into(&person_json())?;
    assert_eq!(person, self::person());

    let json = mapper.serialize_instance(&person)?;
    assert_eq!(json, person_json());

    Ok(())
}

#[test]
fn typed_instances_should_serialize_through_field_values() -> Result<(), MapperError> {
    let mapper = mapper();
    let people = FieldValue::objects(vec![person(), person()]);

    let json = mapper.serialize(&people, Some(&ClassRef::of::<Person>()))?;

    assert_eq!(json, json!([person_json(), person_json()]));
    Ok(())
}

#[test]
fn arrays_should_deserialize_into_typed_vectors() -> Result<(), MapperError> {
    let mapper = mapper();

    let people: Vec<Person> = mapper.deserialize_array_into(&json!([person_json(), person_json()]))?;

    assert_eq!(people, vec![person(), person()]);
    Ok(())
}

#[test]
fn text_helpers_should_parse_and_print_json() -> Result<(), MapperError> {
    let mapper = mapper();
    let text = serde_json::to_string(&person_json())?;

    let value = mapper.deserialize_str(&text, &ClassRef::of::<Person>())?;
    let printed = mapper.serialize_to_string(&value, None)?;

    assert_eq!(serde_json::from_str::<serde_json::Value>(&printed)?, person_json());
    Ok(())
}

#[test]
fn array_descriptors_should_stay_untouched_after_serialization() -> Result<(), MapperError> {
    let mapper = mapper();
    let zoo = Zoo {
        name: "City zoo".to_string(),
        animals: vec![
            FieldValue::object(Animal { name: "Generic".to_string() }),
            FieldValue::object(Dog { name: "Rex".to_string(), barks: true }),
            FieldValue::object(Cat { name: "Tom".to_string(), lives: 9 }),
        ],
    };

    let first = mapper.serialize_instance(&zoo)?;
    let second = mapper.serialize_instance(&zoo)?;

    assert_eq!(first, second);
    assert_eq!(
        first,
        json!({
            "name": "City zoo",
            "animals": [{"name": "Generic"}, {"name": "Rex"}, {"name": "Tom"}]
        })
    );

    let descriptor = mapper
        .store()
        .get(&ClassRef::of::<Zoo>())
        .and_then(|metadata| metadata.property("animals"))
        .map(|mapping| mapping.expected_type().clone());
    assert!(matches!(descriptor, Some(TypeDescriptor::Array(ref elements)) if elements.len() == 1));

    Ok(())
}

#[test]
fn discriminator_should_select_subclasses() -> Result<(), MapperError> {
    let mapper = polymorphic_mapper();

    let animals = mapper.deserialize_array(
        &json!([
            {"$type": "Doggy", "name": "Rex", "barks": true},
            {"$type": "Kitty", "name": "Tom", "lives": 9},
            {"name": "Generic"}
        ]),
        &ClassRef::of::<Animal>(),
    )?;

    let classes: Vec<ClassRef> = animals
        .iter()
        .filter_map(|animal| match animal {
            FieldValue::Object(instance) => Some(instance.class_ref()),
            _ => None,
        })
        .collect();
    assert_eq!(
        classes,
        vec![
            ClassRef::of::<Dog>(),
            ClassRef::of::<Cat>(),
            ClassRef::of::<Animal>()
        ]
    );

    let mut animals = animals.into_iter();
    let dog: Dog = animals.next().unwrap().into_instance()?;
    assert_eq!(dog, Dog { name: "Rex".to_string(), barks: true });
    let cat: Cat = animals.next().unwrap().into_instance()?;
    assert_eq!(cat.lives, 9);

    Ok(())
}

#[test]
fn discriminator_should_be_written_for_runtime_classes() -> Result<(), MapperError> {
    let mapper = polymorphic_mapper();
    let animals = FieldValue::Array(vec![
        FieldValue::object(Dog { name: "Rex".to_string(), barks: false }),
        FieldValue::object(Cat { name: "Tom".to_string(), lives: 7 }),
    ]);

    let json = mapper.serialize(&animals, Some(&ClassRef::of::<Animal>()))?;

    assert_eq!(
        json,
        json!([
            {"$type": "Doggy", "name": "Rex", "barks": false},
            {"$type": "Kitty", "name": "Tom", "lives": 7}
        ])
    );
    Ok(())
}

#[test]
fn discriminator_should_apply_to_nested_arrays() -> Result<(), MapperError> {
    let mapper = polymorphic_mapper();
    let json = json!({
        "name": "City zoo",
        "animals": [
            {"$type": "Kitty", "name": "Tom", "lives": 9},
            {"$type": "Doggy", "name": "Rex", "barks": true}
        ]
    });

    let zoo: Zoo = mapper.deserialize_into(&json)?;

    assert_eq!(zoo.animals.len(), 2);
    let cat: Cat = zoo.animals[0].clone().into_instance()?;
    assert_eq!(cat.name, "Tom");

    assert_eq!(mapper.serialize_instance(&zoo)?, json);
    Ok(())
}

#[test]
fn custom_discriminator_property_name_should_be_used() -> Result<(), MapperError> {
    let mapper = JsonMapperBuilder::new()
        .metadata(metadata())
        .use_discriminator(true)
        .discriminator_property_name("kind")
        .build();
    mapper.register_classes(&[ClassRef::of::<Dog>()]);

    let animal = mapper.deserialize(
        &json!({"kind": "Doggy", "name": "Rex", "barks": true}),
        &ClassRef::of::<Animal>(),
    )?;

    let json = mapper.serialize(&animal, None)?;
    assert_eq!(json, json!({"kind": "Doggy", "name": "Rex", "barks": true}));
    Ok(())
}

#[test]
fn unregistered_classes_should_be_written_without_discriminator() -> Result<(), MapperError> {
    let mapper = polymorphic_mapper();
    mapper.unregister_all_classes();

    let json = mapper.serialize_instance(&Dog { name: "Rex".to_string(), barks: true })?;

    assert_eq!(json, json!({"name": "Rex", "barks": true}));
    Ok(())
}

#[test]
fn partial_conversion_should_skip_missing_properties() -> Result<(), MapperError> {
    let mapper = mapper();

    let person: Person = mapper.partial_deserialize_into(&json!({
        "name": "Ada",
        "address": {"city": "London"}
    }))?;
    assert_eq!(person.name, "Ada");
    assert_eq!(person.tags, Vec::<String>::new());
    assert_eq!(person.address.as_ref().map(|a| a.city.as_str()), Some("London"));

    let partial = mapper.partial_serialize(&FieldValue::object(Person::default()), None)?;
    assert_eq!(partial, json!({"name": "", "tags": ""}));

    Ok(())
}

#[test]
fn disabled_mode_should_pass_values_through() -> Result<(), MapperError> {
    let mapper = JsonMapperBuilder::new()
        .metadata(metadata())
        .operation_mode(OperationMode::Disable)
        .build();
    let json = json!({"anything": [1, "two", null]});

    let value = mapper.deserialize(&json, &ClassRef::of::<Person>())?;
    assert!(matches!(value, FieldValue::Json(ref raw) if *raw == json));

    let plain = mapper.serialize_instance(&person())?;
    assert_eq!(
        plain,
        json!({
            "name": "Ada",
            "age": 36,
            "address": {"street": "St James's Square", "city": "London"},
            "tags": ["math", "engines"]
        })
    );
    Ok(())
}

#[test]
fn logging_mode_should_convert_like_enabled_mode() -> Result<(), MapperError> {
    init_logger();
    let config = MapperConfig {
        operation_mode: OperationMode::Logging,
        ..MapperConfig::default()
    };
    let mapper = JsonMapperBuilder::new()
        .config(config)
        .metadata(metadata())
        .build();

    let person: Person = mapper.deserialize_into(&person_json())?;
    assert_eq!(mapper.serialize_instance(&person)?, person_json());

    let failure = mapper.deserialize_into::<Person>(&json!({"name": 1}));
    assert!(failure.is_err());
    Ok(())
}

#[test]
fn case_insensitive_matching_should_accept_any_key_case() -> Result<(), MapperError> {
    let mapper = JsonMapperBuilder::new()
        .metadata(metadata())
        .property_matching_rule(PropertyMatchingRule::CaseInsensitive)
        .build();

    let address: Address =
        mapper.deserialize_into(&json!({"STREETNAME": "Baker Street", "City": "London"}))?;

    assert_eq!(address.street, "Baker Street");
    assert_eq!(address.city, "London");
    Ok(())
}

#[test]
fn lazy_references_should_resolve_through_registry() -> Result<(), MapperError> {
    let mapper = mapper();
    mapper.register_classes(&[ClassRef::of::<Node>()]);
    let json = json!({"value": 1, "next": {"value": 2, "next": {"value": 3, "next": null}}});

    let head: Node = mapper.deserialize_into(&json)?;

    let values: Vec<i64> = std::iter::successors(Some(&head), |node| node.next.as_deref())
        .map(|node| node.value)
        .collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert_eq!(mapper.serialize_instance(&head)?, json);
    Ok(())
}

#[test]
fn allow_null_should_accept_null_primitives() -> Result<(), MapperError> {
    let mut mapper = mapper();
    mapper.set_value_checking_mode(ValueCheckingMode::AllowNull);

    let person: Person = mapper.deserialize_into(&json!({
        "name": "Ada",
        "age": null,
        "address": null,
        "tags": ""
    }))?;

    assert_eq!(person.age, None);
    assert_eq!(person.address, None);
    Ok(())
}

#[test]
fn config_should_load_from_json() -> Result<(), MapperError> {
    let config: MapperConfig = serde_json::from_value(json!({
        "valueCheckingMode": "ALLOW_NULL",
        "useDiscriminator": true
    }))?;

    let mapper = JsonMapperBuilder::new()
        .config(config)
        .metadata(metadata())
        .build();

    assert_eq!(mapper.config().value_checking_mode, ValueCheckingMode::AllowNull);
    assert!(mapper.config().use_discriminator);
    assert_eq!(mapper.config().discriminator_property_name, "$type");
    Ok(())
}

#[test]
fn plain_objects_should_serialize_declared_properties_only() -> Result<(), MapperError> {
    let mapper = mapper();
    let plain = FieldValue::Json(json!({"street": "Baker", "city": "London", "extra": 1}));

    let json = mapper.serialize_object(&plain, Some(&ClassRef::of::<Address>()))?;

    assert_eq!(json, json!({"streetName": "Baker", "city": "London"}));
    Ok(())
}

#[test]
fn disabled_mode_output_should_feed_back_into_serialization() -> Result<(), MapperError> {
    let disabled = JsonMapperBuilder::new()
        .metadata(metadata())
        .operation_mode(OperationMode::Disable)
        .build();
    let raw = disabled.deserialize(
        &json!({
            "name": "Ada",
            "address": {"street": "Baker", "city": "London"},
            "tags": ["math"],
            "nickname": "Countess"
        }),
        &ClassRef::of::<Person>(),
    )?;

    let json = mapper().serialize(&raw, Some(&ClassRef::of::<Person>()))?;

    assert_eq!(
        json,
        json!({
            "name": "Ada",
            "address": {"streetName": "Baker", "city": "London"},
            "tags": "math"
        })
    );
    Ok(())
}

/// Writes text upper case and reads it back lower case.
struct Upper;

impl CustomConverter for Upper {
    fn serialize(&self, value: &FieldValue) -> anyhow::Result<Value> {
        let text: String = value.clone().take()?;
        Ok(Value::String(text.to_uppercase()))
    }

    fn deserialize(&self, json: &Value) -> anyhow::Result<FieldValue> {
        let text = json
            .as_str()
            .ok_or_else(|| anyhow!("expected text, got {json}"))?;
        Ok(text.to_lowercase().into())
    }
}

fn upper_street_mapper() -> json_class_mapper::JsonMapper {
    // The declared type never matches the converter's output on purpose.
    let store = MetadataStore::new()
        .with(
            ClassMetadataBuilder::of::<Address>()
                .property(
                    PropertyMapping::new("street", "street", TypeDescriptor::number())
                        .converter(Upper),
                )
                .map("city", "city", TypeDescriptor::string())
                .build()
                .unwrap(),
        )
        .unwrap();
    JsonMapperBuilder::new().metadata(store).build()
}

#[test]
fn mapping_converter_should_replace_type_verification() -> Result<(), MapperError> {
    let mapper = upper_street_mapper();
    let address = Address {
        street: "Baker".to_string(),
        city: "London".to_string(),
    };

    let json = mapper.serialize_instance(&address)?;
    assert_eq!(json, json!({"street": "BAKER", "city": "London"}));

    let back: Address = mapper.deserialize_into(&json)?;
    assert_eq!(back.street, "baker");
    assert_eq!(back.city, "London");
    Ok(())
}

#[test]
fn mapping_converter_failure_should_be_wrapped() {
    let mapper = upper_street_mapper();

    let error = mapper
        .deserialize_into::<Address>(&json!({"street": 221, "city": "London"}))
        .unwrap_err();

    assert!(matches!(
        error,
        MapperError::Conversion { ref property, ref expected, .. }
            if property == "street" && expected == "custom converter"
    ));
    assert!(matches!(error.innermost(), MapperError::Converter(_)));
    assert!(error.innermost().to_string().contains("expected text"));
}

#[test]
fn serialize_optional_property_should_still_be_required_on_deserialize() {
    let store = MetadataStore::new()
        .with(
            ClassMetadataBuilder::of::<Person>()
                .map("name", "name", TypeDescriptor::string())
                .map_with(
                    "age",
                    "years",
                    TypeDescriptor::number(),
                    ConvertingMode::serialize_optional(),
                )
                .build()
                .unwrap(),
        )
        .unwrap();
    let mapper = JsonMapperBuilder::new().metadata(store).build();

    let json = mapper
        .serialize_instance(&Person {
            name: "Ada".to_string(),
            ..Person::default()
        })
        .unwrap();
    assert_eq!(json, json!({"name": "Ada"}));

    let error = mapper.deserialize_into::<Person>(&json).unwrap_err();
    assert!(matches!(
        error,
        MapperError::RequiredPropertyMissing { ref property, source_kind: "JSON", .. }
            if property == "age"
    ));
}
