use std::{fmt::Debug, sync::Arc};

use log::{debug, info};
use serde_json::{Map, Value};

use crate::{
    core::{
        class::ClassRef,
        config::{MapperConfig, OperationMode, PropertyMatchingRule, ValueCheckingMode},
        descriptor::json_type_name,
        registry::ClassRegistry,
        store::MetadataStore,
        value::{FieldValue, Mappable},
    },
    MapperError,
};

mod deserialize;
mod serialize;

/// Type alias for conversion results.
pub type MapperResult<T> = Result<T, MapperError>;

/// Converts between JSON values and typed instances using registered metadata.
///
/// A mapper holds its configuration, the shared [`MetadataStore`] and a
/// [`ClassRegistry`] used for discriminators and forward class references.
/// Conversions only read the configuration; changing it while another thread
/// converts with the same mapper is up to the caller to prevent (setters take
/// `&mut self`).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use json_class_mapper::{
///     ClassMetadataBuilder, FieldValue, JsonMapperBuilder, Mappable, MapperError,
///     MetadataStore, TypeDescriptor,
/// };
/// use serde_json::json;
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Book {
///     title: String,
///     pages: i64,
/// }
///
/// impl Mappable for Book {
///     fn get_property(&self, property: &str) -> Option<FieldValue> {
///         match property {
///             "title" => Some(self.title.clone().into()),
///             "pages" => Some(self.pages.into()),
///             _ => None,
///         }
///     }
///
///     fn set_property(&mut self, property: &str, value: FieldValue) -> Result<(), MapperError> {
///         match property {
///             "title" => self.title = value.take()?,
///             "pages" => self.pages = value.take()?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
///
/// let store = MetadataStore::new()
///     .with(
///         ClassMetadataBuilder::of::<Book>()
///             .map("title", "title", TypeDescriptor::string())
///             .map("pages", "pageCount", TypeDescriptor::number())
///             .build()?,
///     )?;
///
/// let mapper = JsonMapperBuilder::new().metadata(store).build();
///
/// let book: Book = mapper.deserialize_into(&json!({"title": "Dune", "pageCount": 412}))?;
/// assert_eq!(book, Book { title: "Dune".to_string(), pages: 412 });
///
/// let json = mapper.serialize_instance(&book)?;
/// assert_eq!(json, json!({"title": "Dune", "pageCount": 412}));
/// # Ok::<(), MapperError>(())
/// ```
pub struct JsonMapper {
    config: MapperConfig,
    store: Arc<MetadataStore>,
    registry: Arc<ClassRegistry>,
}

impl JsonMapper {
    /// Creates a mapper with the default configuration and its own empty registry.
    pub fn new(store: Arc<MetadataStore>) -> Self {
        JsonMapperBuilder::new().shared_metadata(store).build()
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    pub fn set_operation_mode(&mut self, operation_mode: OperationMode) {
        self.config.operation_mode = operation_mode;
    }

    pub fn set_value_checking_mode(&mut self, value_checking_mode: ValueCheckingMode) {
        self.config.value_checking_mode = value_checking_mode;
    }

    pub fn set_ignore_primitive_checks(&mut self, ignore_primitive_checks: bool) {
        self.config.ignore_primitive_checks = ignore_primitive_checks;
    }

    pub fn set_ignore_required_check(&mut self, ignore_required_check: bool) {
        self.config.ignore_required_check = ignore_required_check;
    }

    pub fn set_map_missing_to_null(&mut self, map_missing_to_null: bool) {
        self.config.map_missing_to_null = map_missing_to_null;
    }

    pub fn set_use_discriminator(&mut self, use_discriminator: bool) {
        self.config.use_discriminator = use_discriminator;
    }

    pub fn set_discriminator_property_name(&mut self, name: impl Into<String>) {
        self.config.discriminator_property_name = name.into();
    }

    pub fn set_property_matching_rule(&mut self, rule: PropertyMatchingRule) {
        self.config.property_matching_rule = rule;
    }

    /// Registers classes in the registry under their discriminator, or their
    /// name when their metadata declares none.
    pub fn register_classes(&self, classes: &[ClassRef]) {
        for class in classes {
            self.registry
                .insert(self.store.registry_key(class), *class);
        }
    }

    pub fn unregister_all_classes(&self) {
        self.registry.unregister_all();
    }

    /// Serializes an instance or an array of instances.
    ///
    /// `class` is the statically expected class; the runtime class of each
    /// instance is used when absent.
    pub fn serialize(&self, value: &FieldValue, class: Option<&ClassRef>) -> MapperResult<Value> {
        self.serialize_value_tree(value, class, false)
    }

    /// Like [`JsonMapper::serialize`] but missing properties are left out
    /// instead of failing.
    pub fn partial_serialize(
        &self,
        value: &FieldValue,
        class: Option<&ClassRef>,
    ) -> MapperResult<Value> {
        self.serialize_value_tree(value, class, true)
    }

    pub fn serialize_object(
        &self,
        value: &FieldValue,
        class: Option<&ClassRef>,
    ) -> MapperResult<Value> {
        self.serialize_object_with(value, class, false)
    }

    pub fn serialize_array(
        &self,
        value: &FieldValue,
        class: Option<&ClassRef>,
    ) -> MapperResult<Vec<Value>> {
        self.serialize_array_with(value, class, false)
    }

    /// Serializes a typed instance using its runtime class.
    pub fn serialize_instance(&self, instance: &dyn Mappable) -> MapperResult<Value> {
        if self.is_disabled() {
            return Ok(self.plain_instance(instance));
        }
        self.traced(
            "serialize instance",
            instance.class_ref().name(),
            instance,
            || self.serialize_instance_with(instance, None, false),
        )
    }

    pub fn serialize_to_string(
        &self,
        value: &FieldValue,
        class: Option<&ClassRef>,
    ) -> MapperResult<String> {
        let json = self.serialize(value, class)?;
        Ok(serde_json::to_string(&json)?)
    }

    /// Deserializes a JSON object or array into instances of `class`.
    pub fn deserialize(&self, json: &Value, class: &ClassRef) -> MapperResult<FieldValue> {
        self.deserialize_value_tree(json, class, false)
    }

    /// Like [`JsonMapper::deserialize`] but missing keys leave the instance
    /// defaults untouched instead of failing.
    pub fn partial_deserialize(&self, json: &Value, class: &ClassRef) -> MapperResult<FieldValue> {
        self.deserialize_value_tree(json, class, true)
    }

    pub fn deserialize_object(&self, json: &Value, class: &ClassRef) -> MapperResult<FieldValue> {
        self.deserialize_object_with(json, class, false)
    }

    pub fn deserialize_array(
        &self,
        json: &Value,
        class: &ClassRef,
    ) -> MapperResult<Vec<FieldValue>> {
        self.deserialize_array_with(json, class, false)
    }

    pub fn deserialize_str(&self, text: &str, class: &ClassRef) -> MapperResult<FieldValue> {
        let json: Value = serde_json::from_str(text)?;
        self.deserialize(&json, class)
    }

    /// Deserializes a JSON object into a `T`.
    ///
    /// Fails with [`MapperError::InstanceMismatch`] when a discriminator
    /// resolves to another class than `T`.
    pub fn deserialize_into<T: Mappable + Default>(&self, json: &Value) -> MapperResult<T> {
        self.deserialize_object(json, &ClassRef::of::<T>())?
            .into_instance()
    }

    pub fn partial_deserialize_into<T: Mappable + Default>(
        &self,
        json: &Value,
    ) -> MapperResult<T> {
        self.deserialize_object_with(json, &ClassRef::of::<T>(), true)?
            .into_instance()
    }

    pub fn deserialize_array_into<T: Mappable + Default>(
        &self,
        json: &Value,
    ) -> MapperResult<Vec<T>> {
        self.deserialize_array(json, &ClassRef::of::<T>())?
            .into_iter()
            .map(FieldValue::into_instance)
            .collect()
    }

    fn is_disabled(&self) -> bool {
        self.config.operation_mode == OperationMode::Disable
    }

    /// Runs a conversion, tracing its input and outcome in logging mode.
    fn traced<I, O>(
        &self,
        operation: &str,
        class: &str,
        input: &I,
        convert: impl FnOnce() -> MapperResult<O>,
    ) -> MapperResult<O>
    where
        I: Debug + ?Sized,
        O: Debug,
    {
        if self.config.operation_mode != OperationMode::Logging {
            return convert();
        }

        info!("Start {operation} ({class}), input: {input:?}");
        let result = convert();
        match &result {
            Ok(output) => info!("End {operation} ({class}), output: {output:?}"),
            Err(error) => info!("Failed {operation} ({class}): {error}"),
        }
        result
    }

    /// Fails when the value checking mode rejects null at this level.
    fn check_null(&self, expected: &str, object_level: bool) -> MapperResult<()> {
        if self.config.value_checking_mode.allows_null(object_level) {
            return Ok(());
        }
        debug!("Null rejected for {expected}");
        Err(MapperError::NullNotAllowed {
            expected: expected.to_string(),
            mode: self.config.value_checking_mode.to_string(),
        })
    }

    fn resolve_lazy(&self, name: &str) -> MapperResult<ClassRef> {
        self.registry
            .resolve(name)
            .ok_or_else(|| MapperError::LazyReferenceUnresolved(name.to_string()))
    }

    /// Unchecked JSON rendering of an instance value.
    fn plain_json(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(flag) => Value::Bool(*flag),
            FieldValue::Number(number) => Value::Number(number.clone()),
            FieldValue::String(text) => Value::String(text.clone()),
            FieldValue::Json(json) => json.clone(),
            FieldValue::Array(items) => {
                Value::Array(items.iter().map(|item| self.plain_json(item)).collect())
            }
            FieldValue::Object(instance) => self.plain_instance(instance.as_ref()),
        }
    }

    /// Dumps the declared properties of an instance under their class property
    /// names. Unmapped classes render as an empty object.
    fn plain_instance(&self, instance: &dyn Mappable) -> Value {
        let mut json = Map::new();
        if let Ok(properties) = self.store.properties(&instance.class_ref()) {
            for mapping in properties {
                let name = mapping.class_property_name();
                if let Some(value) = instance.get_property(name) {
                    json.insert(name.to_string(), self.plain_json(&value));
                }
            }
        }
        Value::Object(json)
    }
}

/// Short rendering of a scalar value for diagnostics.
fn preview(json: &Value) -> Option<String> {
    match json {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Some(json.to_string())
        }
        _ => None,
    }
}

fn shape_error(expected: &'static str, actual: String) -> MapperError {
    MapperError::Shape { expected, actual }
}

fn untyped_name(json: &Value) -> String {
    format!("untyped JSON {}", json_type_name(json))
}

/// Builder of [`JsonMapper`].
#[derive(Default)]
pub struct JsonMapperBuilder {
    config: MapperConfig,
    store: Option<Arc<MetadataStore>>,
    registry: Option<Arc<ClassRegistry>>,
}

impl JsonMapperBuilder {
    pub fn new() -> JsonMapperBuilder {
        Self::default()
    }

    pub fn config(mut self, config: MapperConfig) -> JsonMapperBuilder {
        self.config = config;
        self
    }

    pub fn metadata(mut self, store: MetadataStore) -> JsonMapperBuilder {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn shared_metadata(mut self, store: Arc<MetadataStore>) -> JsonMapperBuilder {
        self.store = Some(store);
        self
    }

    /// Shares a registry with other mappers; a fresh one is created otherwise.
    pub fn registry(mut self, registry: Arc<ClassRegistry>) -> JsonMapperBuilder {
        self.registry = Some(registry);
        self
    }

    pub fn operation_mode(mut self, operation_mode: OperationMode) -> JsonMapperBuilder {
        self.config.operation_mode = operation_mode;
        self
    }

    pub fn value_checking_mode(mut self, mode: ValueCheckingMode) -> JsonMapperBuilder {
        self.config.value_checking_mode = mode;
        self
    }

    pub fn ignore_primitive_checks(mut self, yes: bool) -> JsonMapperBuilder {
        self.config.ignore_primitive_checks = yes;
        self
    }

    pub fn ignore_required_check(mut self, yes: bool) -> JsonMapperBuilder {
        self.config.ignore_required_check = yes;
        self
    }

    pub fn map_missing_to_null(mut self, yes: bool) -> JsonMapperBuilder {
        self.config.map_missing_to_null = yes;
        self
    }

    pub fn use_discriminator(mut self, yes: bool) -> JsonMapperBuilder {
        self.config.use_discriminator = yes;
        self
    }

    pub fn discriminator_property_name(mut self, name: impl Into<String>) -> JsonMapperBuilder {
        self.config.discriminator_property_name = name.into();
        self
    }

    pub fn property_matching_rule(mut self, rule: PropertyMatchingRule) -> JsonMapperBuilder {
        self.config.property_matching_rule = rule;
        self
    }

    pub fn build(self) -> JsonMapper {
        debug!("Build mapper with configuration {:?}", self.config);
        JsonMapper {
            config: self.config,
            store: self.store.unwrap_or_default(),
            registry: self.registry.unwrap_or_default(),
        }
    }
}
