use std::error::Error as StdError;

use thiserror::Error;

/// Boxed cause carried by [`MapperError::Conversion`].
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Error, Debug)]
/// Mapper error
pub enum MapperError {
    /// The top-level input is neither an object nor an array.
    #[error("expected {expected} at top level, got {actual}")]
    Shape {
        expected: &'static str,
        actual: String,
    },

    #[error("null is not allowed for {expected} with value checking mode {mode}")]
    NullNotAllowed { expected: String, mode: String },

    /// A required property is absent. `property` is always the class property
    /// name, whichever side it is missing from.
    #[error("property \"{property}\" of class {class} is required but missing in {source_kind}")]
    RequiredPropertyMissing {
        class: String,
        property: String,
        source_kind: &'static str,
    },

    #[error("expected primitive {expected}, got {actual}")]
    PrimitiveTypeMismatch { expected: String, actual: String },

    #[error("expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error(
        "could not map {actual} to expected type {expected}; check that the class is mapped, \
         the converter is attached and forward references are registered"
    )]
    UnknownType { expected: String, actual: String },

    #[error("discriminator \"{0}\" is not registered in the class registry")]
    UnknownDiscriminator(String),

    #[error("forward reference \"{0}\" is not registered in the class registry")]
    LazyReferenceUnresolved(String),

    /// Registration-time error: the same property is declared twice on one class.
    #[error("property \"{property}\" is declared twice on class {class}")]
    DuplicatePropertyMapping { class: String, property: String },

    #[error("custom converter failed: {0}")]
    Converter(#[source] BoxedCause),

    #[error("class {0} has no registered mapping metadata")]
    UnmappedClass(String),

    #[error("class {actual} resolved from discriminator does not extend {expected}")]
    IncompatibleSubtype { expected: String, actual: String },

    #[error("expected an instance of {expected}, got {actual}")]
    InstanceMismatch { expected: String, actual: String },

    /// Wraps a failure raised while converting a single property.
    #[error(
        "fatal error in class {class}, property \"{property}\": expected {expected}, got {actual}{}",
        .value.as_ref().map(|v| format!(" (value: {v})")).unwrap_or_default()
    )]
    Conversion {
        class: String,
        property: String,
        expected: String,
        actual: String,
        value: Option<String>,
        #[source]
        source: BoxedCause,
    },

    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapperError {
    /// Follows nested [`MapperError::Conversion`] wrappers down to the root cause.
    ///
    /// Custom converter failures are not `MapperError`s; in that case the innermost
    /// `Conversion` wrapper is returned.
    pub fn innermost(&self) -> &MapperError {
        let mut current = self;
        while let MapperError::Conversion { source, .. } = current {
            match source.downcast_ref::<MapperError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    /// Returns the property path through nested conversion wrappers, outermost first.
    pub fn property_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let MapperError::Conversion {
            property, source, ..
        } = current
        {
            path.push(property.as_str());
            match source.downcast_ref::<MapperError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        path
    }
}
