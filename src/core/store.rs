use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
};

use log::debug;

use crate::MapperError;

use super::{
    class::ClassRef,
    mapping::{ClassMetadata, PropertyMapping},
};

/// Mapping metadata of every known class, keyed by class identity.
///
/// The store is filled once at startup and then shared read-only by mappers.
#[derive(Debug, Default)]
pub struct MetadataStore {
    classes: HashMap<TypeId, ClassMetadata>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the metadata of a class.
    ///
    /// Registering a class again adds its declarations to the existing ones;
    /// declaring an already known property fails with
    /// [`MapperError::DuplicatePropertyMapping`].
    pub fn register(&mut self, metadata: ClassMetadata) -> Result<(), MapperError> {
        let class = metadata.class();
        debug!(
            "Register mapping metadata of class {} ({} properties)",
            class.name(),
            metadata.properties().len()
        );

        match self.classes.get_mut(&class.type_id()) {
            Some(existing) => existing.merge(metadata),
            None => {
                self.classes.insert(class.type_id(), metadata);
                Ok(())
            }
        }
    }

    /// Builder-style variant of [`MetadataStore::register`].
    pub fn with(mut self, metadata: ClassMetadata) -> Result<Self, MapperError> {
        self.register(metadata)?;
        Ok(self)
    }

    pub fn get(&self, class: &ClassRef) -> Option<&ClassMetadata> {
        self.classes.get(&class.type_id())
    }

    pub fn contains(&self, class: &ClassRef) -> bool {
        self.classes.contains_key(&class.type_id())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Registry key of a class: its declared discriminator, or its name.
    pub fn registry_key(&self, class: &ClassRef) -> String {
        self.get(class)
            .map(|metadata| metadata.registry_key().to_string())
            .unwrap_or_else(|| class.name().to_string())
    }

    /// Returns the class and its ancestors, the class itself first.
    fn lineage(&self, class: &ClassRef) -> Result<Vec<&ClassMetadata>, MapperError> {
        let mut lineage = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(*class);

        while let Some(class) = current {
            if !visited.insert(class.type_id()) {
                break;
            }
            let metadata = self
                .get(&class)
                .ok_or_else(|| MapperError::UnmappedClass(class.name().to_string()))?;
            lineage.push(metadata);
            current = metadata.parent();
        }

        Ok(lineage)
    }

    /// Effective property mappings of a class, inherited ones included.
    ///
    /// Parent properties come first; a subclass declaration of the same class
    /// property replaces the parent's in place.
    pub fn properties(&self, class: &ClassRef) -> Result<Vec<&PropertyMapping>, MapperError> {
        let mut properties: Vec<&PropertyMapping> = Vec::new();

        for metadata in self.lineage(class)?.into_iter().rev() {
            for mapping in metadata.properties() {
                match properties
                    .iter_mut()
                    .find(|known| known.class_property_name() == mapping.class_property_name())
                {
                    Some(known) => *known = mapping,
                    None => properties.push(mapping),
                }
            }
        }

        Ok(properties)
    }

    /// Tells whether `class` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, class: &ClassRef, ancestor: &ClassRef) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(*class);

        while let Some(class) = current {
            if class == *ancestor {
                return true;
            }
            if !visited.insert(class.type_id()) {
                return false;
            }
            current = self.get(&class).and_then(ClassMetadata::parent);
        }

        false
    }
}
