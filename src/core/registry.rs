use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use log::debug;

use super::{class::ClassRef, mapping::ClassMetadata};

/// Caller managed table of classes addressable by name.
///
/// Used to resolve discriminators and forward class references. Nothing is
/// registered implicitly: callers register the classes they need before a batch
/// of conversions and clear the table afterwards. A registry can be shared by
/// several mappers through an `Arc`.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    entries: RwLock<HashMap<String, ClassRef>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers classes under their discriminator, or their name when they
    /// declare none. The last registration of a key wins.
    pub fn register<'a>(&self, classes: impl IntoIterator<Item = &'a ClassMetadata>) {
        for metadata in classes {
            self.insert(metadata.registry_key(), metadata.class());
        }
    }

    pub fn insert(&self, key: impl Into<String>, class: ClassRef) {
        let key = key.into();
        debug!("Register class {} under key {}", class.name(), key);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, class);
    }

    pub fn resolve(&self, key: &str) -> Option<ClassRef> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    /// Tells whether `key` currently resolves to `class`.
    pub fn is_registered_as(&self, key: &str, class: &ClassRef) -> bool {
        self.resolve(key).is_some_and(|found| found == *class)
    }

    pub fn unregister(&self, key: &str) -> Option<ClassRef> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn unregister_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Unregister {} classes", entries.len());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
