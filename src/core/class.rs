use std::{
    any::{type_name, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

use super::value::Mappable;

/// Opaque identity of a mappable class.
///
/// A `ClassRef` carries the class' [`TypeId`], a short human readable name used in
/// diagnostics and as the default registry key, and a zero-argument factory producing
/// a default instance. Equality and hashing only consider the `TypeId`.
#[derive(Clone, Copy)]
pub struct ClassRef {
    type_id: TypeId,
    name: &'static str,
    factory: fn() -> Box<dyn Mappable>,
}

impl ClassRef {
    /// Returns the class reference of `T`.
    pub fn of<T: Mappable + Default>() -> Self {
        ClassRef {
            type_id: TypeId::of::<T>(),
            name: short_type_name(type_name::<T>()),
            factory: instantiate_default::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds a fresh default instance of the class.
    pub fn instantiate(&self) -> Box<dyn Mappable> {
        (self.factory)()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

fn instantiate_default<T: Mappable + Default>() -> Box<dyn Mappable> {
    Box::new(T::default())
}

/// Strips the module path of a type name, keeping generic arguments untouched.
fn short_type_name(full: &'static str) -> &'static str {
    let base_end = full.find('<').unwrap_or(full.len());
    match full[..base_end].rfind("::") {
        Some(index) => &full[index + 2..],
        None => full,
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({})", self.name)
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
