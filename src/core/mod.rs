/// Class identity tokens.
pub mod class;

/// Engine wide configuration switches.
pub mod config;

/// Expected type descriptors and the custom converter contract.
pub mod descriptor;

/// Per-property mappings and per-class metadata.
pub mod mapping;

pub mod registry;

/// Metadata store with inheritance resolution.
pub mod store;

/// Instance side values and the `Mappable` trait.
pub mod value;
