//! Common types module for the expression factory resolver.
//!
//! This module defines the core data types shared by every crate in the
//! workspace: the error type, the configuration bag handed to providers,
//! process-property lookups, expression values and the registry trait that
//! self-registering implementations provide.

/// Expression values, value types and the evaluation context.
pub mod context;
/// The error type surfaced by resolution and by expression factories.
pub mod error;
/// Process-wide property lookups.
pub mod lookup;
/// Key/value configuration bag and the `.properties` file format.
pub mod properties;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Well-known names shared across crates.
pub mod utils;

// Re-export all types for convenient access
pub use context::{ElContext, ElValue, ValueType};
pub use error::ElError;
pub use lookup::{ChainedLookup, EnvLookup, PropertyLookup};
pub use properties::Properties;
pub use registry::ImplementationRegistry;
pub use utils::constants::{
	DEFAULT_PROVIDER, PLATFORM_ROOT_PROPERTY, PROPERTY_FILE_SEGMENTS, PROVIDER_PROPERTY,
	SERVICE_RESOURCE,
};
