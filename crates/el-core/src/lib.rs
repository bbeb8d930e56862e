//! Expression factory resolution for the EL runtime.
//!
//! Locates the expression factory provider through an ordered chain of
//! discovery sources (service resource, platform properties file, process
//! property, built-in default) and instantiates it from a provider registry,
//! optionally handing it a configuration object.
//!
//! ```no_run
//! let factory = el_core::new_instance()?;
//! # Ok::<(), el_types::ElError>(())
//! ```

pub mod builder;
pub mod context;
pub mod registry;
pub mod resolver;

pub use builder::{BuilderError, ResolverBuilder};
pub use context::{ContextGuard, LoadingContext, ProviderRegistry};
pub use registry::{get_registry, FactoryRegistry};
pub use resolver::{instantiate, FactoryResolver, Location};

use el_expression::ExpressionFactory;
use el_types::{ElError, Properties};
use std::sync::Arc;

/// Creates an expression factory using the standard discovery chain.
pub fn new_instance() -> Result<Box<dyn ExpressionFactory>, ElError> {
	FactoryResolver::standard().resolve(None)
}

/// Creates an expression factory using the standard discovery chain,
/// handing `configuration` to providers that accept one.
pub fn new_instance_with(
	configuration: Arc<Properties>,
) -> Result<Box<dyn ExpressionFactory>, ElError> {
	FactoryResolver::standard().resolve(Some(configuration))
}
