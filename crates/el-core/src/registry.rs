//! Global factory registry.
//!
//! Holds every built-in provider and discovery source factory, assembled once
//! from the implementation lists of the provider and discovery crates.

use crate::context::ProviderRegistry;
use el_discovery::DiscoveryFactory;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Global registry for all implementation factories
pub struct FactoryRegistry {
	pub providers: Arc<ProviderRegistry>,
	pub sources: HashMap<String, DiscoveryFactory>,
}

impl FactoryRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			providers: Arc::new(ProviderRegistry::new()),
			sources: HashMap::new(),
		}
	}

	/// Register a discovery source factory
	pub fn register_source(&mut self, name: impl Into<String>, factory: DiscoveryFactory) {
		self.sources.insert(name.into(), factory);
	}

	/// Names of the registered discovery sources, sorted.
	pub fn source_names(&self) -> Vec<&str> {
		let mut names: Vec<_> = self.sources.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl Default for FactoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

// Global registry instance
static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Initialize the global registry with all available implementations
pub fn initialize_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		registry.providers = Arc::new(ProviderRegistry::with_builtins());

		// Auto-register all discovery sources
		for (name, factory) in el_discovery::get_all_implementations() {
			tracing::debug!("Registering discovery source: {}", name);
			registry.register_source(name, factory);
		}

		registry
	})
}

/// Get the global factory registry
pub fn get_registry() -> &'static FactoryRegistry {
	initialize_registry()
}
