//! Loading contexts: which providers exist and where resources come from.
//!
//! A resolution uses, in order of preference, the context it was built with,
//! the context entered on the current thread, or the global context.

use crate::registry::get_registry;
use el_discovery::{ClasspathLoader, ResourceLoader};
use el_expression::Provider;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
	static CURRENT: RefCell<Option<LoadingContext>> = const { RefCell::new(None) };
}

/// Maps provider names to their registration records.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
	providers: HashMap<String, Provider>,
}

impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry seeded with the built-in providers.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		for (name, provider) in el_expression::get_all_implementations() {
			tracing::debug!("Registering expression factory provider: {}", name);
			registry.register(name, provider);
		}
		registry
	}

	/// Registers `provider` under `name`, replacing any previous entry.
	pub fn register(&mut self, name: impl Into<String>, provider: Provider) {
		self.providers.insert(name.into(), provider);
	}

	pub fn get(&self, name: &str) -> Option<Provider> {
		self.providers.get(name).copied()
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<_> = self.providers.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

/// Provider registry plus resource loader used for one resolution.
#[derive(Clone)]
pub struct LoadingContext {
	registry: Arc<ProviderRegistry>,
	resources: Arc<dyn ResourceLoader>,
}

impl LoadingContext {
	pub fn new(registry: Arc<ProviderRegistry>, resources: Arc<dyn ResourceLoader>) -> Self {
		Self {
			registry,
			resources,
		}
	}

	/// The process-wide context: built-in providers and the `EL_CLASSPATH` roots.
	pub fn global() -> Self {
		Self {
			registry: Arc::clone(&get_registry().providers),
			resources: Arc::new(ClasspathLoader::from_env()),
		}
	}

	/// The context entered on this thread, if any.
	pub fn current() -> Option<Self> {
		CURRENT.with(|current| current.borrow().clone())
	}

	/// Makes this context the current one for the calling thread until the
	/// returned guard is dropped.
	pub fn enter(&self) -> ContextGuard {
		let previous = CURRENT.with(|current| current.replace(Some(self.clone())));
		ContextGuard {
			previous,
			_not_send: PhantomData,
		}
	}

	pub fn registry(&self) -> &ProviderRegistry {
		&self.registry
	}

	pub fn resources(&self) -> &dyn ResourceLoader {
		self.resources.as_ref()
	}
}

/// Restores the previously entered context on drop.
pub struct ContextGuard {
	previous: Option<LoadingContext>,
	// Must be dropped on the thread that entered
	_not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
	fn drop(&mut self) {
		let previous = self.previous.take();
		CURRENT.with(|current| {
			*current.borrow_mut() = previous;
		});
	}
}
