//! Registry trait for self-registering implementations.
//!
//! Providers and discovery sources both declare the name they are known by
//! together with their factory, so registries can be assembled from plain
//! lists instead of runtime introspection.

/// Base trait for implementation registries.
///
/// Each implementation module (expression providers, discovery sources)
/// provides a `Registry` struct that implements this trait. This ensures that
/// every implementation declares its lookup name and provides a factory.
pub trait ImplementationRegistry {
	/// The name the implementation is looked up by.
	///
	/// For example:
	/// - "org.apache.el.ExpressionFactoryImpl" for the reference provider
	/// - "services" for the `discovery.sources.services` section
	const NAME: &'static str;

	/// The factory type this implementation provides.
	///
	/// Each module defines its own factory type, for example:
	/// - `Provider` for expression factory implementations
	/// - `DiscoveryFactory` for discovery sources
	type Factory;

	/// Get the factory for this implementation.
	fn factory() -> Self::Factory;
}
