//! Expression factory capability surface.
//!
//! This module defines the traits every expression factory implementation
//! provides, together with `Provider`, the registration record describing how
//! an implementation is constructed. Parsing and evaluation live entirely in
//! the implementations.

use el_types::{ElContext, ElError, ElValue, ImplementationRegistry, Properties, ValueType};
use std::any::Any;
use std::sync::Arc;

/// Re-export implementations
pub mod implementations {
	pub mod reference;
}

/// A parsed expression that yields a value.
pub trait ValueExpression: Send + Sync {
	/// The original expression text.
	fn expression_string(&self) -> &str;

	/// Type the value is coerced to on evaluation.
	fn expected_type(&self) -> ValueType;

	/// Whether the expression is plain literal text with no evaluated parts.
	fn is_literal_text(&self) -> bool;

	/// Evaluates the expression against `context`.
	fn get_value(&self, context: &ElContext) -> Result<ElValue, ElError>;

	/// Whether assignments through this expression are rejected.
	fn is_read_only(&self, _context: &ElContext) -> bool {
		true
	}
}

/// A parsed expression that refers to an invocable method.
pub trait MethodExpression: Send + Sync {
	/// The original expression text.
	fn expression_string(&self) -> &str;

	/// Whether the expression is plain literal text.
	fn is_literal_text(&self) -> bool;

	/// Invokes the referenced method with `params`.
	fn invoke(&self, context: &ElContext, params: &[ElValue]) -> Result<ElValue, ElError>;
}

/// Trait defining the interface every expression factory implementation
/// provides.
///
/// Instances are produced by the resolver; callers own them afterwards.
pub trait ExpressionFactory: Send + Sync {
	/// Coerces `value` to `expected`.
	fn coerce_to_type(&self, value: &ElValue, expected: ValueType) -> Result<ElValue, ElError>;

	/// Parses `expression` into a value expression.
	fn create_value_expression(
		&self,
		context: &ElContext,
		expression: &str,
		expected: ValueType,
	) -> Result<Box<dyn ValueExpression>, ElError>;

	/// Wraps an already computed value as a value expression.
	fn create_object_value_expression(
		&self,
		instance: ElValue,
		expected: ValueType,
	) -> Result<Box<dyn ValueExpression>, ElError>;

	/// Parses `expression` into a method expression.
	fn create_method_expression(
		&self,
		context: &ElContext,
		expression: &str,
		expected_return: ValueType,
		expected_params: &[ValueType],
	) -> Result<Box<dyn MethodExpression>, ElError>;

	/// Access to the concrete type, mostly for diagnostics and tests.
	fn as_any(&self) -> &dyn Any;
}

/// Constructor taking no configuration.
pub type PlainConstructor = fn() -> Result<Box<dyn ExpressionFactory>, ElError>;

/// Constructor receiving the caller's configuration.
pub type ConfiguredConstructor =
	fn(Arc<Properties>) -> Result<Box<dyn ExpressionFactory>, ElError>;

/// Registration record for one expression factory implementation.
///
/// Which constructors exist is declared up front; the resolver picks one from
/// these flags instead of probing the implementation.
#[derive(Debug, Clone, Copy)]
pub struct Provider {
	plain: Option<PlainConstructor>,
	configured: Option<ConfiguredConstructor>,
}

impl Provider {
	/// Provider constructed without configuration only.
	pub const fn plain(plain: PlainConstructor) -> Self {
		Self {
			plain: Some(plain),
			configured: None,
		}
	}

	/// Provider with both constructor forms.
	pub const fn configurable(plain: PlainConstructor, configured: ConfiguredConstructor) -> Self {
		Self {
			plain: Some(plain),
			configured: Some(configured),
		}
	}

	/// Provider that can only be built from configuration.
	pub const fn configured_only(configured: ConfiguredConstructor) -> Self {
		Self {
			plain: None,
			configured: Some(configured),
		}
	}

	pub fn plain_constructor(&self) -> Option<PlainConstructor> {
		self.plain
	}

	pub fn configured_constructor(&self) -> Option<ConfiguredConstructor> {
		self.configured
	}

	/// Whether a configuration object can be passed to this provider.
	pub fn accepts_configuration(&self) -> bool {
		self.configured.is_some()
	}
}

/// Registry trait for expression factory implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// providers register a `Provider` record.
pub trait ExpressionFactoryRegistry: ImplementationRegistry<Factory = Provider> {}

/// Get all built-in expression factory implementations.
///
/// Returns a vector of (name, provider) tuples used to seed provider
/// registries.
pub fn get_all_implementations() -> Vec<(&'static str, Provider)> {
	use implementations::reference;

	vec![(reference::Registry::NAME, reference::Registry::factory())]
}
