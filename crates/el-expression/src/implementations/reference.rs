//! Reference expression factory used when no other provider is configured.
//!
//! The reference factory handles literal expressions only: text without
//! `${...}` or `#{...}` parts, and pre-computed values. Coercion is identity
//! only. Anything requiring a parser is reported as unsupported.

use crate::{ExpressionFactory, MethodExpression, Provider, ValueExpression};
use el_types::{
	ElContext, ElError, ElValue, ImplementationRegistry, Properties, ValueType, DEFAULT_PROVIDER,
};
use std::any::Any;
use std::sync::Arc;

/// Reference expression factory.
#[derive(Debug, Default)]
pub struct ReferenceExpressionFactory {
	/// Configuration the factory was constructed with, if any.
	properties: Option<Arc<Properties>>,
}

impl ReferenceExpressionFactory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a factory that keeps `properties` for later inspection.
	pub fn with_properties(properties: Arc<Properties>) -> Self {
		Self {
			properties: Some(properties),
		}
	}

	/// The configuration handed over at construction.
	pub fn properties(&self) -> Option<&Arc<Properties>> {
		self.properties.as_ref()
	}
}

/// Whether `text` contains an evaluated part that needs a parser.
fn has_eval_part(text: &str) -> bool {
	text.contains("${") || text.contains("#{")
}

fn coerce(value: &ElValue, expected: ValueType) -> Result<ElValue, ElError> {
	if expected.accepts(value) {
		Ok(value.clone())
	} else {
		Err(ElError::Coercion {
			value: value.to_string(),
			expected,
		})
	}
}

impl ExpressionFactory for ReferenceExpressionFactory {
	fn coerce_to_type(&self, value: &ElValue, expected: ValueType) -> Result<ElValue, ElError> {
		coerce(value, expected)
	}

	fn create_value_expression(
		&self,
		_context: &ElContext,
		expression: &str,
		expected: ValueType,
	) -> Result<Box<dyn ValueExpression>, ElError> {
		if has_eval_part(expression) {
			return Err(ElError::Unsupported(format!(
				"reference factory cannot parse '{}'",
				expression
			)));
		}
		Ok(Box::new(LiteralValueExpression {
			text: expression.to_string(),
			value: ElValue::String(expression.to_string()),
			expected,
			literal_text: true,
		}))
	}

	fn create_object_value_expression(
		&self,
		instance: ElValue,
		expected: ValueType,
	) -> Result<Box<dyn ValueExpression>, ElError> {
		Ok(Box::new(LiteralValueExpression {
			text: instance.to_string(),
			value: instance,
			expected,
			literal_text: false,
		}))
	}

	fn create_method_expression(
		&self,
		_context: &ElContext,
		expression: &str,
		expected_return: ValueType,
		expected_params: &[ValueType],
	) -> Result<Box<dyn MethodExpression>, ElError> {
		if has_eval_part(expression) {
			return Err(ElError::Unsupported(format!(
				"reference factory cannot parse '{}'",
				expression
			)));
		}
		Ok(Box::new(LiteralMethodExpression {
			text: expression.to_string(),
			expected_return,
			param_count: expected_params.len(),
		}))
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Value expression over a fixed value.
struct LiteralValueExpression {
	text: String,
	value: ElValue,
	expected: ValueType,
	literal_text: bool,
}

impl ValueExpression for LiteralValueExpression {
	fn expression_string(&self) -> &str {
		&self.text
	}

	fn expected_type(&self) -> ValueType {
		self.expected
	}

	fn is_literal_text(&self) -> bool {
		self.literal_text
	}

	fn get_value(&self, _context: &ElContext) -> Result<ElValue, ElError> {
		coerce(&self.value, self.expected)
	}
}

/// Method expression over literal text; invoking it yields the text.
struct LiteralMethodExpression {
	text: String,
	expected_return: ValueType,
	param_count: usize,
}

impl MethodExpression for LiteralMethodExpression {
	fn expression_string(&self) -> &str {
		&self.text
	}

	fn is_literal_text(&self) -> bool {
		true
	}

	fn invoke(&self, _context: &ElContext, params: &[ElValue]) -> Result<ElValue, ElError> {
		if params.len() != self.param_count {
			return Err(ElError::Evaluation(format!(
				"expected {} parameters, got {}",
				self.param_count,
				params.len()
			)));
		}
		coerce(&ElValue::String(self.text.clone()), self.expected_return)
	}
}

/// Plain constructor.
pub fn create_factory() -> Result<Box<dyn ExpressionFactory>, ElError> {
	tracing::debug!("Creating reference expression factory");
	Ok(Box::new(ReferenceExpressionFactory::new()))
}

/// Constructor receiving the caller's configuration.
pub fn create_factory_with(
	properties: Arc<Properties>,
) -> Result<Box<dyn ExpressionFactory>, ElError> {
	tracing::debug!(
		entries = properties.len(),
		"Creating configured reference expression factory"
	);
	Ok(Box::new(ReferenceExpressionFactory::with_properties(
		properties,
	)))
}

/// Registry for the reference implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = DEFAULT_PROVIDER;
	type Factory = Provider;

	fn factory() -> Self::Factory {
		Provider::configurable(create_factory, create_factory_with)
	}
}

impl crate::ExpressionFactoryRegistry for Registry {}
