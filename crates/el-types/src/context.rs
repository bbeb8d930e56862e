//! Values, value types and the evaluation context.
//!
//! Expression values are dynamically typed JSON-like values. `ValueType`
//! plays the role of the "expected type" arguments of the factory surface.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Dynamically typed value produced and consumed by expressions.
pub type ElValue = serde_json::Value;

/// Type tag used for expected types and coercion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	/// Accepts every value.
	Any,
	/// Only the null value.
	Null,
	Boolean,
	/// Integral numbers.
	Long,
	/// Any number.
	Double,
	String,
	Array,
	Map,
}

impl ValueType {
	/// Returns the narrowest type describing `value`.
	pub fn of(value: &ElValue) -> Self {
		match value {
			ElValue::Null => ValueType::Null,
			ElValue::Bool(_) => ValueType::Boolean,
			ElValue::Number(n) if n.is_i64() || n.is_u64() => ValueType::Long,
			ElValue::Number(_) => ValueType::Double,
			ElValue::String(_) => ValueType::String,
			ElValue::Array(_) => ValueType::Array,
			ElValue::Object(_) => ValueType::Map,
		}
	}

	/// Whether `value` already is an instance of this type.
	///
	/// Null is accepted by every type except the primitive ones, and every
	/// integral number is also a `Double`.
	pub fn accepts(&self, value: &ElValue) -> bool {
		let actual = ValueType::of(value);
		match self {
			ValueType::Any => true,
			ValueType::Boolean | ValueType::Long | ValueType::Double if actual == ValueType::Null => {
				false
			},
			_ if actual == ValueType::Null => true,
			ValueType::Double => matches!(actual, ValueType::Long | ValueType::Double),
			expected => *expected == actual,
		}
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ValueType::Any => "any",
			ValueType::Null => "null",
			ValueType::Boolean => "boolean",
			ValueType::Long => "long",
			ValueType::Double => "double",
			ValueType::String => "string",
			ValueType::Array => "array",
			ValueType::Map => "map",
		};
		f.write_str(name)
	}
}

/// Evaluation context passed to expression creation and evaluation.
///
/// Holds named variables; resolver chains belong to implementations.
#[derive(Debug, Clone, Default)]
pub struct ElContext {
	variables: HashMap<String, ElValue>,
}

impl ElContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `name` to `value`, returning the previous binding.
	pub fn set_variable(&mut self, name: impl Into<String>, value: ElValue) -> Option<ElValue> {
		self.variables.insert(name.into(), value)
	}

	/// Returns the value bound to `name`.
	pub fn variable(&self, name: &str) -> Option<&ElValue> {
		self.variables.get(name)
	}
}
