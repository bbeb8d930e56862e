//! Error type for expression factory resolution and expression handling.

use crate::ValueType;
use thiserror::Error;

/// Errors that can occur while resolving, constructing or using an
/// expression factory.
///
/// Absent discovery sources are never reported through this type; they are
/// ordinary steps of the fallback chain.
#[derive(Debug, Error)]
pub enum ElError {
	/// A discovery resource or file exists but could not be read.
	#[error("Failed to read {resource}: {source}")]
	SourceUnreadable {
		resource: String,
		#[source]
		source: std::io::Error,
	},
	/// The resolved provider name is not registered in the loading context.
	#[error("Unable to find ExpressionFactory of type: {0}")]
	ProviderNotFound(String),
	/// The provider was found but could not be instantiated.
	#[error("Unable to create ExpressionFactory of type: {provider}: {source}")]
	Construction {
		provider: String,
		#[source]
		source: Box<ElError>,
	},
	/// A value could not be coerced to the requested type.
	#[error("Cannot coerce {value} to {expected}")]
	Coercion { value: String, expected: ValueType },
	/// The factory does not support the requested operation.
	#[error("Unsupported operation: {0}")]
	Unsupported(String),
	/// Invalid configuration handed to a provider or a discovery source.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// Failure while evaluating an expression.
	#[error("Evaluation error: {0}")]
	Evaluation(String),
}

impl ElError {
	/// Wraps `source` as a construction failure of `provider`.
	pub fn construction(provider: impl Into<String>, source: ElError) -> Self {
		ElError::Construction {
			provider: provider.into(),
			source: Box::new(source),
		}
	}

	/// Wraps an I/O failure on a discovery resource.
	pub fn unreadable(resource: impl Into<String>, source: std::io::Error) -> Self {
		ElError::SourceUnreadable {
			resource: resource.into(),
			source,
		}
	}
}
