//! Error types for the manufacturing engine.
//!
//! Only configuration problems are errors. Failed construction attempts,
//! depth-limit diversions and immutable containers are recovered where they
//! happen and reported through `tracing`.

use facsimile_types::{InvokeError, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactoryError {
	/// A generic class was requested with fewer type arguments than it declares.
	#[error(
		"{class} declares type parameters {expected:?} but {found} type arguments were supplied"
	)]
	MissingTypeArguments {
		class: String,
		expected: Vec<String>,
		found: usize,
	},

	/// A strategy produced a value that cannot be assigned to its target.
	#[error("strategy value {actual} is not assignable to {target}")]
	IncompatibleStrategyValue { target: String, actual: String },

	/// A directive requested a scalar category the target cannot hold.
	#[error("{requested} values cannot be produced for {target}")]
	UnsupportedScalar { requested: String, target: String },

	/// A range directive has a NaN bound.
	#[error("range {range} for {target} has a NaN bound")]
	InvalidRange { range: String, target: String },

	/// A precise-value directive could not be converted to its target.
	#[error("precise value {value:?} could not be converted to {target}")]
	InvalidPreciseValue { value: String, target: String },

	/// A map type was used with a type-argument count other than two.
	#[error("map type {class} expects key and value type arguments, found {found}")]
	MapTypeArguments { class: String, found: usize },

	/// A write accessor or extra method failed.
	#[error("invocation of {member} failed: {source}")]
	Invocation {
		member: String,
		#[source]
		source: InvokeError,
	},

	/// Provider configuration error.
	#[error("configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Type(#[from] TypeError),

	/// Top-level wrapper naming the requested type.
	#[error("failed to manufacture {target}: {source}")]
	Manufacture {
		target: String,
		#[source]
		source: Box<FactoryError>,
	},
}

impl FactoryError {
	/// The innermost error, skipping the top-level wrapper.
	pub fn root_cause(&self) -> &FactoryError {
		match self {
			FactoryError::Manufacture { source, .. } => source.root_cause(),
			other => other,
		}
	}
}

pub type FactoryResult<T> = Result<T, FactoryError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_root_cause_unwraps_manufacture() {
		// Arrange
		let inner = FactoryError::MapTypeArguments {
			class: "Map".to_string(),
			found: 1,
		};
		let wrapped = FactoryError::Manufacture {
			target: "Holder".to_string(),
			source: Box::new(inner),
		};

		// Act
		let root = wrapped.root_cause();

		// Assert
		assert!(matches!(root, FactoryError::MapTypeArguments { found: 1, .. }));
		assert_eq!(
			wrapped.to_string(),
			"failed to manufacture Holder: map type Map expects key and value type arguments, found 1"
		);
	}

	#[rstest]
	fn test_invocation_message() {
		let error = FactoryError::Invocation {
			member: "Pojo.name".to_string(),
			source: InvokeError::Failed("boom".to_string()),
		};

		assert_eq!(
			error.to_string(),
			"invocation of Pojo.name failed: invocation failed: boom"
		);
	}
}
