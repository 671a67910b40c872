//! Error types for the type model.

use thiserror::Error;

use crate::class::ClassId;

#[derive(Debug, Clone, Error)]
pub enum TypeError {
	#[error("unknown class {0}")]
	UnknownClass(ClassId),

	#[error("a class named {0} is already registered")]
	DuplicateName(String),

	#[error("class {0} is already defined")]
	AlreadyDefined(String),
}

pub type TypeResult<T> = Result<T, TypeError>;
