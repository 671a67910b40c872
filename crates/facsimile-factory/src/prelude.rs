//! Convenience re-exports for common usage.
//!
//! ```rust
//! use facsimile_factory::prelude::*;
//!
//! let provider = RandomValueProvider::builder().seed(42).build();
//! assert_eq!(provider.max_depth(facsimile_types::builtin::OBJECT), DEFAULT_MAX_DEPTH);
//! ```

// Error types
pub use crate::error::{FactoryError, FactoryResult};

// Engine
pub use crate::factory::{Factory, FactoryBuilder};
pub use crate::ledger::DepthLedger;
pub use crate::resolver::{ResolvedType, SubstitutionMap};

// Collaborators
pub use crate::provider::{
	AttributeMetadata, DEFAULT_ELEMENT_COUNT, DEFAULT_MAX_DEPTH, DEFAULT_STRING_LENGTH,
	ExternalFactory, NullExternalFactory, RandomValueProvider, RandomValueProviderBuilder,
	ValueProvider,
};

#[cfg(feature = "config")]
pub use crate::provider::{ClassOverride, ProviderConfig};
