//! # Facsimile
//!
//! Builds fully populated instance graphs for arbitrary runtime types, for
//! use as automated test fixtures.
//!
//! Classes are described once in a [`TypeRegistry`]; the [`Factory`] then
//! resolves generic parameters across inheritance, picks constructors, sets
//! every reachable attribute and fills containers, bounding recursion per
//! class.
//!
//! ## Feature Flags
//!
//! - `config` (default) - TOML-loadable [`ProviderConfig`]
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use facsimile::prelude::*;
//!
//! let mut registry = TypeRegistry::new();
//! let tag = registry
//!     .class("Tag")
//!     .unwrap()
//!     .field("label", TypeRef::string())
//!     .default_constructor()
//!     .build()
//!     .unwrap();
//! let post = registry
//!     .class("Post")
//!     .unwrap()
//!     .field("title", TypeRef::string())
//!     .field("tags", TypeRef::list_of(TypeRef::class(tag)))
//!     .default_constructor()
//!     .build()
//!     .unwrap();
//!
//! let factory = Factory::builder(Arc::new(registry))
//!     .provider(RandomValueProvider::builder().element_count(3).build())
//!     .build();
//! let value = factory.manufacture(post, &[]).unwrap();
//!
//! let tags = value.as_object().unwrap().get("tags");
//! assert_eq!(tags.as_collection().map(|c| c.len()), Some(3));
//! ```

pub mod factory;
pub mod types;

pub use facsimile_factory::{
	ExternalFactory, Factory, FactoryBuilder, FactoryError, FactoryResult, NullExternalFactory,
	RandomValueProvider, ValueProvider,
};
#[cfg(feature = "config")]
pub use facsimile_factory::ProviderConfig;
pub use facsimile_types::{ClassId, Directive, TypeRef, TypeRegistry, Value};

/// Prelude module for convenient imports
///
/// Import everything commonly needed with:
/// ```rust
/// use facsimile::prelude::*;
/// ```
pub mod prelude {
	pub use facsimile_factory::prelude::*;

	pub use facsimile_types::{
		ClassId, ClassKind, CollectionDirective, Directive, FieldDef, FixedValue, FnStrategy,
		ObjectRef, ScalarKind, ScalarRange, TypeRef, TypeRegistry, Value, ValueStrategy, builtin,
	};
}
