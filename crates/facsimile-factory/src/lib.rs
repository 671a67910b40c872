//! Recursive manufacturing engine for facsimile.
//!
//! This crate builds fully populated instance graphs for classes described in
//! a [`TypeRegistry`](facsimile_types::TypeRegistry):
//!
//! - **Type Resolver**: binds generic parameters across inheritance
//! - **Instance Builder**: picks and invokes constructors or static factories
//! - **Graph Populator**: sets writable attributes, descends into read-only ones
//! - **Container Filler**: brings arrays, collections and maps to their element count
//!
//! Recursion is bounded per class by a call-scoped [`DepthLedger`]; whatever
//! the engine cannot produce itself is delegated to an [`ExternalFactory`].
//!
//! # Features
//!
//! - `config` - TOML-loadable [`ProviderConfig`] (enabled by default)
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use facsimile_factory::prelude::*;
//! use facsimile_types::{TypeRef, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let node = registry.reserve("Node").unwrap();
//! registry
//!     .define_class(node)
//!     .field("label", TypeRef::string())
//!     .field("next", TypeRef::class(node))
//!     .default_constructor()
//!     .build()
//!     .unwrap();
//!
//! let provider = RandomValueProvider::builder().max_depth(2).build();
//! let factory = Factory::builder(Arc::new(registry)).provider(provider).build();
//!
//! let mut hops = 0;
//! let mut current = factory.manufacture(node, &[]).unwrap();
//! while let Some(object) = current.as_object() {
//!     current = object.get("next");
//!     hops += usize::from(!current.is_null());
//! }
//! assert_eq!(hops, 3);
//! ```
//!
//! # Architecture
//!
//! - [`Factory`] - shareable entry point, immutable once built
//! - [`ValueProvider`] - scalar values, element counts, depth limits, memoization
//! - [`ExternalFactory`] - fallback production for interfaces and exhausted candidates
//! - [`SubstitutionMap`] - per-call generic parameter bindings

#![warn(rustdoc::missing_crate_level_docs)]

mod builder;
pub mod error;
pub mod factory;
mod filler;
pub mod ledger;
mod populator;
pub mod prelude;
pub mod provider;
pub mod resolver;
mod scalar;

// Re-export commonly used types at crate root
pub use error::{FactoryError, FactoryResult};
pub use factory::{Factory, FactoryBuilder};
pub use ledger::{DepthGuard, DepthLedger};
pub use provider::{
	AttributeMetadata, DEFAULT_ELEMENT_COUNT, DEFAULT_MAX_DEPTH, DEFAULT_STRING_LENGTH,
	ExternalFactory, MemoKey, NullExternalFactory, RandomValueProvider, RandomValueProviderBuilder,
	ValueProvider, order_constructors_by_fewest_params, order_factories_by_most_params,
};
#[cfg(feature = "config")]
pub use provider::{ClassOverride, ProviderConfig};
pub use resolver::{ResolvedType, SubstitutionMap, resolve};
