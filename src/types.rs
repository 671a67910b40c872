//! Runtime type model module.
//!
//! Classes, type references, directives, member handles and dynamic values.
//!
//! # Examples
//!
//! ```rust
//! use facsimile::types::{TypeRef, TypeRegistry, builtin};
//!
//! let registry = TypeRegistry::new();
//! assert_eq!(registry.display(&TypeRef::list_of(TypeRef::string())), "List<String>");
//! assert!(registry.is_subclass(builtin::ARRAY_LIST, builtin::OBJECT));
//! ```

pub use facsimile_types::*;
