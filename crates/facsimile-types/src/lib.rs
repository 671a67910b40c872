//! # Facsimile Types
//!
//! The runtime type model consumed by the facsimile manufacturing engine.
//!
//! ## Overview
//!
//! Classes live in a [`TypeRegistry`] arena and are addressed by [`ClassId`].
//! Each [`ClassDef`] records its category, generic parameters, supertypes,
//! fields and the members able to build or mutate instances. Values produced
//! for those classes are dynamic [`Value`]s; objects and containers are shared
//! handles so that cyclic graphs can be expressed.
//!
//! ## Example
//!
//! ```rust
//! use facsimile_types::{ScalarKind, TypeRef, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let person = registry
//!     .class("Person")
//!     .unwrap()
//!     .field("name", TypeRef::string())
//!     .field("age", TypeRef::primitive(ScalarKind::Int))
//!     .default_constructor()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(registry.name(person), "Person");
//! ```

pub mod builtin;
pub mod class;
pub mod directive;
pub mod error;
pub mod introspect;
pub mod member;
pub mod registry;
pub mod type_ref;
pub mod value;

pub use class::{
	ClassDef, ClassId, ClassKind, CollectionKind, FieldAccess, FieldDef, FieldInitializer, MapKind,
	ScalarKind,
};
pub use directive::{
	CollectionDirective, Directive, DirectiveSet, DirectiveTag, FixedValue, FnStrategy,
	ScalarRange, ValueStrategy,
};
pub use error::{TypeError, TypeResult};
pub use introspect::{AttributeDescriptor, ClassIntrospector, ConventionIntrospector};
pub use member::{
	Constructor, FactoryMethod, Getter, InvokeError, InvokeResult, MethodDef, Parameter, Setter,
	Visibility,
};
pub use registry::{ClassBuilder, TypeRegistry};
pub use type_ref::TypeRef;
pub use value::{
	ArrayValue, CollectionFlavour, CollectionRef, EnumValue, MapFlavour, MapRef, ObjectRef, Value,
};
