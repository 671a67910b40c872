//! Type references: possibly generic uses of a class.

use std::collections::HashMap;

use crate::builtin;
use crate::class::{ClassId, ScalarKind};

/// A use-site reference to a type.
///
/// Arrays are expressed as [`builtin::ARRAY`] with the component type as the
/// single argument, so every closed reference is a `Class`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
	/// A class, with explicit type arguments (possibly none).
	Class { class: ClassId, args: Vec<TypeRef> },
	/// A bare type-parameter name, bound through a substitution map.
	Param(String),
	/// A bounded wildcard.
	Wildcard {
		lower: Vec<TypeRef>,
		upper: Vec<TypeRef>,
	},
}

impl TypeRef {
	/// A raw reference to a class.
	pub fn class(class: ClassId) -> Self {
		TypeRef::Class {
			class,
			args: Vec::new(),
		}
	}

	/// A parameterized reference.
	pub fn generic(class: ClassId, args: Vec<TypeRef>) -> Self {
		TypeRef::Class { class, args }
	}

	/// A type-parameter reference.
	pub fn param(name: impl Into<String>) -> Self {
		TypeRef::Param(name.into())
	}

	/// `? extends upper`
	pub fn extends(upper: TypeRef) -> Self {
		TypeRef::Wildcard {
			lower: Vec::new(),
			upper: vec![upper],
		}
	}

	/// `? super lower`
	pub fn super_of(lower: TypeRef) -> Self {
		TypeRef::Wildcard {
			lower: vec![lower],
			upper: Vec::new(),
		}
	}

	/// `?`
	pub fn unbounded() -> Self {
		TypeRef::Wildcard {
			lower: Vec::new(),
			upper: Vec::new(),
		}
	}

	pub fn object() -> Self {
		Self::class(builtin::OBJECT)
	}

	pub fn string() -> Self {
		Self::class(builtin::STRING)
	}

	/// The non-nullable form of a scalar.
	pub fn primitive(kind: ScalarKind) -> Self {
		Self::class(builtin::primitive(kind))
	}

	/// The nullable form of a scalar.
	pub fn boxed(kind: ScalarKind) -> Self {
		Self::class(builtin::boxed(kind))
	}

	pub fn array_of(component: TypeRef) -> Self {
		Self::generic(builtin::ARRAY, vec![component])
	}

	pub fn list_of(element: TypeRef) -> Self {
		Self::generic(builtin::LIST, vec![element])
	}

	pub fn set_of(element: TypeRef) -> Self {
		Self::generic(builtin::SET, vec![element])
	}

	pub fn queue_of(element: TypeRef) -> Self {
		Self::generic(builtin::QUEUE, vec![element])
	}

	pub fn map_of(key: TypeRef, value: TypeRef) -> Self {
		Self::generic(builtin::MAP, vec![key, value])
	}

	/// `Class<T>` literal of the given type.
	pub fn class_literal(of: TypeRef) -> Self {
		Self::generic(builtin::CLASS, vec![of])
	}

	/// The referenced class, if this is a class reference.
	pub fn class_id(&self) -> Option<ClassId> {
		match self {
			TypeRef::Class { class, .. } => Some(*class),
			_ => None,
		}
	}

	/// Explicit type arguments; empty for parameters and wildcards.
	pub fn args(&self) -> &[TypeRef] {
		match self {
			TypeRef::Class { args, .. } => args,
			_ => &[],
		}
	}

	/// Returns true if no parameter or wildcard occurs anywhere inside.
	pub fn is_closed(&self) -> bool {
		match self {
			TypeRef::Class { args, .. } => args.iter().all(TypeRef::is_closed),
			TypeRef::Param(_) | TypeRef::Wildcard { .. } => false,
		}
	}

	/// Replaces bound parameters; unbound ones are kept as they are.
	pub fn substitute(&self, bindings: &HashMap<String, TypeRef>) -> TypeRef {
		match self {
			TypeRef::Class { class, args } => TypeRef::Class {
				class: *class,
				args: args.iter().map(|a| a.substitute(bindings)).collect(),
			},
			TypeRef::Param(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
			TypeRef::Wildcard { lower, upper } => TypeRef::Wildcard {
				lower: lower.iter().map(|t| t.substitute(bindings)).collect(),
				upper: upper.iter().map(|t| t.substitute(bindings)).collect(),
			},
		}
	}
}
