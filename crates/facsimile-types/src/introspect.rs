//! Discovery of the attributes and extra methods of a class.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::class::{ClassId, FieldAccess};
use crate::directive::Directive;
use crate::member::{Getter, MethodDef, Setter};
use crate::registry::TypeRegistry;
use crate::type_ref::TypeRef;

/// A settable and/or readable attribute of a class.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
	pub name: String,
	pub ty: TypeRef,
	pub directives: Vec<Directive>,
	pub getter: Option<Getter>,
	pub setter: Option<Setter>,
	/// Class that declares the attribute.
	pub declared_in: ClassId,
}

impl AttributeDescriptor {
	pub fn is_writable(&self) -> bool {
		self.setter.is_some()
	}

	pub fn is_read_only(&self) -> bool {
		self.setter.is_none() && self.getter.is_some()
	}
}

/// Reports the attributes and post-population methods of classes.
pub trait ClassIntrospector: Send + Sync {
	/// Attributes of `class` and its superclasses, most-derived first, each
	/// name reported once.
	fn attributes(&self, registry: &TypeRegistry, class: ClassId) -> Vec<AttributeDescriptor>;

	/// Methods to invoke once population of an instance is complete.
	fn extra_methods(&self, registry: &TypeRegistry, class: ClassId) -> Vec<MethodDef>;
}

/// Introspector deriving accessors from declared fields.
///
/// Read-write fields get a getter and a setter, read-only fields a getter and
/// write-only fields a setter. Fields can be hidden per class, and methods
/// can be registered by name to run after population.
#[derive(Debug, Clone, Default)]
pub struct ConventionIntrospector {
	excluded_fields: HashMap<ClassId, HashSet<String>>,
	extra_methods: HashMap<ClassId, Vec<String>>,
}

impl ConventionIntrospector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Hides a field of `class` (and of classes derived from it).
	pub fn exclude_field(mut self, class: ClassId, name: impl Into<String>) -> Self {
		self.excluded_fields
			.entry(class)
			.or_default()
			.insert(name.into());
		self
	}

	/// Registers a method of `class`, looked up by name, to call after
	/// population.
	pub fn with_extra_method(mut self, class: ClassId, name: impl Into<String>) -> Self {
		self.extra_methods.entry(class).or_default().push(name.into());
		self
	}

	fn is_excluded(&self, chain: &[ClassId], field: &str) -> bool {
		chain.iter().any(|class| {
			self.excluded_fields
				.get(class)
				.is_some_and(|names| names.contains(field))
		})
	}
}

impl ClassIntrospector for ConventionIntrospector {
	fn attributes(&self, registry: &TypeRegistry, class: ClassId) -> Vec<AttributeDescriptor> {
		let chain = registry.ancestors(class);
		let mut seen = HashSet::new();
		let mut attributes = Vec::new();

		for owner in &chain {
			let Ok(def) = registry.get(*owner) else {
				continue;
			};
			for field in &def.fields {
				if !seen.insert(field.name.clone()) || self.is_excluded(&chain, &field.name) {
					continue;
				}
				let getter = match field.access {
					FieldAccess::ReadWrite | FieldAccess::ReadOnly => {
						Some(Getter::field(&field.name))
					}
					FieldAccess::WriteOnly => None,
				};
				let setter = match field.access {
					FieldAccess::ReadWrite | FieldAccess::WriteOnly => {
						Some(Setter::field(&field.name))
					}
					FieldAccess::ReadOnly => None,
				};
				attributes.push(AttributeDescriptor {
					name: field.name.clone(),
					ty: field.ty.clone(),
					directives: field.directives.clone(),
					getter,
					setter,
					declared_in: *owner,
				});
			}
		}
		attributes
	}

	fn extra_methods(&self, registry: &TypeRegistry, class: ClassId) -> Vec<MethodDef> {
		let Some(names) = self.extra_methods.get(&class) else {
			return Vec::new();
		};
		let chain = registry.ancestors(class);
		names
			.iter()
			.filter_map(|name| {
				let found = chain
					.iter()
					.find_map(|c| registry.get(*c).ok()?.method(name).cloned());
				if found.is_none() {
					warn!(
						"Extra method {} is not declared on {}, skipping",
						name,
						registry.name(class)
					);
				}
				found
			})
			.collect()
	}
}
