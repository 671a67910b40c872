//! Generic type-parameter resolution across inheritance.
//!
//! A [`SubstitutionMap`] binds the type parameters of one class to the type
//! arguments it was requested with, then threads the bindings its ancestors
//! declare in their `extends` clauses. Parameter-to-parameter links are kept
//! as they are and followed lazily when a type is closed.

use std::collections::HashMap;

use facsimile_types::{ClassId, TypeRef, TypeRegistry};
use tracing::{debug, error, warn};

use crate::error::{FactoryError, FactoryResult};

/// Bound on parameter-link chains followed while closing a type.
const MAX_LINK_DEPTH: usize = 32;

/// Per-call mapping from type-parameter name to bound type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionMap {
	bindings: HashMap<String, TypeRef>,
	/// Supplied arguments beyond the class's own parameter count.
	extra: Vec<TypeRef>,
}

/// A closed type: a class and its closed type arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
	pub class: ClassId,
	pub args: Vec<TypeRef>,
}

impl ResolvedType {
	/// The universal top type.
	pub fn top() -> Self {
		Self {
			class: facsimile_types::builtin::OBJECT,
			args: Vec::new(),
		}
	}

	pub fn type_ref(&self) -> TypeRef {
		TypeRef::generic(self.class, self.args.clone())
	}
}

impl SubstitutionMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the map for `class` requested with `supplied` type arguments.
	///
	/// Fails when the class declares more parameters than were supplied.
	/// Surplus arguments are kept as extras for raw generic references.
	pub fn for_class(
		registry: &TypeRegistry,
		class: ClassId,
		supplied: &[TypeRef],
	) -> FactoryResult<Self> {
		let def = registry.get(class)?;
		let declared = def.type_params.len();
		if declared > supplied.len() {
			error!(
				"Could not find sufficient type arguments for {}: expected {:?}, supplied {:?}",
				def.name, def.type_params, supplied
			);
			return Err(FactoryError::MissingTypeArguments {
				class: def.name.clone(),
				expected: def.type_params.clone(),
				found: supplied.len(),
			});
		}

		let mut map = Self::new();
		for (param, arg) in def.type_params.iter().zip(supplied) {
			map.bindings.insert(param.clone(), arg.clone());
		}
		map.extra = supplied[declared..].to_vec();

		let mut visited = vec![class];
		let mut current = def;
		while let Some(parent) = current.superclass.as_ref() {
			let Some(parent_id) = parent.class_id() else {
				break;
			};
			if visited.contains(&parent_id) {
				break;
			}
			visited.push(parent_id);
			let parent_def = registry.get(parent_id)?;
			for (param, arg) in parent_def.type_params.iter().zip(parent.args()) {
				if matches!(arg, TypeRef::Param(name) if name == param) {
					continue;
				}
				// Names already bound closer to the requested class win.
				map.bindings
					.entry(param.clone())
					.or_insert_with(|| arg.clone());
			}
			current = parent_def;
		}

		Ok(map)
	}

	/// Binds a parameter unless it is already bound.
	pub fn bind(&mut self, name: impl Into<String>, ty: TypeRef) -> &mut Self {
		self.bindings.entry(name.into()).or_insert(ty);
		self
	}

	pub fn get(&self, name: &str) -> Option<&TypeRef> {
		self.bindings.get(name)
	}

	pub fn extra(&self) -> &[TypeRef] {
		&self.extra
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty() && self.extra.is_empty()
	}

	/// Replaces every parameter and wildcard in `ty` by a concrete type.
	///
	/// Unbound parameters become the top type with a warning. Wildcards take
	/// their first lower bound, else their first upper bound, else the top
	/// type. Raw references to generic object classes adopt bindings of the
	/// same parameter names, then the extra arguments in order.
	pub fn close(&self, registry: &TypeRegistry, ty: &TypeRef) -> TypeRef {
		self.close_at(registry, ty, &mut Vec::new())
	}

	/// Closes `ty` and splits it into class and arguments.
	pub fn resolve(&self, registry: &TypeRegistry, ty: &TypeRef) -> ResolvedType {
		match self.close(registry, ty) {
			TypeRef::Class { class, args } => ResolvedType { class, args },
			_ => ResolvedType::top(),
		}
	}

	/// `links` holds the parameter names being expanded above `ty`; a name
	/// that reappears inside its own expansion closes to the top type.
	fn close_at(
		&self,
		registry: &TypeRegistry,
		ty: &TypeRef,
		links: &mut Vec<String>,
	) -> TypeRef {
		match ty {
			TypeRef::Class { class, args } => {
				let mut closed: Vec<TypeRef> = args
					.iter()
					.map(|arg| self.close_at(registry, arg, links))
					.collect();
				if closed.is_empty() {
					closed = self.adopt(registry, *class, links);
				}
				TypeRef::Class {
					class: *class,
					args: closed,
				}
			}
			TypeRef::Param(name) => match self.bindings.get(name) {
				Some(bound) => self.follow(registry, name, bound, links),
				None => {
					warn!("Unrecognized type parameter {}. Will use Object instead", name);
					TypeRef::object()
				}
			},
			TypeRef::Wildcard { lower, upper } => {
				if let Some(bound) = lower.first() {
					debug!("Wildcard with lower bounds {:?}", lower);
					self.close_at(registry, bound, links)
				} else if let Some(bound) = upper.first() {
					debug!("Wildcard with upper bounds {:?}", upper);
					self.close_at(registry, bound, links)
				} else {
					TypeRef::object()
				}
			}
		}
	}

	/// Expands the binding of `name` unless it is already being expanded.
	fn follow(
		&self,
		registry: &TypeRegistry,
		name: &str,
		bound: &TypeRef,
		links: &mut Vec<String>,
	) -> TypeRef {
		if links.len() >= MAX_LINK_DEPTH || links.iter().any(|link| link == name) {
			warn!(
				"Type parameter {} does not resolve to a concrete type. Will use Object instead",
				name
			);
			return TypeRef::object();
		}
		links.push(name.to_string());
		let closed = self.close_at(registry, bound, links);
		links.pop();
		closed
	}

	fn adopt(
		&self,
		registry: &TypeRegistry,
		class: ClassId,
		links: &mut Vec<String>,
	) -> Vec<TypeRef> {
		if self.is_empty() || links.len() >= MAX_LINK_DEPTH {
			return Vec::new();
		}
		let Ok(def) = registry.get(class) else {
			return Vec::new();
		};
		// Raw containers keep no arguments and fall back to the top type.
		if def.type_params.is_empty() || !def.kind.is_object_like() {
			return Vec::new();
		}

		let mut extras = self.extra.iter();
		let mut adopted = Vec::with_capacity(def.type_params.len());
		for param in &def.type_params {
			if let Some(bound) = self.bindings.get(param) {
				adopted.push(self.follow(registry, param, bound, links));
			} else if let Some(extra) = extras.next() {
				links.push(String::new());
				adopted.push(self.close_at(registry, extra, links));
				links.pop();
			} else {
				break;
			}
		}
		adopted
	}
}

/// Resolves `ty` against `map` to a concrete class and its type arguments.
pub fn resolve(registry: &TypeRegistry, ty: &TypeRef, map: &SubstitutionMap) -> ResolvedType {
	map.resolve(registry, ty)
}

#[cfg(test)]
mod tests {
	use super::*;
	use facsimile_types::{ScalarKind, builtin};
	use rstest::{fixture, rstest};

	struct Hierarchy {
		registry: TypeRegistry,
		base: ClassId,
		middle: ClassId,
		leaf: ClassId,
		pair: ClassId,
	}

	/// `Base<E>`, `Middle<T> extends Base<List<T>>`, `Leaf extends Middle<String>`,
	/// `Pair<A, B>`.
	#[fixture]
	fn hierarchy() -> Hierarchy {
		let mut registry = TypeRegistry::new();
		let base = registry
			.class("Base")
			.unwrap()
			.type_param("E")
			.field("value", TypeRef::param("E"))
			.build()
			.unwrap();
		let middle = registry
			.class("Middle")
			.unwrap()
			.type_param("T")
			.extends(TypeRef::generic(
				base,
				vec![TypeRef::list_of(TypeRef::param("T"))],
			))
			.build()
			.unwrap();
		let leaf = registry
			.class("Leaf")
			.unwrap()
			.extends(TypeRef::generic(middle, vec![TypeRef::string()]))
			.build()
			.unwrap();
		let pair = registry
			.class("Pair")
			.unwrap()
			.type_param("A")
			.type_param("B")
			.build()
			.unwrap();
		Hierarchy {
			registry,
			base,
			middle,
			leaf,
			pair,
		}
	}

	#[rstest]
	fn test_binds_own_parameters(hierarchy: Hierarchy) {
		// Act
		let map = SubstitutionMap::for_class(
			&hierarchy.registry,
			hierarchy.pair,
			&[TypeRef::string(), TypeRef::boxed(ScalarKind::Int)],
		)
		.unwrap();

		// Assert
		assert_eq!(map.get("A"), Some(&TypeRef::string()));
		assert_eq!(map.get("B"), Some(&TypeRef::boxed(ScalarKind::Int)));
		assert!(map.extra().is_empty());
	}

	#[rstest]
	fn test_missing_type_arguments_is_error(hierarchy: Hierarchy) {
		// Act
		let result =
			SubstitutionMap::for_class(&hierarchy.registry, hierarchy.pair, &[TypeRef::string()]);

		// Assert
		assert!(matches!(
			result,
			Err(FactoryError::MissingTypeArguments { ref class, found: 1, .. }) if class == "Pair"
		));
	}

	#[rstest]
	fn test_surplus_arguments_become_extra(hierarchy: Hierarchy) {
		let map = SubstitutionMap::for_class(
			&hierarchy.registry,
			hierarchy.base,
			&[TypeRef::string(), TypeRef::object()],
		)
		.unwrap();

		assert_eq!(map.extra(), &[TypeRef::object()]);
	}

	#[rstest]
	fn test_ancestor_bindings_resolve_through_links(hierarchy: Hierarchy) {
		// Arrange
		let map = SubstitutionMap::for_class(&hierarchy.registry, hierarchy.leaf, &[]).unwrap();

		// Act
		let value = map.resolve(&hierarchy.registry, &TypeRef::param("E"));

		// Assert
		assert_eq!(value.class, builtin::LIST);
		assert_eq!(value.args, vec![TypeRef::string()]);
	}

	#[rstest]
	fn test_parent_parameter_bound_by_generic_child(hierarchy: Hierarchy) {
		// Arrange
		let map = SubstitutionMap::for_class(
			&hierarchy.registry,
			hierarchy.middle,
			&[TypeRef::boxed(ScalarKind::Long)],
		)
		.unwrap();

		// Act
		let closed = map.close(&hierarchy.registry, &TypeRef::param("E"));

		// Assert
		assert_eq!(closed, TypeRef::list_of(TypeRef::boxed(ScalarKind::Long)));
	}

	#[rstest]
	#[case(TypeRef::param("Missing"), TypeRef::object())]
	#[case(TypeRef::super_of(TypeRef::string()), TypeRef::string())]
	#[case(TypeRef::extends(TypeRef::boxed(ScalarKind::Int)), TypeRef::boxed(ScalarKind::Int))]
	#[case(TypeRef::unbounded(), TypeRef::object())]
	#[case(
		TypeRef::map_of(TypeRef::unbounded(), TypeRef::param("Missing")),
		TypeRef::map_of(TypeRef::object(), TypeRef::object())
	)]
	fn test_close_without_bindings(#[case] ty: TypeRef, #[case] expected: TypeRef) {
		let registry = TypeRegistry::new();

		let closed = SubstitutionMap::new().close(&registry, &ty);

		assert_eq!(closed, expected);
	}

	#[rstest]
	fn test_lower_bound_preferred_over_upper() {
		let registry = TypeRegistry::new();
		let ty = TypeRef::Wildcard {
			lower: vec![TypeRef::string()],
			upper: vec![TypeRef::object()],
		};

		let resolved = resolve(&registry, &ty, &SubstitutionMap::new());

		assert_eq!(resolved.class, builtin::STRING);
	}

	#[rstest]
	fn test_self_referential_link_closes_at_first_repeat() {
		// Arrange
		let registry = TypeRegistry::new();
		let mut map = SubstitutionMap::new();
		map.bind("U", TypeRef::list_of(TypeRef::param("U")));

		// Act
		let closed = map.close(&registry, &TypeRef::param("U"));

		// Assert
		assert_eq!(closed, TypeRef::list_of(TypeRef::object()));
	}

	#[rstest]
	fn test_mutual_links_close_at_first_repeat() {
		// Arrange
		let registry = TypeRegistry::new();
		let mut map = SubstitutionMap::new();
		map.bind("A", TypeRef::list_of(TypeRef::param("B")));
		map.bind("B", TypeRef::set_of(TypeRef::param("A")));

		// Act
		let closed = map.close(&registry, &TypeRef::param("A"));

		// Assert
		assert_eq!(closed, TypeRef::list_of(TypeRef::set_of(TypeRef::object())));
	}

	#[rstest]
	fn test_repeated_parameter_outside_its_own_expansion_is_bound() {
		// Arrange
		let registry = TypeRegistry::new();
		let mut map = SubstitutionMap::new();
		map.bind("K", TypeRef::string());
		map.bind("E", TypeRef::map_of(TypeRef::param("K"), TypeRef::param("K")));

		// Act
		let closed = map.close(&registry, &TypeRef::param("E"));

		// Assert
		assert_eq!(closed, TypeRef::map_of(TypeRef::string(), TypeRef::string()));
	}

	#[rstest]
	fn test_raw_generic_object_adopts_extra_arguments(hierarchy: Hierarchy) {
		// Arrange
		let map = SubstitutionMap::for_class(
			&hierarchy.registry,
			hierarchy.leaf,
			&[TypeRef::string(), TypeRef::boxed(ScalarKind::Int)],
		)
		.unwrap();

		// Act
		let closed = map.close(&hierarchy.registry, &TypeRef::class(hierarchy.pair));
		let raw_list = map.close(&hierarchy.registry, &TypeRef::class(builtin::LIST));

		// Assert
		assert_eq!(
			closed,
			TypeRef::generic(
				hierarchy.pair,
				vec![TypeRef::string(), TypeRef::boxed(ScalarKind::Int)]
			)
		);
		assert_eq!(raw_list, TypeRef::class(builtin::LIST));
	}
}
