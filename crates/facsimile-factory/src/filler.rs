//! Container filling: arrays, collections and maps.
//!
//! A container is brought to its target element count by truncating surplus
//! elements or appending manufactured ones; elements already present below
//! the target are kept. Immutable containers are left untouched.

use std::sync::Arc;

use facsimile_types::{
	ArrayValue, ClassId, CollectionKind, CollectionRef, Directive, DirectiveSet, MapKind, MapRef,
	TypeRef, Value, ValueStrategy, builtin,
};
use tracing::{debug, error, warn};

use crate::error::{FactoryError, FactoryResult};
use crate::factory::{Manufacturer, Slot};
use crate::resolver::{ResolvedType, SubstitutionMap};

/// Extra attempts granted to a set or map whose manufactured elements collide.
const MAX_DUPLICATE_RETRIES: usize = 10;

/// Where the elements of one container come from.
struct ElementSource<'a> {
	ty: TypeRef,
	strategy: Option<&'a Arc<dyn ValueStrategy>>,
}

impl Manufacturer<'_> {
	/// A new array of the configured length.
	pub(crate) fn array_value(
		&self,
		resolved: &ResolvedType,
		slot: &Slot<'_>,
	) -> FactoryResult<Value> {
		let component = self.element_types(resolved, 1).swap_remove(0);
		let component_class = class_of(&component);
		let settings = slot.directives.collection();
		let count = settings.map_or_else(
			|| self.provider().element_count(component_class),
			|s| s.count,
		);
		let source = ElementSource {
			ty: component,
			strategy: settings.and_then(|s| s.element.as_ref()),
		};
		let directives = slot.directives.without_collection();

		let items = (0..count)
			.map(|_| self.element_value(&source, &directives, slot))
			.collect::<FactoryResult<Vec<_>>>()?;
		Ok(Value::Array(ArrayValue {
			component: component_class,
			items,
		}))
	}

	/// A filled collection, reusing the attribute's current one when mutable.
	pub(crate) fn collection_value(
		&self,
		resolved: &ResolvedType,
		kind: CollectionKind,
		slot: &Slot<'_>,
	) -> FactoryResult<Value> {
		let element = self.element_types(resolved, 1).swap_remove(0);
		let collection = self.collection_instance(resolved, kind, slot)?;
		self.fill_collection(&collection, element, slot)?;
		Ok(Value::Collection(collection))
	}

	/// A filled map, reusing the attribute's current one when mutable.
	pub(crate) fn map_value(
		&self,
		resolved: &ResolvedType,
		kind: MapKind,
		slot: &Slot<'_>,
	) -> FactoryResult<Value> {
		let [key, value] = self.entry_types(resolved)?;
		let map = self.map_instance(resolved, kind, slot)?;
		self.fill_map(&map, key, value, slot)?;
		Ok(Value::Map(map))
	}

	/// Fills an existing, empty-or-not collection of the runtime class.
	pub(crate) fn fill_collection_in_place(
		&self,
		collection: &CollectionRef,
		args: &[TypeRef],
	) -> FactoryResult<()> {
		let resolved = ResolvedType {
			class: collection.class(),
			args: args.to_vec(),
		};
		let element = self.element_types(&resolved, 1).swap_remove(0);
		self.fill_collection(collection, element, &Slot::default())
	}

	/// Fills an existing map of the runtime class.
	pub(crate) fn fill_map_in_place(&self, map: &MapRef, args: &[TypeRef]) -> FactoryResult<()> {
		let resolved = ResolvedType {
			class: map.class(),
			args: args.to_vec(),
		};
		let [key, value] = self.entry_types(&resolved)?;
		self.fill_map(map, key, value, &Slot::default())
	}

	/// Closed element types of a container, padded with the top type.
	fn element_types(&self, resolved: &ResolvedType, expected: usize) -> Vec<TypeRef> {
		let registry = self.registry();
		let closer = SubstitutionMap::new();
		let mut types: Vec<TypeRef> = registry
			.element_types(resolved.class, &resolved.args)
			.iter()
			.map(|ty| closer.close(registry, ty))
			.collect();
		if types.len() < expected {
			warn!(
				"Could not determine element types of {}. Will use Object instead",
				registry.name(resolved.class)
			);
			types.resize(expected, TypeRef::object());
		}
		types
	}

	fn entry_types(&self, resolved: &ResolvedType) -> FactoryResult<[TypeRef; 2]> {
		let registry = self.registry();
		let found = registry.element_types(resolved.class, &resolved.args).len();
		if found != 0 && found != 2 {
			error!(
				"Map {} has {} type arguments instead of key and value",
				registry.name(resolved.class),
				found
			);
			return Err(FactoryError::MapTypeArguments {
				class: registry.name(resolved.class).to_string(),
				found,
			});
		}
		let mut types = self.element_types(resolved, 2).into_iter();
		let key = types.next().unwrap_or_else(TypeRef::object);
		let value = types.next().unwrap_or_else(TypeRef::object);
		Ok([key, value])
	}

	fn collection_instance(
		&self,
		resolved: &ResolvedType,
		kind: CollectionKind,
		slot: &Slot<'_>,
	) -> FactoryResult<CollectionRef> {
		let Some(Value::Collection(current)) = &slot.current else {
			return self.new_collection(resolved, kind);
		};
		if !current.is_immutable() {
			debug!(
				"Reusing the current {} of the attribute",
				self.registry().name(current.class())
			);
			return Ok(current.clone());
		}

		debug!(
			"The current {} is immutable. Copying it into a new container",
			self.registry().name(current.class())
		);
		let fresh = self.new_collection(resolved, kind)?;
		for item in current.items() {
			if let Err(e) = fresh.push(item) {
				warn!("Could not copy an element into a new container: {}", e);
				break;
			}
		}
		Ok(fresh)
	}

	fn new_collection(
		&self,
		resolved: &ResolvedType,
		kind: CollectionKind,
	) -> FactoryResult<CollectionRef> {
		if self.is_user_container(resolved, kind.is_abstract())?
			&& let Some(Value::Collection(instance)) =
				self.build_instance(resolved.class, &resolved.args)?
		{
			return Ok(instance);
		}
		let implementation = kind.default_implementation();
		Ok(CollectionRef::new(
			builtin::collection_class(implementation),
			implementation.flavour(),
		))
	}

	fn map_instance(
		&self,
		resolved: &ResolvedType,
		kind: MapKind,
		slot: &Slot<'_>,
	) -> FactoryResult<MapRef> {
		let Some(Value::Map(current)) = &slot.current else {
			return self.new_map(resolved, kind);
		};
		if !current.is_immutable() {
			debug!(
				"Reusing the current {} of the attribute",
				self.registry().name(current.class())
			);
			return Ok(current.clone());
		}

		debug!(
			"The current {} is immutable. Copying it into a new map",
			self.registry().name(current.class())
		);
		let fresh = self.new_map(resolved, kind)?;
		for (key, value) in current.entries() {
			if let Err(e) = fresh.insert(key, value) {
				debug!("Skipped an entry while copying a map: {}", e);
			}
		}
		Ok(fresh)
	}

	fn new_map(&self, resolved: &ResolvedType, kind: MapKind) -> FactoryResult<MapRef> {
		if self.is_user_container(resolved, kind.is_abstract())?
			&& let Some(Value::Map(instance)) = self.build_instance(resolved.class, &resolved.args)?
		{
			return Ok(instance);
		}
		let implementation = kind.default_implementation();
		Ok(MapRef::new(
			builtin::map_class(implementation),
			implementation.flavour(),
		))
	}

	/// Returns true for a concrete, user-defined container class that can be
	/// constructed with the arguments at hand.
	fn is_user_container(&self, resolved: &ResolvedType, is_abstract: bool) -> FactoryResult<bool> {
		let registry = self.registry();
		if is_abstract || registry.is_builtin(resolved.class) {
			return Ok(false);
		}
		let def = registry.get(resolved.class)?;
		Ok(def.type_params.len() <= resolved.args.len())
	}

	fn fill_collection(
		&self,
		collection: &CollectionRef,
		element: TypeRef,
		slot: &Slot<'_>,
	) -> FactoryResult<()> {
		let registry = self.registry();
		let settings = slot.directives.collection();
		let count =
			settings.map_or_else(|| self.provider().element_count(class_of(&element)), |s| s.count);

		if collection.is_immutable() {
			warn!(
				"Cannot fill immutable {}. It will be left as it is",
				registry.name(collection.class())
			);
			return Ok(());
		}
		if collection.len() > count
			&& let Err(e) = collection.truncate(count)
		{
			warn!("Could not truncate {}: {}", registry.name(collection.class()), e);
			return Ok(());
		}

		let source = ElementSource {
			ty: element,
			strategy: settings.and_then(|s| s.element.as_ref()),
		};
		let directives = slot.directives.without_collection();
		let mut budget = count.saturating_sub(collection.len()) + MAX_DUPLICATE_RETRIES;

		while collection.len() < count && budget > 0 {
			budget -= 1;
			let value = self.element_value(&source, &directives, slot)?;
			match collection.push(value) {
				Ok(true) => {}
				Ok(false) => debug!(
					"Duplicate element discarded by {}",
					registry.name(collection.class())
				),
				Err(e) => {
					warn!("Could not add to {}: {}", registry.name(collection.class()), e);
					return Ok(());
				}
			}
		}
		Ok(())
	}

	fn fill_map(
		&self,
		map: &MapRef,
		key: TypeRef,
		value: TypeRef,
		slot: &Slot<'_>,
	) -> FactoryResult<()> {
		let registry = self.registry();
		let settings = slot.directives.collection();
		let count = settings.map_or_else(
			|| self.provider().element_count(class_of(&value)),
			|s| s.count,
		);

		if map.is_immutable() {
			warn!(
				"Cannot fill immutable {}. It will be left as it is",
				registry.name(map.class())
			);
			return Ok(());
		}
		if map.len() > count
			&& let Err(e) = map.truncate(count)
		{
			warn!("Could not truncate {}: {}", registry.name(map.class()), e);
			return Ok(());
		}

		let keys = ElementSource {
			ty: key,
			strategy: settings.and_then(|s| s.key.as_ref()),
		};
		let values = ElementSource {
			ty: value,
			strategy: settings.and_then(|s| s.value.as_ref()),
		};
		let directives = slot.directives.without_collection();
		let mut budget = count.saturating_sub(map.len()) + MAX_DUPLICATE_RETRIES;

		while map.len() < count && budget > 0 {
			budget -= 1;
			let key = self.element_value(&keys, &directives, slot)?;
			let value = self.element_value(&values, &directives, slot)?;
			if value.is_null() && !map.permits_null_values() {
				debug!(
					"{} does not permit null values. Skipping the entry",
					registry.name(map.class())
				);
				continue;
			}
			match map.insert(key, value) {
				Ok(None) => {}
				Ok(Some(_)) => debug!("Duplicate key replaced in {}", registry.name(map.class())),
				Err(e) => {
					warn!("Could not add to {}: {}", registry.name(map.class()), e);
					return Ok(());
				}
			}
		}
		Ok(())
	}

	fn element_value(
		&self,
		source: &ElementSource<'_>,
		directives: &[Directive],
		slot: &Slot<'_>,
	) -> FactoryResult<Value> {
		if let Some(strategy) = source.strategy {
			debug!("Using element strategy {:?}", strategy);
			return self.strategy_value(class_of(&source.ty), strategy.as_ref());
		}
		self.manufacture_value(
			&source.ty,
			&Slot {
				name: slot.name,
				directives,
				owner: slot.owner,
				current: None,
			},
		)
	}
}

fn class_of(ty: &TypeRef) -> ClassId {
	ty.class_id().unwrap_or(builtin::OBJECT)
}
