//! In-place population of an instance graph.
//!
//! Population runs in three passes over what the introspector reports:
//! writable attributes, then read-only attributes holding live values, then
//! the registered extra methods.

use facsimile_types::{
	AttributeDescriptor, ClassId, DirectiveSet, TypeRef, TypeRegistry, Value, builtin,
};
use tracing::{debug, error, warn};

use crate::error::{FactoryError, FactoryResult};
use crate::factory::{Manufacturer, Slot};
use crate::resolver::SubstitutionMap;

impl Manufacturer<'_> {
	/// Populates `instance` in place.
	///
	/// The substitution map for the instance's class is only built when an
	/// attribute or extra method refers to a type parameter, so a generic
	/// instance with closed attributes can be populated without arguments.
	pub(crate) fn populate_instance(
		&self,
		instance: &Value,
		args: &[TypeRef],
	) -> FactoryResult<()> {
		match instance {
			Value::Collection(collection) if collection.is_empty() => {
				self.fill_collection_in_place(collection, args)?;
			}
			Value::Map(map) if map.is_empty() => self.fill_map_in_place(map, args)?,
			_ => {}
		}

		let Some(class) = instance.runtime_class().filter(|_| instance.is_populatable()) else {
			return Ok(());
		};
		let registry = self.registry();
		let attributes = self.introspector().attributes(registry, class);
		let mut bindings = None;

		for attribute in attributes.iter().filter(|a| a.is_writable()) {
			if self.is_excluded(class, attribute) {
				continue;
			}
			self.populate_writable(instance, class, attribute, &mut bindings, args)?;
		}

		for attribute in attributes.iter().filter(|a| a.is_read_only()) {
			if self.is_excluded(class, attribute) {
				continue;
			}
			self.populate_read_only(instance, class, attribute, &mut bindings, args)?;
		}

		for method in self.introspector().extra_methods(registry, class) {
			let map = self.bindings(&mut bindings, class, args)?;
			let params = self.parameter_values(&method.params, map, class)?;
			debug!("Invoking extra method {} of {}", method.name, registry.name(class));
			method.invoke(instance, params).map_err(|source| {
				let member = format!("{}.{}", registry.name(class), method.name);
				error!("Extra method {} failed: {}", member, source);
				FactoryError::Invocation { member, source }
			})?;
		}

		Ok(())
	}

	fn populate_writable(
		&self,
		instance: &Value,
		class: ClassId,
		attribute: &AttributeDescriptor,
		bindings: &mut Option<SubstitutionMap>,
		args: &[TypeRef],
	) -> FactoryResult<()> {
		let registry = self.registry();
		let Some(setter) = &attribute.setter else {
			return Ok(());
		};
		if setter.arity() != 1 {
			warn!(
				"Write accessor of {}.{} takes {} arguments. Skipping it",
				registry.name(class),
				attribute.name,
				setter.arity()
			);
			return Ok(());
		}

		let value = if let Some(strategy) = attribute.directives.strategy() {
			let target = self.attribute_type(bindings, class, args, &attribute.ty)?;
			debug!("Using strategy {:?} for {}", strategy, attribute.name);
			self.strategy_value(target.class_id().unwrap_or(builtin::OBJECT), strategy.as_ref())?
		} else {
			let ty = self.attribute_type(bindings, class, args, &attribute.ty)?;
			let current = attribute
				.getter
				.as_ref()
				.filter(|getter| getter.arity() == 0)
				.and_then(|getter| getter.invoke(instance).ok())
				.filter(|value| !value.is_null());
			self.manufacture_value(
				&ty,
				&Slot {
					name: Some(&attribute.name),
					directives: &attribute.directives,
					owner: Some(class),
					current,
				},
			)?
		};

		if value.is_null() {
			warn!(
				"Couldn't find a value for {}.{}. It will be left unset",
				registry.name(class),
				attribute.name
			);
			return Ok(());
		}

		setter.invoke(instance, value).map_err(|source| {
			let member = format!("{}.{}", registry.name(class), attribute.name);
			error!("Write accessor {} failed: {}", member, source);
			FactoryError::Invocation { member, source }
		})
	}

	fn populate_read_only(
		&self,
		instance: &Value,
		class: ClassId,
		attribute: &AttributeDescriptor,
		bindings: &mut Option<SubstitutionMap>,
		args: &[TypeRef],
	) -> FactoryResult<()> {
		let registry = self.registry();
		let Some(getter) = &attribute.getter else {
			return Ok(());
		};
		if getter.arity() != 0 {
			warn!(
				"Read accessor of {}.{} takes {} arguments. Skipping it",
				registry.name(class),
				attribute.name,
				getter.arity()
			);
			return Ok(());
		}
		if is_primitive(registry, &attribute.ty) {
			return Ok(());
		}

		let current = match getter.invoke(instance) {
			Ok(value) => value,
			Err(e) => {
				debug!("Cannot read {}.{}: {}", registry.name(class), attribute.name, e);
				return Ok(());
			}
		};
		let Some(runtime) = current.runtime_class().filter(|_| current.is_populatable()) else {
			return Ok(());
		};

		let ty = self.attribute_type(bindings, class, args, &attribute.ty)?;
		let mut nested_args = ty.args().to_vec();
		let expected = registry.get(runtime)?.type_params.len();
		if nested_args.len() < expected {
			warn!(
				"Missing type arguments for read-only {}.{}. Will use Object instead",
				registry.name(class),
				attribute.name
			);
			nested_args.resize(expected, TypeRef::object());
		}

		let max_depth = self.provider().max_depth(runtime);
		let Some(_guard) = self.ledger.try_enter(runtime, max_depth) else {
			warn!(
				"Loop in filling read-only field {}.{} detected",
				registry.name(class),
				attribute.name
			);
			return Ok(());
		};
		debug!("Populating read-only {}.{}", registry.name(class), attribute.name);
		self.populate_instance(&current, &nested_args)
	}

	fn is_excluded(&self, class: ClassId, attribute: &AttributeDescriptor) -> bool {
		let excluded = attribute.directives.has_tag_in(&self.excluded);
		if excluded {
			debug!(
				"Skipping excluded attribute {}.{}",
				self.registry().name(class),
				attribute.name
			);
		}
		excluded
	}

	/// The declared type of an attribute with the instance's bindings applied.
	fn attribute_type(
		&self,
		bindings: &mut Option<SubstitutionMap>,
		class: ClassId,
		args: &[TypeRef],
		declared: &TypeRef,
	) -> FactoryResult<TypeRef> {
		let registry = self.registry();
		if !needs_bindings(registry, declared) {
			return Ok(declared.clone());
		}
		Ok(self.bindings(bindings, class, args)?.close(registry, declared))
	}

	fn bindings<'m>(
		&self,
		cache: &'m mut Option<SubstitutionMap>,
		class: ClassId,
		args: &[TypeRef],
	) -> FactoryResult<&'m SubstitutionMap> {
		let map = match cache.take() {
			Some(map) => map,
			None => {
				let map = SubstitutionMap::for_class(self.registry(), class, args)?;
				if !map.extra().is_empty() {
					debug!(
						"{} carries {} extra type arguments for raw generic attributes",
						self.registry().name(class),
						map.extra().len()
					);
				}
				map
			}
		};
		Ok(cache.insert(map))
	}
}

/// Returns true if `ty` mentions a type parameter, a wildcard or a raw
/// reference to a generic object class.
fn needs_bindings(registry: &TypeRegistry, ty: &TypeRef) -> bool {
	match ty {
		TypeRef::Class { class, args } if args.is_empty() => registry
			.get(*class)
			.is_ok_and(|def| !def.type_params.is_empty() && def.kind.is_object_like()),
		TypeRef::Class { args, .. } => args.iter().any(|arg| needs_bindings(registry, arg)),
		TypeRef::Param(_) | TypeRef::Wildcard { .. } => true,
	}
}

fn is_primitive(registry: &TypeRegistry, ty: &TypeRef) -> bool {
	ty.class_id()
		.and_then(|class| registry.get(class).ok())
		.is_some_and(|def| def.kind.is_primitive())
}
