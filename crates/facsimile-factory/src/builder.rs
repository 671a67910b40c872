//! Instance construction: choosing and invoking a constructor or factory.

use facsimile_types::{ClassId, Constructor, DirectiveSet, FactoryMethod, Parameter, TypeRef, Value};
use tracing::debug;

use crate::error::FactoryResult;
use crate::factory::{Manufacturer, Slot};
use crate::resolver::SubstitutionMap;

impl Manufacturer<'_> {
	/// Builds an unpopulated instance of `class`.
	///
	/// Abstract and constructor-less classes try their static factories first,
	/// then every declared constructor including non-public ones. Otherwise
	/// the public constructors are tried in provider order. A failing
	/// candidate is logged and skipped; `None` means every candidate failed.
	pub(crate) fn build_instance(
		&self,
		class: ClassId,
		args: &[TypeRef],
	) -> FactoryResult<Option<Value>> {
		let registry = self.registry();
		let def = registry.get(class)?;
		let map = SubstitutionMap::for_class(registry, class, args)?;

		let mut constructors: Vec<Constructor> = def
			.constructors
			.iter()
			.filter(|c| c.is_public())
			.cloned()
			.collect();

		if constructors.is_empty() || def.kind.is_abstract() {
			if let Some(instance) = self.try_factories(class, &def.factories, &map)? {
				return Ok(Some(instance));
			}
			constructors = def.constructors.clone();
		}

		self.provider().order_constructors(&mut constructors);

		for constructor in &constructors {
			let params = self.parameter_values(&constructor.params, &map, class)?;
			match constructor.invoke(params) {
				Ok(Value::Null) => {
					debug!("Constructor of {} returned null. Will try another one", def.name);
				}
				Ok(instance) => return Ok(Some(instance)),
				Err(e) => {
					debug!(
						"Couldn't create {} with constructor {:?}: {}. Will try another one",
						def.name, constructor, e
					);
				}
			}
		}

		debug!("Couldn't find a suitable constructor for {}", def.name);
		Ok(None)
	}

	fn try_factories(
		&self,
		class: ClassId,
		factories: &[FactoryMethod],
		map: &SubstitutionMap,
	) -> FactoryResult<Option<Value>> {
		let mut candidates: Vec<FactoryMethod> = factories
			.iter()
			.filter(|f| f.is_static && f.returns == class)
			.cloned()
			.collect();
		self.provider().order_factories(&mut candidates);

		for factory in &candidates {
			let params = self.parameter_values(&factory.params, map, class)?;
			match factory.invoke(params) {
				Ok(Value::Null) => {
					debug!("Factory method {} returned null. Will try another one", factory.name);
				}
				Ok(instance) => {
					debug!(
						"Created {} with factory method {}",
						self.registry().name(class),
						factory.name
					);
					return Ok(Some(instance));
				}
				Err(e) => {
					debug!(
						"Couldn't create {} with factory method {}: {}. Will try another one",
						self.registry().name(class),
						factory.name,
						e
					);
				}
			}
		}
		Ok(None)
	}

	/// Manufactures arguments for a constructor, factory or method.
	pub(crate) fn parameter_values(
		&self,
		params: &[Parameter],
		map: &SubstitutionMap,
		owner: ClassId,
	) -> FactoryResult<Vec<Value>> {
		params
			.iter()
			.map(|param| self.parameter_value(param, map, owner))
			.collect()
	}

	fn parameter_value(
		&self,
		param: &Parameter,
		map: &SubstitutionMap,
		owner: ClassId,
	) -> FactoryResult<Value> {
		let registry = self.registry();
		if let Some(strategy) = param.directives.strategy() {
			let target = map.resolve(registry, &param.ty).class;
			return self.strategy_value(target, strategy.as_ref());
		}
		let ty = map.close(registry, &param.ty);
		self.manufacture_value(
			&ty,
			&Slot {
				name: None,
				directives: &param.directives,
				owner: Some(owner),
				current: None,
			},
		)
	}
}
