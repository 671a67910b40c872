//! Manufacture orchestration.
//!
//! [`Factory`] is the long-lived, shareable entry point. Every top-level call
//! opens a [`Manufacturer`] session owning the call-scoped [`DepthLedger`];
//! the session dispatches each requested type by category and recurses back
//! into itself for nested attributes, parameters and elements. The session's
//! behaviour is split across the `builder`, `populator`, `filler` and `scalar`
//! modules.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use facsimile_types::{
	ClassId, ClassIntrospector, ClassKind, ConventionIntrospector, Directive, DirectiveTag,
	TypeRef, TypeRegistry, Value, ValueStrategy, builtin,
};
use tracing::{debug, error, info, warn};

use crate::error::{FactoryError, FactoryResult};
use crate::ledger::DepthLedger;
use crate::provider::{
	AttributeMetadata, ExternalFactory, MemoKey, NullExternalFactory, RandomValueProvider,
	ValueProvider,
};
use crate::resolver::SubstitutionMap;

/// Builds fully populated instances of registered classes.
///
/// A factory is immutable once built and can serve concurrent callers; all
/// per-call state lives in a session created for each call.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use facsimile_factory::Factory;
/// use facsimile_types::{ScalarKind, TypeRef, TypeRegistry};
///
/// let mut registry = TypeRegistry::new();
/// let person = registry
///     .class("Person")
///     .unwrap()
///     .field("name", TypeRef::string())
///     .field("age", TypeRef::primitive(ScalarKind::Int))
///     .default_constructor()
///     .build()
///     .unwrap();
///
/// let factory = Factory::new(Arc::new(registry));
/// let value = factory.manufacture(person, &[]).unwrap();
/// let object = value.as_object().unwrap();
/// assert_eq!(object.get("name").as_str().map(str::len), Some(10));
/// assert!(object.get("age").as_int().is_some_and(|age| age != 0));
/// ```
pub struct Factory {
	registry: Arc<TypeRegistry>,
	provider: Arc<dyn ValueProvider>,
	introspector: Arc<dyn ClassIntrospector>,
	external: Arc<dyn ExternalFactory>,
}

impl fmt::Debug for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Factory")
			.field("classes", &self.registry.len())
			.finish_non_exhaustive()
	}
}

/// Builder for [`Factory`].
pub struct FactoryBuilder {
	registry: Arc<TypeRegistry>,
	provider: Option<Arc<dyn ValueProvider>>,
	introspector: Option<Arc<dyn ClassIntrospector>>,
	external: Option<Arc<dyn ExternalFactory>>,
}

impl FactoryBuilder {
	pub fn provider(self, provider: impl ValueProvider + 'static) -> Self {
		self.shared_provider(Arc::new(provider))
	}

	/// Uses a provider the caller keeps a handle to.
	pub fn shared_provider(mut self, provider: Arc<dyn ValueProvider>) -> Self {
		self.provider = Some(provider);
		self
	}

	pub fn introspector(mut self, introspector: impl ClassIntrospector + 'static) -> Self {
		self.introspector = Some(Arc::new(introspector));
		self
	}

	pub fn external(self, external: impl ExternalFactory + 'static) -> Self {
		self.shared_external(Arc::new(external))
	}

	/// Uses an external factory the caller keeps a handle to.
	pub fn shared_external(mut self, external: Arc<dyn ExternalFactory>) -> Self {
		self.external = Some(external);
		self
	}

	pub fn build(self) -> Factory {
		Factory {
			registry: self.registry,
			provider: self
				.provider
				.unwrap_or_else(|| Arc::new(RandomValueProvider::default())),
			introspector: self
				.introspector
				.unwrap_or_else(|| Arc::new(ConventionIntrospector::default())),
			external: self
				.external
				.unwrap_or_else(|| Arc::new(NullExternalFactory)),
		}
	}
}

impl Factory {
	/// Creates a factory with the default collaborators.
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		Self::builder(registry).build()
	}

	pub fn builder(registry: Arc<TypeRegistry>) -> FactoryBuilder {
		FactoryBuilder {
			registry,
			provider: None,
			introspector: None,
			external: None,
		}
	}

	pub fn registry(&self) -> &TypeRegistry {
		&self.registry
	}

	pub fn provider(&self) -> &dyn ValueProvider {
		self.provider.as_ref()
	}

	/// Manufactures an instance of `class` with the given type arguments.
	pub fn manufacture(&self, class: ClassId, type_args: &[TypeRef]) -> FactoryResult<Value> {
		self.manufacture_type(&TypeRef::generic(class, type_args.to_vec()))
	}

	/// Manufactures a value of any type reference.
	pub fn manufacture_type(&self, ty: &TypeRef) -> FactoryResult<Value> {
		Manufacturer::new(self)
			.manufacture_root(ty)
			.map_err(|e| self.wrap(ty, e))
	}

	/// Populates an existing instance in place and returns it.
	pub fn populate(&self, instance: &Value, type_args: &[TypeRef]) -> FactoryResult<Value> {
		let Some(class) = instance.runtime_class() else {
			return Ok(Value::Null);
		};
		let session = Manufacturer::new(self);
		let _guard = session.ledger.enter(class);
		session
			.populate_instance(instance, type_args)
			.map_err(|e| self.wrap(&TypeRef::generic(class, type_args.to_vec()), e))?;
		Ok(instance.clone())
	}

	fn wrap(&self, target: &TypeRef, source: FactoryError) -> FactoryError {
		let target = self.registry.display(target);
		error!("Failed to manufacture {}: {}", target, source);
		FactoryError::Manufacture {
			target,
			source: Box::new(source),
		}
	}
}

/// Where a value is manufactured for.
#[derive(Debug, Clone, Default)]
pub(crate) struct Slot<'a> {
	pub(crate) name: Option<&'a str>,
	pub(crate) directives: &'a [Directive],
	pub(crate) owner: Option<ClassId>,
	/// Value currently held by the attribute, read before it is replaced.
	pub(crate) current: Option<Value>,
}

/// State of one top-level manufacture call.
pub(crate) struct Manufacturer<'f> {
	factory: &'f Factory,
	pub(crate) ledger: DepthLedger,
	pub(crate) excluded: HashSet<DirectiveTag>,
}

impl<'f> Manufacturer<'f> {
	pub(crate) fn new(factory: &'f Factory) -> Self {
		Self {
			factory,
			ledger: DepthLedger::new(),
			excluded: factory.provider.excluded_directives(),
		}
	}

	pub(crate) fn registry(&self) -> &'f TypeRegistry {
		&self.factory.registry
	}

	pub(crate) fn provider(&self) -> &'f dyn ValueProvider {
		self.factory.provider.as_ref()
	}

	pub(crate) fn introspector(&self) -> &'f dyn ClassIntrospector {
		self.factory.introspector.as_ref()
	}

	pub(crate) fn external(&self) -> &'f dyn ExternalFactory {
		self.factory.external.as_ref()
	}

	fn manufacture_root(&self, ty: &TypeRef) -> FactoryResult<Value> {
		let registry = self.registry();
		let resolved = SubstitutionMap::new().resolve(registry, ty);
		if registry.get(resolved.class)?.kind.is_object_like() {
			let _guard = self.ledger.enter(resolved.class);
			self.manufacture_object(resolved.class, &resolved.args)
		} else {
			self.manufacture_value(&resolved.type_ref(), &Slot::default())
		}
	}

	/// Manufactures a value of `ty`, dispatching on the category of its class.
	pub(crate) fn manufacture_value(&self, ty: &TypeRef, slot: &Slot<'_>) -> FactoryResult<Value> {
		let registry = self.registry();
		let resolved = SubstitutionMap::new().resolve(registry, ty);
		let def = registry.get(resolved.class)?;
		let meta = AttributeMetadata {
			name: slot.name,
			class: resolved.class,
			type_args: &resolved.args,
			directives: slot.directives,
			owner: slot.owner,
		};

		match &def.kind {
			ClassKind::Scalar { kind, .. } => self.scalar_value(*kind, &def.name, &meta),
			ClassKind::String => self.string_value(&meta),
			ClassKind::Enum { constants } => self.enum_value(constants, &meta),
			ClassKind::Array => self.array_value(&resolved, slot),
			ClassKind::Collection(kind) => self.collection_value(&resolved, *kind, slot),
			ClassKind::Map(kind) => self.map_value(&resolved, *kind, slot),
			ClassKind::TypeToken => Ok(Value::Type(
				resolved
					.args
					.first()
					.and_then(TypeRef::class_id)
					.unwrap_or(builtin::OBJECT),
			)),
			ClassKind::Top | ClassKind::Interface | ClassKind::Abstract | ClassKind::Concrete => {
				self.descend(resolved.class, &resolved.args)
			}
		}
	}

	/// Recursive descent into an object class, bounded by the depth ledger.
	fn descend(&self, class: ClassId, args: &[TypeRef]) -> FactoryResult<Value> {
		let max_depth = self.provider().max_depth(class);
		let Some(_guard) = self.ledger.try_enter(class, max_depth) else {
			warn!(
				"Loop in {} production detected. Resorting to external factory",
				self.registry().name(class)
			);
			return Ok(self.external().manufacture(class, args));
		};
		self.manufacture_object(class, args)
	}

	/// Builds, memoizes and populates an instance of an object class.
	///
	/// For an abstract class or interface the provider's substitute is tried
	/// before any of the class's own constructors. Without a substitute an
	/// interface goes straight to the external factory, while an abstract
	/// class still tries its own constructors and factory methods.
	pub(crate) fn manufacture_object(
		&self,
		class: ClassId,
		args: &[TypeRef],
	) -> FactoryResult<Value> {
		let registry = self.registry();
		let provider = self.provider();
		let def = registry.get(class)?;
		debug!("Manufacturing {} with type arguments {:?}", def.name, args);

		let key = MemoKey::new(class, args);
		if provider.memoization_enabled()
			&& let Some(cached) = provider.memoized(&key)
		{
			debug!("Fetched memoized instance of {}", def.name);
			return Ok(cached);
		}

		if def.kind.is_abstract() {
			let substitute = provider.concrete_class(class);
			if substitute != class {
				debug!(
					"Manufacturing {} in place of {}",
					registry.name(substitute),
					def.name
				);
				return self.manufacture_object(substitute, args);
			}
			if def.kind == ClassKind::Interface {
				info!("{} is an interface. Resorting to external factory", def.name);
				return Ok(self.external().manufacture(class, args));
			}
		}

		let Some(instance) = self.build_instance(class, args)? else {
			info!("Failed to manufacture {}. Resorting to external factory", def.name);
			return Ok(self.external().manufacture(class, args));
		};

		if provider.memoization_enabled() {
			provider.memoize(key, instance.clone());
		}
		self.populate_instance(&instance, args)?;
		Ok(instance)
	}

	/// Takes a value from a strategy, checking it fits `target`.
	pub(crate) fn strategy_value(
		&self,
		target: ClassId,
		strategy: &dyn ValueStrategy,
	) -> FactoryResult<Value> {
		let registry = self.registry();
		let value = strategy.value();
		if registry.is_assignable(target, &value) {
			return Ok(value);
		}
		let actual = value
			.runtime_class()
			.map_or_else(|| "null".to_string(), |class| registry.name(class).to_string());
		error!(
			"The strategy {:?} produced a {} which is not assignable to {}",
			strategy,
			actual,
			registry.name(target)
		);
		Err(FactoryError::IncompatibleStrategyValue {
			target: registry.name(target).to_string(),
			actual,
		})
	}
}
