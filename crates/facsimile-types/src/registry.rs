//! The class arena and its fluent registration API.

use std::collections::{HashMap, HashSet};

use crate::builtin::{self, BUILTIN_COUNT};
use crate::class::{ClassDef, ClassId, ClassKind, FieldAccess, FieldDef, FieldInitializer};
use crate::error::{TypeError, TypeResult};
use crate::member::{Constructor, FactoryMethod, MethodDef, Parameter};
use crate::type_ref::TypeRef;
use crate::value::{ObjectRef, Value};

const MAX_HIERARCHY_DEPTH: usize = 64;

/// Arena of class definitions addressed by [`ClassId`].
///
/// Built-in classes occupy fixed ids (see [`builtin`]). User classes are
/// reserved by name first and defined later, so definitions may refer to each
/// other and to themselves.
#[derive(Debug)]
pub struct TypeRegistry {
	classes: Vec<ClassDef>,
	defined: Vec<bool>,
	by_name: HashMap<String, ClassId>,
}

impl Default for TypeRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl TypeRegistry {
	/// Creates a registry holding only the built-in classes.
	pub fn new() -> Self {
		let classes = builtin::definitions();
		let by_name = classes
			.iter()
			.enumerate()
			.map(|(i, def)| (def.name.clone(), ClassId(i as u32)))
			.collect();
		let defined = vec![true; classes.len()];
		Self {
			classes,
			defined,
			by_name,
		}
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Returns true for the fixed built-in ids.
	pub fn is_builtin(&self, id: ClassId) -> bool {
		id.0 < BUILTIN_COUNT
	}

	pub fn get(&self, id: ClassId) -> TypeResult<&ClassDef> {
		self.classes
			.get(id.index())
			.ok_or(TypeError::UnknownClass(id))
	}

	/// Name of a class, or `<unknown>` for a foreign id.
	pub fn name(&self, id: ClassId) -> &str {
		self.get(id).map(|def| def.name.as_str()).unwrap_or("<unknown>")
	}

	pub fn lookup(&self, name: &str) -> Option<ClassId> {
		self.by_name.get(name).copied()
	}

	/// Allocates an id for a class defined later with [`define`](Self::define).
	pub fn reserve(&mut self, name: impl Into<String>) -> TypeResult<ClassId> {
		let name = name.into();
		if self.by_name.contains_key(&name) {
			return Err(TypeError::DuplicateName(name));
		}
		let id = ClassId(self.classes.len() as u32);
		self.classes.push(ClassDef::new(name.clone(), ClassKind::Concrete));
		self.defined.push(false);
		self.by_name.insert(name, id);
		Ok(id)
	}

	/// Installs the definition of a reserved class. The reserved name is kept.
	pub fn define(&mut self, id: ClassId, mut def: ClassDef) -> TypeResult<()> {
		let index = id.index();
		match self.defined.get(index) {
			None => return Err(TypeError::UnknownClass(id)),
			Some(true) => return Err(TypeError::AlreadyDefined(self.name(id).to_string())),
			Some(false) => {}
		}
		def.name = self.classes[index].name.clone();
		self.classes[index] = def;
		self.defined[index] = true;
		Ok(())
	}

	/// Reserves and defines a class in one step.
	pub fn register(&mut self, def: ClassDef) -> TypeResult<ClassId> {
		let id = self.reserve(def.name.clone())?;
		self.define(id, def)?;
		Ok(id)
	}

	/// Starts a fluent definition of a new concrete class.
	pub fn class(&mut self, name: impl Into<String>) -> TypeResult<ClassBuilder<'_>> {
		let id = self.reserve(name)?;
		Ok(self.define_class(id))
	}

	/// Starts a fluent definition of a previously reserved class.
	pub fn define_class(&mut self, id: ClassId) -> ClassBuilder<'_> {
		let name = self.name(id).to_string();
		ClassBuilder {
			registry: self,
			id,
			def: ClassDef::new(name, ClassKind::Concrete),
			default_constructor: false,
			fields_constructor: false,
		}
	}

	/// The class followed by its superclass chain.
	pub fn ancestors(&self, class: ClassId) -> Vec<ClassId> {
		let mut chain = Vec::new();
		let mut current = Some(class);
		while let Some(id) = current {
			if chain.contains(&id) || chain.len() > MAX_HIERARCHY_DEPTH {
				break;
			}
			chain.push(id);
			current = self
				.get(id)
				.ok()
				.and_then(|def| def.superclass.as_ref())
				.and_then(TypeRef::class_id);
		}
		chain
	}

	/// Returns true if `sub` is `sup` or inherits from it through any path.
	pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
		if sub == sup || sup == builtin::OBJECT {
			return true;
		}
		let mut pending = vec![sub];
		let mut seen = HashSet::new();
		while let Some(current) = pending.pop() {
			if current == sup {
				return true;
			}
			if !seen.insert(current) {
				continue;
			}
			if let Ok(def) = self.get(current) {
				pending.extend(def.supertypes().filter_map(TypeRef::class_id));
			}
		}
		false
	}

	/// Returns true if `value` may be stored where `target` is expected.
	pub fn is_assignable(&self, target: ClassId, value: &Value) -> bool {
		let Ok(def) = self.get(target) else {
			return false;
		};
		match (&def.kind, value) {
			(kind, Value::Null) => !kind.is_primitive(),
			(ClassKind::Top, _) => true,
			(ClassKind::Scalar { kind, .. }, v) => v.scalar_kind() == Some(*kind),
			(ClassKind::String, v) => matches!(v, Value::Str(_)),
			(ClassKind::Array, v) => matches!(v, Value::Array(_)),
			(ClassKind::TypeToken, v) => matches!(v, Value::Type(_)),
			(_, v) => v
				.runtime_class()
				.is_some_and(|class| self.is_subclass(class, target)),
		}
	}

	/// Type arguments of the built-in container `class` derives from.
	///
	/// Walks the supertype declarations of `class`, substituting `args`, until
	/// a built-in collection, map or array is reached. Returns an empty list
	/// when no container ancestor exists or it is used raw.
	pub fn element_types(&self, class: ClassId, args: &[TypeRef]) -> Vec<TypeRef> {
		self.container_args(class, args, 0).unwrap_or_default()
	}

	fn container_args(
		&self,
		class: ClassId,
		args: &[TypeRef],
		depth: usize,
	) -> Option<Vec<TypeRef>> {
		if depth > MAX_HIERARCHY_DEPTH {
			return None;
		}
		let def = self.get(class).ok()?;
		let container = matches!(
			def.kind,
			ClassKind::Collection(_) | ClassKind::Map(_) | ClassKind::Array
		);
		if container && self.is_builtin(class) {
			return Some(args.to_vec());
		}
		let bindings: HashMap<String, TypeRef> = def
			.type_params
			.iter()
			.cloned()
			.zip(args.iter().cloned())
			.collect();
		def.supertypes().find_map(|sup| {
			let sup = sup.substitute(&bindings);
			let parent = sup.class_id()?;
			self.container_args(parent, sup.args(), depth + 1)
		})
	}

	/// Human-readable rendering of a type reference.
	pub fn display(&self, ty: &TypeRef) -> String {
		match ty {
			TypeRef::Class { class, args } if args.is_empty() => self.name(*class).to_string(),
			TypeRef::Class { class, args } => {
				let rendered: Vec<String> = args.iter().map(|a| self.display(a)).collect();
				format!("{}<{}>", self.name(*class), rendered.join(", "))
			}
			TypeRef::Param(name) => name.clone(),
			TypeRef::Wildcard { lower, upper } => match (lower.first(), upper.first()) {
				(Some(bound), _) => format!("? super {}", self.display(bound)),
				(None, Some(bound)) => format!("? extends {}", self.display(bound)),
				(None, None) => "?".to_string(),
			},
		}
	}

	/// Field initializers of a class and its superclasses, most-derived first.
	fn initializers(&self, class: ClassId) -> Vec<(String, FieldInitializer)> {
		let mut inits = Vec::new();
		for ancestor in self.ancestors(class) {
			if let Ok(def) = self.get(ancestor) {
				collect_initializers(&def.fields, &mut inits);
			}
		}
		inits
	}
}

fn collect_initializers(fields: &[FieldDef], into: &mut Vec<(String, FieldInitializer)>) {
	for field in fields {
		if let Some(init) = &field.initializer
			&& !into.iter().any(|(name, _)| *name == field.name)
		{
			into.push((field.name.clone(), init.clone()));
		}
	}
}

fn instantiate(class: ClassId, inits: &[(String, FieldInitializer)]) -> ObjectRef {
	ObjectRef::with_fields(class, inits.iter().map(|(name, init)| (name.clone(), init())))
}

/// Fluent definition of a class, installed by [`build`](Self::build).
pub struct ClassBuilder<'r> {
	registry: &'r mut TypeRegistry,
	id: ClassId,
	def: ClassDef,
	default_constructor: bool,
	fields_constructor: bool,
}

impl<'r> ClassBuilder<'r> {
	/// Id of the class under construction, for self-references.
	pub fn id(&self) -> ClassId {
		self.id
	}

	pub fn kind(mut self, kind: ClassKind) -> Self {
		self.def.kind = kind;
		self
	}

	pub fn interface(self) -> Self {
		self.kind(ClassKind::Interface)
	}

	pub fn abstract_class(self) -> Self {
		self.kind(ClassKind::Abstract)
	}

	pub fn enumeration<I, S>(self, constants: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let constants = constants.into_iter().map(Into::into).collect();
		self.kind(ClassKind::Enum { constants })
	}

	pub fn type_param(mut self, name: impl Into<String>) -> Self {
		self.def.type_params.push(name.into());
		self
	}

	pub fn extends(mut self, superclass: TypeRef) -> Self {
		self.def.superclass = Some(superclass);
		self
	}

	pub fn implements(mut self, interface: TypeRef) -> Self {
		self.def.interfaces.push(interface);
		self
	}

	/// Declares a read-write field.
	pub fn field(self, name: impl Into<String>, ty: TypeRef) -> Self {
		self.field_with(FieldDef::new(name, ty))
	}

	pub fn field_with(mut self, field: FieldDef) -> Self {
		self.def.fields.push(field);
		self
	}

	/// Declares a read-only field whose value is set at construction.
	pub fn read_only<F>(self, name: impl Into<String>, ty: TypeRef, initial: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.field_with(
			FieldDef::new(name, ty)
				.with_access(FieldAccess::ReadOnly)
				.with_initializer(initial),
		)
	}

	/// Adds a public no-argument constructor that applies field initializers.
	pub fn default_constructor(mut self) -> Self {
		self.default_constructor = true;
		self
	}

	/// Adds a public constructor taking every declared field in order.
	pub fn fields_constructor(mut self) -> Self {
		self.fields_constructor = true;
		self
	}

	pub fn constructor(mut self, constructor: Constructor) -> Self {
		self.def.constructors.push(constructor);
		self
	}

	pub fn factory(mut self, factory: FactoryMethod) -> Self {
		self.def.factories.push(factory);
		self
	}

	pub fn method(mut self, method: MethodDef) -> Self {
		self.def.methods.push(method);
		self
	}

	/// Installs the definition and returns its id.
	pub fn build(self) -> TypeResult<ClassId> {
		let ClassBuilder {
			registry,
			id,
			mut def,
			default_constructor,
			fields_constructor,
		} = self;

		let mut inits = Vec::new();
		collect_initializers(&def.fields, &mut inits);
		if let Some(parent) = def.superclass.as_ref().and_then(TypeRef::class_id) {
			for (name, init) in registry.initializers(parent) {
				if !inits.iter().any(|(n, _)| *n == name) {
					inits.push((name, init));
				}
			}
		}

		if default_constructor {
			let inits = inits.clone();
			def.constructors.push(Constructor::new(Vec::new(), move |_| {
				Ok(Value::Object(instantiate(id, &inits)))
			}));
		}

		if fields_constructor {
			let names: Vec<String> = def.fields.iter().map(|f| f.name.clone()).collect();
			let params = def
				.fields
				.iter()
				.map(|f| Parameter {
					ty: f.ty.clone(),
					directives: f.directives.clone(),
				})
				.collect();
			def.constructors.push(Constructor::new(params, move |args| {
				let object = instantiate(id, &inits);
				for (name, value) in names.iter().zip(args) {
					object.set(name.clone(), value);
				}
				Ok(Value::Object(object))
			}));
		}

		registry.define(id, def)?;
		Ok(id)
	}
}
