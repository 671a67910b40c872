//! Class identities and class definitions.
//!
//! A [`ClassDef`] is the runtime description of a type: its category, the
//! generic parameters it declares, its supertypes, its declared fields and the
//! members that can construct or mutate its instances.

use std::fmt;
use std::sync::Arc;

use crate::directive::Directive;
use crate::member::{Constructor, FactoryMethod, MethodDef};
use crate::type_ref::TypeRef;
use crate::value::{CollectionFlavour, MapFlavour, Value};

/// Arena index of a class inside a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
	/// Returns the arena index of this class.
	pub const fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for ClassId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Scalar categories understood by the value provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
	Boolean,
	Byte,
	Char,
	Short,
	Int,
	Long,
	Float,
	Double,
}

impl ScalarKind {
	/// All scalar kinds in declaration order.
	pub const ALL: [ScalarKind; 8] = [
		ScalarKind::Boolean,
		ScalarKind::Byte,
		ScalarKind::Char,
		ScalarKind::Short,
		ScalarKind::Int,
		ScalarKind::Long,
		ScalarKind::Float,
		ScalarKind::Double,
	];

	/// Lower-case name of the primitive form.
	pub const fn name(self) -> &'static str {
		match self {
			ScalarKind::Boolean => "boolean",
			ScalarKind::Byte => "byte",
			ScalarKind::Char => "char",
			ScalarKind::Short => "short",
			ScalarKind::Int => "int",
			ScalarKind::Long => "long",
			ScalarKind::Float => "float",
			ScalarKind::Double => "double",
		}
	}

	/// Name of the boxed (nullable) form.
	pub const fn boxed_name(self) -> &'static str {
		match self {
			ScalarKind::Boolean => "Boolean",
			ScalarKind::Byte => "Byte",
			ScalarKind::Char => "Character",
			ScalarKind::Short => "Short",
			ScalarKind::Int => "Integer",
			ScalarKind::Long => "Long",
			ScalarKind::Float => "Float",
			ScalarKind::Double => "Double",
		}
	}
}

impl fmt::Display for ScalarKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Sequence and set categories, abstract ones first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
	Collection,
	List,
	Queue,
	Set,
	ArrayList,
	LinkedList,
	HashSet,
}

impl CollectionKind {
	/// Returns true for categories that cannot be instantiated directly.
	pub const fn is_abstract(self) -> bool {
		matches!(
			self,
			CollectionKind::Collection
				| CollectionKind::List
				| CollectionKind::Queue
				| CollectionKind::Set
		)
	}

	/// Concrete implementation used when a container of this category must
	/// be allocated.
	pub const fn default_implementation(self) -> CollectionKind {
		match self {
			CollectionKind::Collection | CollectionKind::List => CollectionKind::ArrayList,
			CollectionKind::Queue => CollectionKind::LinkedList,
			CollectionKind::Set => CollectionKind::HashSet,
			concrete => concrete,
		}
	}

	/// Storage flavour of the default implementation.
	pub const fn flavour(self) -> CollectionFlavour {
		match self.default_implementation() {
			CollectionKind::LinkedList => CollectionFlavour::Linked,
			CollectionKind::HashSet => CollectionFlavour::HashSet,
			_ => CollectionFlavour::List,
		}
	}
}

/// Map categories, abstract ones first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
	Map,
	SortedMap,
	ConcurrentMap,
	HashMap,
	TreeMap,
	ConcurrentHashMap,
}

impl MapKind {
	/// Returns true for categories that cannot be instantiated directly.
	pub const fn is_abstract(self) -> bool {
		matches!(
			self,
			MapKind::Map | MapKind::SortedMap | MapKind::ConcurrentMap
		)
	}

	/// Concrete implementation used when a map of this category must be
	/// allocated.
	pub const fn default_implementation(self) -> MapKind {
		match self {
			MapKind::Map => MapKind::HashMap,
			MapKind::SortedMap => MapKind::TreeMap,
			MapKind::ConcurrentMap => MapKind::ConcurrentHashMap,
			concrete => concrete,
		}
	}

	/// Storage flavour of the default implementation.
	pub const fn flavour(self) -> MapFlavour {
		match self.default_implementation() {
			MapKind::TreeMap => MapFlavour::Tree,
			MapKind::ConcurrentHashMap => MapFlavour::Concurrent,
			_ => MapFlavour::Hash,
		}
	}
}

/// The category of a class, which drives manufacturing dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassKind {
	/// The universal top type every class is assignable to.
	Top,
	/// A scalar; `boxed == false` is the non-nullable primitive form.
	Scalar { kind: ScalarKind, boxed: bool },
	String,
	Enum { constants: Vec<String> },
	/// Fixed-size array with a single component parameter.
	Array,
	/// Class literal; its value is the class bound to its single parameter.
	TypeToken,
	Collection(CollectionKind),
	Map(MapKind),
	Interface,
	Abstract,
	Concrete,
}

impl ClassKind {
	/// Returns true if instances of this kind cannot be built directly.
	pub fn is_abstract(&self) -> bool {
		match self {
			ClassKind::Interface | ClassKind::Abstract => true,
			ClassKind::Collection(kind) => kind.is_abstract(),
			ClassKind::Map(kind) => kind.is_abstract(),
			_ => false,
		}
	}

	/// Returns true for the non-nullable scalar forms.
	pub fn is_primitive(&self) -> bool {
		matches!(self, ClassKind::Scalar { boxed: false, .. })
	}

	/// Returns true for kinds manufactured through construction and population.
	pub fn is_object_like(&self) -> bool {
		matches!(
			self,
			ClassKind::Top | ClassKind::Interface | ClassKind::Abstract | ClassKind::Concrete
		)
	}
}

/// How the convention introspector exposes a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
	ReadWrite,
	ReadOnly,
	WriteOnly,
}

/// Produces the initial value of a field when an instance is created.
pub type FieldInitializer = Arc<dyn Fn() -> Value + Send + Sync>;

/// A field declared on a class.
#[derive(Clone)]
pub struct FieldDef {
	pub name: String,
	pub ty: TypeRef,
	pub directives: Vec<Directive>,
	pub access: FieldAccess,
	pub initializer: Option<FieldInitializer>,
}

impl FieldDef {
	/// Creates a read-write field without directives.
	pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
		Self {
			name: name.into(),
			ty,
			directives: Vec::new(),
			access: FieldAccess::ReadWrite,
			initializer: None,
		}
	}

	/// Sets the access mode.
	pub fn with_access(mut self, access: FieldAccess) -> Self {
		self.access = access;
		self
	}

	/// Attaches a directive.
	pub fn with_directive(mut self, directive: Directive) -> Self {
		self.directives.push(directive);
		self
	}

	/// Sets the value the field holds right after construction.
	pub fn with_initializer<F>(mut self, initializer: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.initializer = Some(Arc::new(initializer));
		self
	}
}

impl fmt::Debug for FieldDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldDef")
			.field("name", &self.name)
			.field("ty", &self.ty)
			.field("directives", &self.directives)
			.field("access", &self.access)
			.field("initializer", &self.initializer.is_some())
			.finish()
	}
}

/// Runtime definition of a class.
#[derive(Debug, Clone)]
pub struct ClassDef {
	pub name: String,
	pub kind: ClassKind,
	pub type_params: Vec<String>,
	pub superclass: Option<TypeRef>,
	pub interfaces: Vec<TypeRef>,
	pub fields: Vec<FieldDef>,
	pub constructors: Vec<Constructor>,
	pub factories: Vec<FactoryMethod>,
	pub methods: Vec<MethodDef>,
}

impl ClassDef {
	/// Creates an empty definition of the given kind.
	pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
		Self {
			name: name.into(),
			kind,
			type_params: Vec::new(),
			superclass: None,
			interfaces: Vec::new(),
			fields: Vec::new(),
			constructors: Vec::new(),
			factories: Vec::new(),
			methods: Vec::new(),
		}
	}

	/// Declares generic parameters, in order.
	pub fn with_type_params<I, S>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.type_params = params.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the generic superclass declaration.
	pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
		self.superclass = Some(superclass);
		self
	}

	/// Adds a generic interface declaration.
	pub fn with_interface(mut self, interface: TypeRef) -> Self {
		self.interfaces.push(interface);
		self
	}

	/// Superclass first, then interfaces.
	pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
		self.superclass.iter().chain(self.interfaces.iter())
	}

	/// Looks up a named method declared directly on this class.
	pub fn method(&self, name: &str) -> Option<&MethodDef> {
		self.methods.iter().find(|m| m.name == name)
	}

	/// Looks up a declared field by name.
	pub fn field(&self, name: &str) -> Option<&FieldDef> {
		self.fields.iter().find(|f| f.name == name)
	}
}
