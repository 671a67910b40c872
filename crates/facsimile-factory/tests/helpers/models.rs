//! Model classes shared by the integration tests.
//!
//! Builds one registry holding a class for each manufacturing scenario: plain
//! scalars, a self-referential node, containers, directives, an interface
//! with one implementation, generics across inheritance and read-only nested
//! objects.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use facsimile_factory::{ExternalFactory, Factory, RandomValueProvider};
use facsimile_types::{
	ClassId, CollectionDirective, CollectionFlavour, CollectionRef, Directive, FieldDef, ObjectRef,
	ScalarKind, ScalarRange, TypeRef, TypeRegistry, Value, builtin,
};

/// Element count forced onto `Holder.sized`.
pub const SIZED_COUNT: usize = 7;

/// Ids of the model classes inside [`Models::registry`].
pub struct Models {
	pub registry: Arc<TypeRegistry>,
	/// Scalars, a string, a wrapper and an enum.
	pub pojo: ClassId,
	pub color: ClassId,
	/// `Node { label: String, next: Node }`.
	pub node: ClassId,
	/// `score` limited to 10..=20 and `code` fixed to "X".
	pub ranged: ClassId,
	/// Lists, sets, maps, arrays, and read-only containers.
	pub holder: ClassId,
	pub shape: ClassId,
	pub circle: ClassId,
	/// `Drawing { shape: Shape }`.
	pub drawing: ClassId,
	/// `Pair<A, B> { first: A, second: B }`.
	pub pair: ClassId,
	/// `NamedPair extends Pair<String, Integer>`.
	pub named_pair: ClassId,
	/// `Twins { left: Circle, right: Circle }`.
	pub twins: ClassId,
	pub address: ClassId,
	/// `Person` with a read-only `address`.
	pub person: ClassId,
}

impl Models {
	/// A factory over the models with the given provider.
	pub fn factory(&self, provider: RandomValueProvider) -> Factory {
		Factory::builder(Arc::clone(&self.registry))
			.provider(provider)
			.build()
	}
}

pub fn models() -> Models {
	let mut registry = TypeRegistry::new();

	let color = registry
		.class("Color")
		.unwrap()
		.enumeration(["RED", "GREEN", "BLUE"])
		.build()
		.unwrap();

	let pojo = registry
		.class("Pojo")
		.unwrap()
		.field("flag", TypeRef::primitive(ScalarKind::Boolean))
		.field("small", TypeRef::primitive(ScalarKind::Byte))
		.field("initial", TypeRef::primitive(ScalarKind::Char))
		.field("count", TypeRef::primitive(ScalarKind::Int))
		.field("total", TypeRef::primitive(ScalarKind::Long))
		.field("ratio", TypeRef::primitive(ScalarKind::Double))
		.field("boxed", TypeRef::boxed(ScalarKind::Int))
		.field("name", TypeRef::string())
		.field("color", TypeRef::class(color))
		.default_constructor()
		.build()
		.unwrap();

	let node = registry.reserve("Node").unwrap();
	registry
		.define_class(node)
		.field("label", TypeRef::string())
		.field("next", TypeRef::class(node))
		.default_constructor()
		.build()
		.unwrap();

	let ranged = registry
		.class("Ranged")
		.unwrap()
		.field_with(
			FieldDef::new("score", TypeRef::primitive(ScalarKind::Int))
				.with_directive(Directive::Range(ScalarRange::Int { min: 10, max: 20 })),
		)
		.field_with(
			FieldDef::new("code", TypeRef::string())
				.with_directive(Directive::Precise("X".to_string())),
		)
		.default_constructor()
		.build()
		.unwrap();

	let holder = registry
		.class("Holder")
		.unwrap()
		.field("names", TypeRef::list_of(TypeRef::string()))
		.field("tags", TypeRef::set_of(TypeRef::boxed(ScalarKind::Int)))
		.field(
			"scores",
			TypeRef::map_of(TypeRef::string(), TypeRef::boxed(ScalarKind::Int)),
		)
		.field("ids", TypeRef::array_of(TypeRef::boxed(ScalarKind::Long)))
		.field_with(
			FieldDef::new("sized", TypeRef::list_of(TypeRef::boxed(ScalarKind::Int)))
				.with_directive(Directive::Collection(CollectionDirective::with_count(
					SIZED_COUNT,
				))),
		)
		.read_only("frozen", TypeRef::list_of(TypeRef::string()), || {
			Value::Collection(CollectionRef::immutable(
				builtin::ARRAY_LIST,
				CollectionFlavour::List,
				Vec::new(),
			))
		})
		.read_only("backlog", TypeRef::queue_of(TypeRef::string()), || {
			Value::Collection(CollectionRef::new(
				builtin::LINKED_LIST,
				CollectionFlavour::Linked,
			))
		})
		.default_constructor()
		.build()
		.unwrap();

	let shape = registry.class("Shape").unwrap().interface().build().unwrap();
	let circle = registry
		.class("Circle")
		.unwrap()
		.implements(TypeRef::class(shape))
		.field("radius", TypeRef::primitive(ScalarKind::Double))
		.default_constructor()
		.build()
		.unwrap();
	let drawing = registry
		.class("Drawing")
		.unwrap()
		.field("shape", TypeRef::class(shape))
		.default_constructor()
		.build()
		.unwrap();

	let pair = registry
		.class("Pair")
		.unwrap()
		.type_param("A")
		.type_param("B")
		.field("first", TypeRef::param("A"))
		.field("second", TypeRef::param("B"))
		.default_constructor()
		.build()
		.unwrap();
	let named_pair = registry
		.class("NamedPair")
		.unwrap()
		.extends(TypeRef::generic(
			pair,
			vec![TypeRef::string(), TypeRef::boxed(ScalarKind::Int)],
		))
		.default_constructor()
		.build()
		.unwrap();

	let twins = registry
		.class("Twins")
		.unwrap()
		.field("left", TypeRef::class(circle))
		.field("right", TypeRef::class(circle))
		.default_constructor()
		.build()
		.unwrap();

	let address = registry
		.class("Address")
		.unwrap()
		.field("street", TypeRef::string())
		.field("number", TypeRef::primitive(ScalarKind::Int))
		.default_constructor()
		.build()
		.unwrap();
	let person = registry
		.class("Person")
		.unwrap()
		.field("name", TypeRef::string())
		.read_only("address", TypeRef::class(address), move || {
			Value::Object(ObjectRef::new(address))
		})
		.default_constructor()
		.build()
		.unwrap();

	Models {
		registry: Arc::new(registry),
		pojo,
		color,
		node,
		ranged,
		holder,
		shape,
		circle,
		drawing,
		pair,
		named_pair,
		twins,
		address,
		person,
	}
}

/// External factory that records how often it is asked and answers with a
/// fixed value.
#[derive(Debug)]
pub struct CountingExternal {
	calls: AtomicUsize,
	answer: Value,
}

impl CountingExternal {
	pub fn answering(answer: Value) -> Self {
		Self {
			calls: AtomicUsize::new(0),
			answer,
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl ExternalFactory for CountingExternal {
	fn manufacture(&self, _class: ClassId, _type_args: &[TypeRef]) -> Value {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.answer.clone()
	}
}

/// Number of non-null `next` links below a node.
pub fn chain_length(root: &Value) -> usize {
	let mut links = 0;
	let mut current = root.clone();
	while let Some(object) = current.as_object() {
		let next = object.get("next");
		if next.is_null() {
			break;
		}
		links += 1;
		current = next;
	}
	links
}
