//! Built-in classes present in every registry at fixed ids.

use crate::class::{ClassDef, ClassId, ClassKind, CollectionKind, MapKind, ScalarKind};
use crate::member::Constructor;
use crate::type_ref::TypeRef;
use crate::value::{ObjectRef, Value};

pub const OBJECT: ClassId = ClassId(0);

pub const BOOLEAN: ClassId = ClassId(1);
pub const BYTE: ClassId = ClassId(2);
pub const CHAR: ClassId = ClassId(3);
pub const SHORT: ClassId = ClassId(4);
pub const INT: ClassId = ClassId(5);
pub const LONG: ClassId = ClassId(6);
pub const FLOAT: ClassId = ClassId(7);
pub const DOUBLE: ClassId = ClassId(8);

pub const BOOLEAN_BOX: ClassId = ClassId(9);
pub const BYTE_BOX: ClassId = ClassId(10);
pub const CHAR_BOX: ClassId = ClassId(11);
pub const SHORT_BOX: ClassId = ClassId(12);
pub const INT_BOX: ClassId = ClassId(13);
pub const LONG_BOX: ClassId = ClassId(14);
pub const FLOAT_BOX: ClassId = ClassId(15);
pub const DOUBLE_BOX: ClassId = ClassId(16);

pub const STRING: ClassId = ClassId(17);
pub const ARRAY: ClassId = ClassId(18);
pub const CLASS: ClassId = ClassId(19);

pub const COLLECTION: ClassId = ClassId(20);
pub const LIST: ClassId = ClassId(21);
pub const QUEUE: ClassId = ClassId(22);
pub const SET: ClassId = ClassId(23);
pub const ARRAY_LIST: ClassId = ClassId(24);
pub const LINKED_LIST: ClassId = ClassId(25);
pub const HASH_SET: ClassId = ClassId(26);

pub const MAP: ClassId = ClassId(27);
pub const SORTED_MAP: ClassId = ClassId(28);
pub const CONCURRENT_MAP: ClassId = ClassId(29);
pub const HASH_MAP: ClassId = ClassId(30);
pub const TREE_MAP: ClassId = ClassId(31);
pub const CONCURRENT_HASH_MAP: ClassId = ClassId(32);

pub(crate) const BUILTIN_COUNT: u32 = 33;

/// Class of the non-nullable form of a scalar.
pub const fn primitive(kind: ScalarKind) -> ClassId {
	match kind {
		ScalarKind::Boolean => BOOLEAN,
		ScalarKind::Byte => BYTE,
		ScalarKind::Char => CHAR,
		ScalarKind::Short => SHORT,
		ScalarKind::Int => INT,
		ScalarKind::Long => LONG,
		ScalarKind::Float => FLOAT,
		ScalarKind::Double => DOUBLE,
	}
}

/// Class of the nullable form of a scalar.
pub const fn boxed(kind: ScalarKind) -> ClassId {
	match kind {
		ScalarKind::Boolean => BOOLEAN_BOX,
		ScalarKind::Byte => BYTE_BOX,
		ScalarKind::Char => CHAR_BOX,
		ScalarKind::Short => SHORT_BOX,
		ScalarKind::Int => INT_BOX,
		ScalarKind::Long => LONG_BOX,
		ScalarKind::Float => FLOAT_BOX,
		ScalarKind::Double => DOUBLE_BOX,
	}
}

/// Built-in class implementing a collection category.
pub const fn collection_class(kind: CollectionKind) -> ClassId {
	match kind {
		CollectionKind::Collection => COLLECTION,
		CollectionKind::List => LIST,
		CollectionKind::Queue => QUEUE,
		CollectionKind::Set => SET,
		CollectionKind::ArrayList => ARRAY_LIST,
		CollectionKind::LinkedList => LINKED_LIST,
		CollectionKind::HashSet => HASH_SET,
	}
}

/// Built-in class implementing a map category.
pub const fn map_class(kind: MapKind) -> ClassId {
	match kind {
		MapKind::Map => MAP,
		MapKind::SortedMap => SORTED_MAP,
		MapKind::ConcurrentMap => CONCURRENT_MAP,
		MapKind::HashMap => HASH_MAP,
		MapKind::TreeMap => TREE_MAP,
		MapKind::ConcurrentHashMap => CONCURRENT_HASH_MAP,
	}
}

fn element_of(class: ClassId) -> TypeRef {
	TypeRef::generic(class, vec![TypeRef::param("E")])
}

fn entries_of(class: ClassId) -> TypeRef {
	TypeRef::generic(class, vec![TypeRef::param("K"), TypeRef::param("V")])
}

fn collection(name: &str, kind: CollectionKind) -> ClassDef {
	ClassDef::new(name, ClassKind::Collection(kind)).with_type_params(["E"])
}

fn map(name: &str, kind: MapKind) -> ClassDef {
	ClassDef::new(name, ClassKind::Map(kind)).with_type_params(["K", "V"])
}

/// Definitions of the built-in classes, indexed by their fixed ids.
pub(crate) fn definitions() -> Vec<ClassDef> {
	let mut defs = Vec::with_capacity(BUILTIN_COUNT as usize);

	let mut object = ClassDef::new("Object", ClassKind::Top);
	object.constructors.push(Constructor::new(Vec::new(), |_| {
		Ok(Value::Object(ObjectRef::new(OBJECT)))
	}));
	defs.push(object);

	for kind in ScalarKind::ALL {
		defs.push(ClassDef::new(
			kind.name(),
			ClassKind::Scalar { kind, boxed: false },
		));
	}
	for kind in ScalarKind::ALL {
		defs.push(ClassDef::new(
			kind.boxed_name(),
			ClassKind::Scalar { kind, boxed: true },
		));
	}

	defs.push(ClassDef::new("String", ClassKind::String));
	defs.push(ClassDef::new("Array", ClassKind::Array).with_type_params(["E"]));
	defs.push(ClassDef::new("Class", ClassKind::TypeToken).with_type_params(["T"]));

	defs.push(collection("Collection", CollectionKind::Collection));
	defs.push(
		collection("List", CollectionKind::List).with_interface(element_of(COLLECTION)),
	);
	defs.push(
		collection("Queue", CollectionKind::Queue).with_interface(element_of(COLLECTION)),
	);
	defs.push(collection("Set", CollectionKind::Set).with_interface(element_of(COLLECTION)));
	defs.push(
		collection("ArrayList", CollectionKind::ArrayList).with_interface(element_of(LIST)),
	);
	defs.push(
		collection("LinkedList", CollectionKind::LinkedList)
			.with_interface(element_of(LIST))
			.with_interface(element_of(QUEUE)),
	);
	defs.push(collection("HashSet", CollectionKind::HashSet).with_interface(element_of(SET)));

	defs.push(map("Map", MapKind::Map));
	defs.push(map("SortedMap", MapKind::SortedMap).with_interface(entries_of(MAP)));
	defs.push(map("ConcurrentMap", MapKind::ConcurrentMap).with_interface(entries_of(MAP)));
	defs.push(map("HashMap", MapKind::HashMap).with_interface(entries_of(MAP)));
	defs.push(map("TreeMap", MapKind::TreeMap).with_interface(entries_of(SORTED_MAP)));
	defs.push(
		map("ConcurrentHashMap", MapKind::ConcurrentHashMap)
			.with_interface(entries_of(CONCURRENT_MAP)),
	);

	defs
}
