//! Dynamic values produced by the manufacturing engine.
//!
//! Scalars, strings, enum constants, arrays and class tokens are plain data.
//! Objects, collections and maps are shared mutable handles: cloning a handle
//! clones the reference, and equality between handles is identity.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::builtin;
use crate::class::{ClassId, ScalarKind};
use crate::member::{InvokeError, InvokeResult};

/// Storage behaviour of a collection instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFlavour {
	List,
	Linked,
	HashSet,
}

impl CollectionFlavour {
	/// Returns true if equal elements are stored once.
	pub const fn deduplicates(self) -> bool {
		matches!(self, CollectionFlavour::HashSet)
	}
}

/// Storage behaviour of a map instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFlavour {
	Hash,
	Tree,
	Concurrent,
}

impl MapFlavour {
	/// Concurrent maps reject null values.
	pub const fn permits_null_values(self) -> bool {
		!matches!(self, MapFlavour::Concurrent)
	}
}

/// A constant of an enumeration class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
	pub class: ClassId,
	pub ordinal: usize,
	pub name: String,
}

/// A fixed-size array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
	pub component: ClassId,
	pub items: Vec<Value>,
}

/// A manufactured value.
#[derive(Debug, Clone)]
pub enum Value {
	Null,
	Bool(bool),
	Byte(i8),
	Char(char),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	Str(String),
	Enum(EnumValue),
	Array(ArrayValue),
	/// A class token.
	Type(ClassId),
	Object(ObjectRef),
	Collection(CollectionRef),
	Map(MapRef),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Returns true for mutable-handle values whose contents can be populated.
	pub fn is_populatable(&self) -> bool {
		matches!(
			self,
			Value::Object(_) | Value::Collection(_) | Value::Map(_)
		)
	}

	/// The class of this value at runtime. Scalars report their boxed class.
	pub fn runtime_class(&self) -> Option<ClassId> {
		match self {
			Value::Null => None,
			Value::Bool(_) => Some(builtin::BOOLEAN_BOX),
			Value::Byte(_) => Some(builtin::BYTE_BOX),
			Value::Char(_) => Some(builtin::CHAR_BOX),
			Value::Short(_) => Some(builtin::SHORT_BOX),
			Value::Int(_) => Some(builtin::INT_BOX),
			Value::Long(_) => Some(builtin::LONG_BOX),
			Value::Float(_) => Some(builtin::FLOAT_BOX),
			Value::Double(_) => Some(builtin::DOUBLE_BOX),
			Value::Str(_) => Some(builtin::STRING),
			Value::Enum(e) => Some(e.class),
			Value::Array(_) => Some(builtin::ARRAY),
			Value::Type(_) => Some(builtin::CLASS),
			Value::Object(o) => Some(o.class()),
			Value::Collection(c) => Some(c.class()),
			Value::Map(m) => Some(m.class()),
		}
	}

	/// Scalar category of this value, if it is a scalar.
	pub fn scalar_kind(&self) -> Option<ScalarKind> {
		match self {
			Value::Bool(_) => Some(ScalarKind::Boolean),
			Value::Byte(_) => Some(ScalarKind::Byte),
			Value::Char(_) => Some(ScalarKind::Char),
			Value::Short(_) => Some(ScalarKind::Short),
			Value::Int(_) => Some(ScalarKind::Int),
			Value::Long(_) => Some(ScalarKind::Long),
			Value::Float(_) => Some(ScalarKind::Float),
			Value::Double(_) => Some(ScalarKind::Double),
			_ => None,
		}
	}

	/// Identity comparison of two handle values.
	pub fn ptr_eq(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
			(Value::Collection(a), Value::Collection(b)) => a.ptr_eq(b),
			(Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
			_ => false,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_byte(&self) -> Option<i8> {
		match self {
			Value::Byte(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_char(&self) -> Option<char> {
		match self {
			Value::Char(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_short(&self) -> Option<i16> {
		match self {
			Value::Short(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i32> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_long(&self) -> Option<i64> {
		match self {
			Value::Long(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f32> {
		match self {
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_double(&self) -> Option<f64> {
		match self {
			Value::Double(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumValue> {
		match self {
			Value::Enum(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&ArrayValue> {
		match self {
			Value::Array(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_type(&self) -> Option<ClassId> {
		match self {
			Value::Type(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Value::Object(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_collection(&self) -> Option<&CollectionRef> {
		match self {
			Value::Collection(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&MapRef> {
		match self {
			Value::Map(v) => Some(v),
			_ => None,
		}
	}

	fn rank(&self) -> u8 {
		match self {
			Value::Null => 0,
			Value::Bool(_) => 1,
			Value::Byte(_) => 2,
			Value::Char(_) => 3,
			Value::Short(_) => 4,
			Value::Int(_) => 5,
			Value::Long(_) => 6,
			Value::Float(_) => 7,
			Value::Double(_) => 8,
			Value::Str(_) => 9,
			Value::Enum(_) => 10,
			Value::Array(_) => 11,
			Value::Type(_) => 12,
			Value::Object(_) => 13,
			Value::Collection(_) => 14,
			Value::Map(_) => 15,
		}
	}

	/// Total order used to keep sorted maps ordered by key.
	///
	/// Values of different variants are ordered by variant; handles are
	/// ordered by address.
	pub fn sort_cmp(&self, other: &Value) -> Ordering {
		match (self, other) {
			(Value::Bool(a), Value::Bool(b)) => a.cmp(b),
			(Value::Byte(a), Value::Byte(b)) => a.cmp(b),
			(Value::Char(a), Value::Char(b)) => a.cmp(b),
			(Value::Short(a), Value::Short(b)) => a.cmp(b),
			(Value::Int(a), Value::Int(b)) => a.cmp(b),
			(Value::Long(a), Value::Long(b)) => a.cmp(b),
			(Value::Float(a), Value::Float(b)) => a.total_cmp(b),
			(Value::Double(a), Value::Double(b)) => a.total_cmp(b),
			(Value::Str(a), Value::Str(b)) => a.cmp(b),
			(Value::Enum(a), Value::Enum(b)) => (a.class, a.ordinal).cmp(&(b.class, b.ordinal)),
			(Value::Array(a), Value::Array(b)) => {
				for (x, y) in a.items.iter().zip(b.items.iter()) {
					let ordering = x.sort_cmp(y);
					if ordering != Ordering::Equal {
						return ordering;
					}
				}
				a.items.len().cmp(&b.items.len())
			}
			(Value::Type(a), Value::Type(b)) => a.cmp(b),
			(Value::Object(a), Value::Object(b)) => a.address().cmp(&b.address()),
			(Value::Collection(a), Value::Collection(b)) => a.address().cmp(&b.address()),
			(Value::Map(a), Value::Map(b)) => a.address().cmp(&b.address()),
			_ => self.rank().cmp(&other.rank()),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Byte(a), Value::Byte(b)) => a == b,
			(Value::Char(a), Value::Char(b)) => a == b,
			(Value::Short(a), Value::Short(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Long(a), Value::Long(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::Double(a), Value::Double(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::Enum(a), Value::Enum(b)) => a == b,
			(Value::Array(a), Value::Array(b)) => a == b,
			(Value::Type(a), Value::Type(b)) => a == b,
			_ => self.ptr_eq(other),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Long(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Double(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Str(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Str(v)
	}
}

struct ObjectData {
	class: ClassId,
	fields: HashMap<String, Value>,
}

/// Shared handle to an object instance.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<ObjectData>>);

impl ObjectRef {
	/// Creates an instance with no field values.
	pub fn new(class: ClassId) -> Self {
		Self::with_fields(class, std::iter::empty())
	}

	/// Creates an instance with initial field values.
	pub fn with_fields<I>(class: ClassId, fields: I) -> Self
	where
		I: IntoIterator<Item = (String, Value)>,
	{
		Self(Arc::new(RwLock::new(ObjectData {
			class,
			fields: fields.into_iter().collect(),
		})))
	}

	pub fn class(&self) -> ClassId {
		self.0.read().class
	}

	/// Current value of a field; unset fields read as null.
	pub fn get(&self, name: &str) -> Value {
		self.0.read().fields.get(name).cloned().unwrap_or(Value::Null)
	}

	pub fn set(&self, name: impl Into<String>, value: Value) {
		self.0.write().fields.insert(name.into(), value);
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.read().fields.contains_key(name)
	}

	/// Names of the fields holding a value, sorted.
	pub fn field_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.0.read().fields.keys().cloned().collect();
		names.sort();
		names
	}

	pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	fn address(&self) -> usize {
		Arc::as_ptr(&self.0) as *const () as usize
	}
}

impl fmt::Debug for ObjectRef {
	// Field values are omitted: object graphs may be cyclic.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectRef")
			.field("class", &self.class())
			.field("fields", &self.field_names())
			.finish()
	}
}

struct CollectionData {
	class: ClassId,
	flavour: CollectionFlavour,
	items: Vec<Value>,
	immutable: bool,
}

/// Shared handle to a sequence or set instance.
#[derive(Clone)]
pub struct CollectionRef(Arc<RwLock<CollectionData>>);

impl CollectionRef {
	/// Creates an empty mutable collection.
	pub fn new(class: ClassId, flavour: CollectionFlavour) -> Self {
		Self(Arc::new(RwLock::new(CollectionData {
			class,
			flavour,
			items: Vec::new(),
			immutable: false,
		})))
	}

	/// Creates a collection that rejects every mutation.
	pub fn immutable(class: ClassId, flavour: CollectionFlavour, items: Vec<Value>) -> Self {
		Self(Arc::new(RwLock::new(CollectionData {
			class,
			flavour,
			items,
			immutable: true,
		})))
	}

	pub fn class(&self) -> ClassId {
		self.0.read().class
	}

	pub fn flavour(&self) -> CollectionFlavour {
		self.0.read().flavour
	}

	pub fn len(&self) -> usize {
		self.0.read().items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.read().items.is_empty()
	}

	pub fn is_immutable(&self) -> bool {
		self.0.read().immutable
	}

	/// Snapshot of the elements.
	pub fn items(&self) -> Vec<Value> {
		self.0.read().items.clone()
	}

	pub fn get(&self, index: usize) -> Option<Value> {
		self.0.read().items.get(index).cloned()
	}

	/// Appends an element. Returns `Ok(false)` when a set already holds an
	/// equal element.
	pub fn push(&self, value: Value) -> InvokeResult<bool> {
		let mut data = self.0.write();
		if data.immutable {
			return Err(InvokeError::Immutable);
		}
		if data.flavour.deduplicates() && data.items.contains(&value) {
			return Ok(false);
		}
		data.items.push(value);
		Ok(true)
	}

	/// Drops elements beyond `len`.
	pub fn truncate(&self, len: usize) -> InvokeResult<()> {
		let mut data = self.0.write();
		if data.immutable {
			return Err(InvokeError::Immutable);
		}
		data.items.truncate(len);
		Ok(())
	}

	pub fn ptr_eq(&self, other: &CollectionRef) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	fn address(&self) -> usize {
		Arc::as_ptr(&self.0) as *const () as usize
	}
}

impl fmt::Debug for CollectionRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.0.read();
		f.debug_struct("CollectionRef")
			.field("class", &data.class)
			.field("flavour", &data.flavour)
			.field("len", &data.items.len())
			.field("immutable", &data.immutable)
			.finish()
	}
}

struct MapData {
	class: ClassId,
	flavour: MapFlavour,
	entries: Vec<(Value, Value)>,
	immutable: bool,
}

/// Shared handle to a key/value map instance.
#[derive(Clone)]
pub struct MapRef(Arc<RwLock<MapData>>);

impl MapRef {
	/// Creates an empty mutable map.
	pub fn new(class: ClassId, flavour: MapFlavour) -> Self {
		Self(Arc::new(RwLock::new(MapData {
			class,
			flavour,
			entries: Vec::new(),
			immutable: false,
		})))
	}

	/// Creates a map that rejects every mutation.
	pub fn immutable(class: ClassId, flavour: MapFlavour, entries: Vec<(Value, Value)>) -> Self {
		let mut entries = entries;
		if flavour == MapFlavour::Tree {
			entries.sort_by(|a, b| a.0.sort_cmp(&b.0));
		}
		Self(Arc::new(RwLock::new(MapData {
			class,
			flavour,
			entries,
			immutable: true,
		})))
	}

	pub fn class(&self) -> ClassId {
		self.0.read().class
	}

	pub fn flavour(&self) -> MapFlavour {
		self.0.read().flavour
	}

	pub fn len(&self) -> usize {
		self.0.read().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.read().entries.is_empty()
	}

	pub fn is_immutable(&self) -> bool {
		self.0.read().immutable
	}

	pub fn permits_null_values(&self) -> bool {
		self.flavour().permits_null_values()
	}

	/// Snapshot of the entries, in key order for sorted maps.
	pub fn entries(&self) -> Vec<(Value, Value)> {
		self.0.read().entries.clone()
	}

	pub fn keys(&self) -> Vec<Value> {
		self.0.read().entries.iter().map(|(k, _)| k.clone()).collect()
	}

	pub fn values(&self) -> Vec<Value> {
		self.0.read().entries.iter().map(|(_, v)| v.clone()).collect()
	}

	pub fn get(&self, key: &Value) -> Option<Value> {
		self.0
			.read()
			.entries
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.clone())
	}

	/// Inserts or replaces an entry, returning the replaced value.
	pub fn insert(&self, key: Value, value: Value) -> InvokeResult<Option<Value>> {
		let mut data = self.0.write();
		if data.immutable {
			return Err(InvokeError::Immutable);
		}
		if value.is_null() && !data.flavour.permits_null_values() {
			return Err(InvokeError::NullNotPermitted);
		}
		if let Some(entry) = data.entries.iter_mut().find(|(k, _)| *k == key) {
			return Ok(Some(std::mem::replace(&mut entry.1, value)));
		}
		data.entries.push((key, value));
		if data.flavour == MapFlavour::Tree {
			data.entries.sort_by(|a, b| a.0.sort_cmp(&b.0));
		}
		Ok(None)
	}

	/// Drops entries beyond `len`.
	pub fn truncate(&self, len: usize) -> InvokeResult<()> {
		let mut data = self.0.write();
		if data.immutable {
			return Err(InvokeError::Immutable);
		}
		data.entries.truncate(len);
		Ok(())
	}

	pub fn ptr_eq(&self, other: &MapRef) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	fn address(&self) -> usize {
		Arc::as_ptr(&self.0) as *const () as usize
	}
}

impl fmt::Debug for MapRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.0.read();
		f.debug_struct("MapRef")
			.field("class", &data.class)
			.field("flavour", &data.flavour)
			.field("len", &data.entries.len())
			.field("immutable", &data.immutable)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_handles_compare_by_identity() {
		// Arrange
		let a = ObjectRef::new(builtin::OBJECT);
		let b = ObjectRef::new(builtin::OBJECT);

		// Assert
		assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
		assert_ne!(Value::Object(a), Value::Object(b));
	}

	#[rstest]
	fn test_hash_set_flavour_deduplicates() {
		// Arrange
		let set = CollectionRef::new(builtin::HASH_SET, CollectionFlavour::HashSet);

		// Act
		let first = set.push(Value::Int(7)).unwrap();
		let second = set.push(Value::Int(7)).unwrap();

		// Assert
		assert!(first);
		assert!(!second);
		assert_eq!(set.len(), 1);
	}

	#[rstest]
	fn test_immutable_collection_rejects_mutation() {
		// Arrange
		let list = CollectionRef::immutable(
			builtin::ARRAY_LIST,
			CollectionFlavour::List,
			vec![Value::Int(1)],
		);

		// Act & Assert
		assert!(matches!(list.push(Value::Int(2)), Err(InvokeError::Immutable)));
		assert!(matches!(list.truncate(0), Err(InvokeError::Immutable)));
		assert_eq!(list.len(), 1);
	}

	#[rstest]
	fn test_tree_map_keeps_keys_sorted() {
		// Arrange
		let map = MapRef::new(builtin::TREE_MAP, MapFlavour::Tree);

		// Act
		map.insert(Value::from("b"), Value::Int(2)).unwrap();
		map.insert(Value::from("a"), Value::Int(1)).unwrap();
		let replaced = map.insert(Value::from("b"), Value::Int(3)).unwrap();

		// Assert
		assert_eq!(replaced, Some(Value::Int(2)));
		assert_eq!(map.keys(), vec![Value::from("a"), Value::from("b")]);
		assert_eq!(map.get(&Value::from("b")), Some(Value::Int(3)));
	}

	#[rstest]
	fn test_concurrent_map_rejects_null_values() {
		// Arrange
		let map = MapRef::new(builtin::CONCURRENT_HASH_MAP, MapFlavour::Concurrent);

		// Act
		let result = map.insert(Value::Int(1), Value::Null);

		// Assert
		assert!(matches!(result, Err(InvokeError::NullNotPermitted)));
		assert!(map.is_empty());
	}

	#[rstest]
	fn test_runtime_class_of_scalars_is_boxed() {
		assert_eq!(Value::Int(1).runtime_class(), Some(builtin::INT_BOX));
		assert_eq!(Value::from("x").runtime_class(), Some(builtin::STRING));
		assert_eq!(Value::Null.runtime_class(), None);
	}

	#[rstest]
	fn test_debug_of_cyclic_object_terminates() {
		// Arrange
		let node = ObjectRef::new(builtin::OBJECT);
		node.set("next", Value::Object(node.clone()));

		// Act
		let rendered = format!("{:?}", Value::Object(node));

		// Assert
		assert!(rendered.contains("next"));
	}
}
