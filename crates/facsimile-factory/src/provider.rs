//! Pluggable collaborators: the value provider and the external factory.

use std::collections::HashSet;

use facsimile_types::{ClassId, Constructor, Directive, DirectiveTag, FactoryMethod, TypeRef, Value};
use tracing::info;

#[cfg(feature = "config")]
pub mod config;
pub mod random;

#[cfg(feature = "config")]
pub use config::{ClassOverride, ProviderConfig};
pub use random::{RandomValueProvider, RandomValueProviderBuilder};

/// Default number of elements put into containers.
pub const DEFAULT_ELEMENT_COUNT: usize = 5;
/// Default maximum re-entry depth of a class.
pub const DEFAULT_MAX_DEPTH: usize = 1;
/// Default length of manufactured strings.
pub const DEFAULT_STRING_LENGTH: usize = 10;

/// Context of the attribute or parameter a scalar is produced for.
#[derive(Debug, Clone, Copy)]
pub struct AttributeMetadata<'a> {
	/// Attribute name; `None` for constructor and method parameters.
	pub name: Option<&'a str>,
	pub class: ClassId,
	pub type_args: &'a [TypeRef],
	pub directives: &'a [Directive],
	/// Class declaring the attribute or parameter.
	pub owner: Option<ClassId>,
}

impl<'a> AttributeMetadata<'a> {
	/// Metadata for a value with no attribute context.
	pub fn bare(class: ClassId) -> Self {
		Self {
			name: None,
			class,
			type_args: &[],
			directives: &[],
			owner: None,
		}
	}
}

/// Memoization key: a class together with its type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
	pub class: ClassId,
	pub type_args: Vec<TypeRef>,
}

impl MemoKey {
	pub fn new(class: ClassId, type_args: &[TypeRef]) -> Self {
		Self {
			class,
			type_args: type_args.to_vec(),
		}
	}
}

/// Source of scalar values and of the tunables steering manufacture.
///
/// Implementations are shared by concurrent callers and must be internally
/// synchronized.
pub trait ValueProvider: Send + Sync {
	fn boolean(&self, meta: &AttributeMetadata<'_>) -> bool;
	fn byte(&self, meta: &AttributeMetadata<'_>) -> i8;
	fn byte_in_range(&self, min: i8, max: i8, meta: &AttributeMetadata<'_>) -> i8;
	fn char(&self, meta: &AttributeMetadata<'_>) -> char;
	fn char_in_range(&self, min: char, max: char, meta: &AttributeMetadata<'_>) -> char;
	fn short(&self, meta: &AttributeMetadata<'_>) -> i16;
	fn short_in_range(&self, min: i16, max: i16, meta: &AttributeMetadata<'_>) -> i16;
	fn int(&self, meta: &AttributeMetadata<'_>) -> i32;
	fn int_in_range(&self, min: i32, max: i32, meta: &AttributeMetadata<'_>) -> i32;
	fn long(&self, meta: &AttributeMetadata<'_>) -> i64;
	fn long_in_range(&self, min: i64, max: i64, meta: &AttributeMetadata<'_>) -> i64;
	fn float(&self, meta: &AttributeMetadata<'_>) -> f32;
	fn float_in_range(&self, min: f32, max: f32, meta: &AttributeMetadata<'_>) -> f32;
	fn double(&self, meta: &AttributeMetadata<'_>) -> f64;
	fn double_in_range(&self, min: f64, max: f64, meta: &AttributeMetadata<'_>) -> f64;
	fn string(&self, meta: &AttributeMetadata<'_>) -> String;
	fn string_of_length(&self, length: usize, meta: &AttributeMetadata<'_>) -> String;

	/// Number of elements to put into containers of `element`.
	fn element_count(&self, element: ClassId) -> usize;

	/// How many times `class` may be re-entered below its first occurrence.
	fn max_depth(&self, class: ClassId) -> usize;

	fn memoization_enabled(&self) -> bool;
	fn memoized(&self, key: &MemoKey) -> Option<Value>;
	fn memoize(&self, key: MemoKey, value: Value);
	fn clear_memoization(&self);

	/// Concrete class to build in place of an interface or abstract class.
	/// Returning `class` itself means no substitute is known. Not consulted
	/// for container classes.
	fn concrete_class(&self, class: ClassId) -> ClassId;

	/// Orders constructor candidates in place.
	fn order_constructors(&self, candidates: &mut [Constructor]) {
		order_constructors_by_fewest_params(candidates);
	}

	/// Orders factory-method candidates in place.
	fn order_factories(&self, candidates: &mut [FactoryMethod]) {
		order_factories_by_most_params(candidates);
	}

	/// Attributes carrying any of these directives are skipped entirely.
	fn excluded_directives(&self) -> HashSet<DirectiveTag> {
		HashSet::from([DirectiveTag::Exclude])
	}
}

/// Preferred constructors first, then fewest parameters.
pub fn order_constructors_by_fewest_params(candidates: &mut [Constructor]) {
	candidates.sort_by_key(|c| (!c.preferred, c.arity()));
}

/// Preferred factories first, then most parameters.
pub fn order_factories_by_most_params(candidates: &mut [FactoryMethod]) {
	candidates.sort_by_key(|f| (!f.preferred, std::cmp::Reverse(f.arity())));
}

/// Last-resort producer for values the engine cannot build itself.
pub trait ExternalFactory: Send + Sync {
	/// The returned value is used verbatim, null included.
	fn manufacture(&self, class: ClassId, type_args: &[TypeRef]) -> Value;
}

/// External factory that produces nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExternalFactory;

impl ExternalFactory for NullExternalFactory {
	fn manufacture(&self, class: ClassId, type_args: &[TypeRef]) -> Value {
		info!(
			"Manufacturing {} with parameters {:?} is not supported, returning null",
			class, type_args
		);
		Value::Null
	}
}
