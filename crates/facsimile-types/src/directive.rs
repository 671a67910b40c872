//! Metadata attached to fields and parameters that steers value production.

use std::fmt;
use std::sync::Arc;

use crate::class::ScalarKind;
use crate::value::Value;

/// User-supplied source of values for a single attribute or element.
pub trait ValueStrategy: Send + Sync + fmt::Debug {
	/// Produces the next value.
	fn value(&self) -> Value;
}

/// Strategy that always yields a clone of the same value.
#[derive(Debug, Clone)]
pub struct FixedValue(pub Value);

impl ValueStrategy for FixedValue {
	fn value(&self) -> Value {
		self.0.clone()
	}
}

/// Strategy backed by a closure.
pub struct FnStrategy {
	label: String,
	produce: Box<dyn Fn() -> Value + Send + Sync>,
}

impl FnStrategy {
	pub fn new<F>(label: impl Into<String>, produce: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		Self {
			label: label.into(),
			produce: Box::new(produce),
		}
	}
}

impl fmt::Debug for FnStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FnStrategy").field(&self.label).finish()
	}
}

impl ValueStrategy for FnStrategy {
	fn value(&self) -> Value {
		(self.produce)()
	}
}

/// Inclusive bounds for a numeric or character attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarRange {
	Byte { min: i8, max: i8 },
	Char { min: char, max: char },
	Short { min: i16, max: i16 },
	Int { min: i32, max: i32 },
	Long { min: i64, max: i64 },
	Float { min: f32, max: f32 },
	Double { min: f64, max: f64 },
}

impl ScalarRange {
	/// Scalar category the bounds apply to.
	pub fn kind(&self) -> ScalarKind {
		match self {
			ScalarRange::Byte { .. } => ScalarKind::Byte,
			ScalarRange::Char { .. } => ScalarKind::Char,
			ScalarRange::Short { .. } => ScalarKind::Short,
			ScalarRange::Int { .. } => ScalarKind::Int,
			ScalarRange::Long { .. } => ScalarKind::Long,
			ScalarRange::Float { .. } => ScalarKind::Float,
			ScalarRange::Double { .. } => ScalarKind::Double,
		}
	}

	/// Whether a floating-point bound is NaN.
	pub fn has_nan_bound(&self) -> bool {
		match *self {
			ScalarRange::Float { min, max } => min.is_nan() || max.is_nan(),
			ScalarRange::Double { min, max } => min.is_nan() || max.is_nan(),
			_ => false,
		}
	}

	/// Bounds with `max` raised to `min` when they are inverted.
	///
	/// Infinite floating-point bounds are moved onto the largest finite values.
	pub fn normalized(self) -> Self {
		match self {
			ScalarRange::Byte { min, max } => ScalarRange::Byte {
				min,
				max: max.max(min),
			},
			ScalarRange::Char { min, max } => ScalarRange::Char {
				min,
				max: max.max(min),
			},
			ScalarRange::Short { min, max } => ScalarRange::Short {
				min,
				max: max.max(min),
			},
			ScalarRange::Int { min, max } => ScalarRange::Int {
				min,
				max: max.max(min),
			},
			ScalarRange::Long { min, max } => ScalarRange::Long {
				min,
				max: max.max(min),
			},
			ScalarRange::Float { min, max } => {
				let min = min.clamp(f32::MIN, f32::MAX);
				let max = max.clamp(f32::MIN, f32::MAX);
				ScalarRange::Float {
					min,
					max: if min > max { min } else { max },
				}
			}
			ScalarRange::Double { min, max } => {
				let min = min.clamp(f64::MIN, f64::MAX);
				let max = max.clamp(f64::MIN, f64::MAX);
				ScalarRange::Double {
					min,
					max: if min > max { min } else { max },
				}
			}
		}
	}
}

/// Settings for a collection, array or map attribute.
#[derive(Debug, Clone, Default)]
pub struct CollectionDirective {
	/// Target number of elements or entries.
	pub count: usize,
	/// Source of elements for collections and arrays.
	pub element: Option<Arc<dyn ValueStrategy>>,
	/// Source of map keys.
	pub key: Option<Arc<dyn ValueStrategy>>,
	/// Source of map values.
	pub value: Option<Arc<dyn ValueStrategy>>,
}

impl CollectionDirective {
	pub fn with_count(count: usize) -> Self {
		Self {
			count,
			..Self::default()
		}
	}

	pub fn element_strategy(mut self, strategy: impl ValueStrategy + 'static) -> Self {
		self.element = Some(Arc::new(strategy));
		self
	}

	pub fn key_strategy(mut self, strategy: impl ValueStrategy + 'static) -> Self {
		self.key = Some(Arc::new(strategy));
		self
	}

	pub fn value_strategy(mut self, strategy: impl ValueStrategy + 'static) -> Self {
		self.value = Some(Arc::new(strategy));
		self
	}
}

/// A single directive on a field or parameter.
#[derive(Debug, Clone)]
pub enum Directive {
	Range(ScalarRange),
	/// Exact textual value, converted to the target type.
	Precise(String),
	StringLength(usize),
	Collection(CollectionDirective),
	/// Replaces normal manufacturing for the attribute.
	Strategy(Arc<dyn ValueStrategy>),
	/// Skips the attribute during population.
	Exclude,
	/// Free-form marker, matched against the provider's excluded set.
	Marker(String),
}

impl Directive {
	/// Convenience constructor for a strategy directive.
	pub fn strategy(strategy: impl ValueStrategy + 'static) -> Self {
		Directive::Strategy(Arc::new(strategy))
	}

	pub fn tag(&self) -> DirectiveTag {
		match self {
			Directive::Range(_) => DirectiveTag::Range,
			Directive::Precise(_) => DirectiveTag::Precise,
			Directive::StringLength(_) => DirectiveTag::StringLength,
			Directive::Collection(_) => DirectiveTag::Collection,
			Directive::Strategy(_) => DirectiveTag::Strategy,
			Directive::Exclude => DirectiveTag::Exclude,
			Directive::Marker(name) => DirectiveTag::Marker(name.clone()),
		}
	}
}

/// Identity of a directive, independent of its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectiveTag {
	Range,
	Precise,
	StringLength,
	Collection,
	Strategy,
	Exclude,
	Marker(String),
}

/// Lookup helpers over a directive list.
pub trait DirectiveSet {
	fn range(&self) -> Option<ScalarRange>;
	fn precise(&self) -> Option<&str>;
	fn string_length(&self) -> Option<usize>;
	fn collection(&self) -> Option<&CollectionDirective>;
	fn strategy(&self) -> Option<&Arc<dyn ValueStrategy>>;
	fn has_tag_in<'a, I>(&self, tags: I) -> bool
	where
		I: IntoIterator<Item = &'a DirectiveTag>;
	/// The directives minus any collection directive.
	fn without_collection(&self) -> Vec<Directive>;
}

impl DirectiveSet for [Directive] {
	fn range(&self) -> Option<ScalarRange> {
		self.iter().find_map(|d| match d {
			Directive::Range(range) => Some(*range),
			_ => None,
		})
	}

	fn precise(&self) -> Option<&str> {
		self.iter().find_map(|d| match d {
			Directive::Precise(value) => Some(value.as_str()),
			_ => None,
		})
	}

	fn string_length(&self) -> Option<usize> {
		self.iter().find_map(|d| match d {
			Directive::StringLength(length) => Some(*length),
			_ => None,
		})
	}

	fn collection(&self) -> Option<&CollectionDirective> {
		self.iter().find_map(|d| match d {
			Directive::Collection(settings) => Some(settings),
			_ => None,
		})
	}

	fn strategy(&self) -> Option<&Arc<dyn ValueStrategy>> {
		self.iter().find_map(|d| match d {
			Directive::Strategy(strategy) => Some(strategy),
			_ => None,
		})
	}

	fn has_tag_in<'a, I>(&self, tags: I) -> bool
	where
		I: IntoIterator<Item = &'a DirectiveTag>,
	{
		let own: Vec<DirectiveTag> = self.iter().map(Directive::tag).collect();
		tags.into_iter().any(|tag| own.contains(tag))
	}

	fn without_collection(&self) -> Vec<Directive> {
		self.iter()
			.filter(|d| !matches!(d, Directive::Collection(_)))
			.cloned()
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ScalarRange::Int { min: 20, max: 10 }, ScalarRange::Int { min: 20, max: 20 })]
	#[case(ScalarRange::Int { min: 10, max: 20 }, ScalarRange::Int { min: 10, max: 20 })]
	#[case(ScalarRange::Double { min: 2.5, max: 1.0 }, ScalarRange::Double { min: 2.5, max: 2.5 })]
	#[case(ScalarRange::Char { min: 'z', max: 'a' }, ScalarRange::Char { min: 'z', max: 'z' })]
	#[case(
		ScalarRange::Double { min: f64::NEG_INFINITY, max: f64::INFINITY },
		ScalarRange::Double { min: f64::MIN, max: f64::MAX }
	)]
	#[case(
		ScalarRange::Float { min: f32::INFINITY, max: 0.0 },
		ScalarRange::Float { min: f32::MAX, max: f32::MAX }
	)]
	fn test_inverted_bounds_are_normalized(
		#[case] range: ScalarRange,
		#[case] expected: ScalarRange,
	) {
		assert_eq!(range.normalized(), expected);
	}

	#[rstest]
	#[case(ScalarRange::Double { min: f64::NAN, max: 1.0 }, true)]
	#[case(ScalarRange::Float { min: 0.0, max: f32::NAN }, true)]
	#[case(ScalarRange::Double { min: f64::NEG_INFINITY, max: 1.0 }, false)]
	#[case(ScalarRange::Int { min: 0, max: 1 }, false)]
	fn test_nan_bounds_are_detected(#[case] range: ScalarRange, #[case] expected: bool) {
		assert_eq!(range.has_nan_bound(), expected);
	}

	#[rstest]
	fn test_directive_lookup() {
		// Arrange
		let directives = vec![
			Directive::Precise("X".to_string()),
			Directive::Collection(CollectionDirective::with_count(3)),
			Directive::Marker("Skip".to_string()),
		];

		// Assert
		assert_eq!(directives.precise(), Some("X"));
		assert_eq!(directives.collection().map(|c| c.count), Some(3));
		assert!(directives.range().is_none());
		assert!(directives.has_tag_in(&[DirectiveTag::Marker("Skip".to_string())]));
		assert!(!directives.has_tag_in(&[DirectiveTag::Exclude]));
		assert_eq!(directives.without_collection().len(), 2);
	}

	#[rstest]
	fn test_fixed_value_strategy() {
		let strategy = Directive::strategy(FixedValue(Value::Int(42)));
		let directives = [strategy];

		let produced = directives.strategy().map(|s| s.value());

		assert_eq!(produced, Some(Value::Int(42)));
	}
}
