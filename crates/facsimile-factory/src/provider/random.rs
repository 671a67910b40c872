//! Random value provider used by default.

use std::collections::{HashMap, HashSet};

use facsimile_types::{ClassId, DirectiveTag, Value};
use parking_lot::{Mutex, RwLock};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
	AttributeMetadata, DEFAULT_ELEMENT_COUNT, DEFAULT_MAX_DEPTH, DEFAULT_STRING_LENGTH, MemoKey,
	ValueProvider,
};

const CHAR_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
struct Settings {
	element_count: usize,
	max_depth: usize,
	string_length: usize,
	memoization: bool,
	element_counts: HashMap<ClassId, usize>,
	max_depths: HashMap<ClassId, usize>,
	specifics: HashMap<ClassId, ClassId>,
	excluded_markers: HashSet<String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			element_count: DEFAULT_ELEMENT_COUNT,
			max_depth: DEFAULT_MAX_DEPTH,
			string_length: DEFAULT_STRING_LENGTH,
			memoization: false,
			element_counts: HashMap::new(),
			max_depths: HashMap::new(),
			specifics: HashMap::new(),
			excluded_markers: HashSet::new(),
		}
	}
}

/// Value provider producing random, non-default values.
///
/// Numbers are strictly positive, booleans are `true`, characters and strings
/// are alphanumeric. A seed makes the sequence reproducible.
#[derive(Debug)]
pub struct RandomValueProvider {
	settings: Settings,
	rng: Mutex<StdRng>,
	memo: RwLock<HashMap<MemoKey, Value>>,
}

impl Default for RandomValueProvider {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl RandomValueProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn builder() -> RandomValueProviderBuilder {
		RandomValueProviderBuilder::default()
	}

	fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
		f(&mut self.rng.lock())
	}

	fn alphanumeric(&self, length: usize) -> String {
		self.with_rng(|rng| {
			(0..length)
				.map(|_| char::from(rng.sample(Alphanumeric)))
				.collect()
		})
	}

	fn fraction(&self) -> f64 {
		self.with_rng(|rng| rng.r#gen::<f64>())
	}
}

/// Linear interpolation that cannot overflow for finite bounds.
fn interpolate(min: f64, max: f64, t: f64) -> f64 {
	let value = min * (1.0 - t) + max * t;
	if value.is_nan() {
		return min;
	}
	value.max(min).min(max)
}

/// Bound moved onto the finite range; NaN becomes `fallback`.
fn finite_f64(bound: f64, fallback: f64) -> f64 {
	if bound.is_nan() {
		fallback
	} else {
		bound.clamp(f64::MIN, f64::MAX)
	}
}

fn finite_f32(bound: f32, fallback: f32) -> f32 {
	if bound.is_nan() {
		fallback
	} else {
		bound.clamp(f32::MIN, f32::MAX)
	}
}

impl ValueProvider for RandomValueProvider {
	fn boolean(&self, _meta: &AttributeMetadata<'_>) -> bool {
		true
	}

	fn byte(&self, _meta: &AttributeMetadata<'_>) -> i8 {
		self.with_rng(|rng| rng.gen_range(1..=i8::MAX))
	}

	fn byte_in_range(&self, min: i8, max: i8, _meta: &AttributeMetadata<'_>) -> i8 {
		if min >= max {
			return min;
		}
		self.with_rng(|rng| rng.gen_range(min..=max))
	}

	fn char(&self, _meta: &AttributeMetadata<'_>) -> char {
		self.with_rng(|rng| char::from(rng.sample(Alphanumeric)))
	}

	fn char_in_range(&self, min: char, max: char, _meta: &AttributeMetadata<'_>) -> char {
		if min >= max {
			return min;
		}
		self.with_rng(|rng| {
			(0..CHAR_ATTEMPTS)
				.find_map(|_| char::from_u32(rng.gen_range(u32::from(min)..=u32::from(max))))
				.unwrap_or(min)
		})
	}

	fn short(&self, _meta: &AttributeMetadata<'_>) -> i16 {
		self.with_rng(|rng| rng.gen_range(1..=i16::MAX))
	}

	fn short_in_range(&self, min: i16, max: i16, _meta: &AttributeMetadata<'_>) -> i16 {
		if min >= max {
			return min;
		}
		self.with_rng(|rng| rng.gen_range(min..=max))
	}

	fn int(&self, _meta: &AttributeMetadata<'_>) -> i32 {
		self.with_rng(|rng| rng.gen_range(1..=i32::MAX))
	}

	fn int_in_range(&self, min: i32, max: i32, _meta: &AttributeMetadata<'_>) -> i32 {
		if min >= max {
			return min;
		}
		self.with_rng(|rng| rng.gen_range(min..=max))
	}

	fn long(&self, _meta: &AttributeMetadata<'_>) -> i64 {
		self.with_rng(|rng| rng.gen_range(1..=i64::MAX))
	}

	fn long_in_range(&self, min: i64, max: i64, _meta: &AttributeMetadata<'_>) -> i64 {
		if min >= max {
			return min;
		}
		self.with_rng(|rng| rng.gen_range(min..=max))
	}

	fn float(&self, _meta: &AttributeMetadata<'_>) -> f32 {
		self.with_rng(|rng| rng.gen_range(1.0f32..1000.0))
	}

	fn float_in_range(&self, min: f32, max: f32, _meta: &AttributeMetadata<'_>) -> f32 {
		let min = finite_f32(min, f32::MIN);
		let max = finite_f32(max, f32::MAX);
		if min >= max {
			return min;
		}
		let value = interpolate(f64::from(min), f64::from(max), self.fraction()) as f32;
		value.max(min).min(max)
	}

	fn double(&self, _meta: &AttributeMetadata<'_>) -> f64 {
		self.with_rng(|rng| rng.gen_range(1.0f64..1000.0))
	}

	fn double_in_range(&self, min: f64, max: f64, _meta: &AttributeMetadata<'_>) -> f64 {
		let min = finite_f64(min, f64::MIN);
		let max = finite_f64(max, f64::MAX);
		if min >= max {
			return min;
		}
		interpolate(min, max, self.fraction())
	}

	fn string(&self, meta: &AttributeMetadata<'_>) -> String {
		self.string_of_length(self.settings.string_length, meta)
	}

	fn string_of_length(&self, length: usize, _meta: &AttributeMetadata<'_>) -> String {
		self.alphanumeric(length)
	}

	fn element_count(&self, element: ClassId) -> usize {
		self.settings
			.element_counts
			.get(&element)
			.copied()
			.unwrap_or(self.settings.element_count)
	}

	fn max_depth(&self, class: ClassId) -> usize {
		self.settings
			.max_depths
			.get(&class)
			.copied()
			.unwrap_or(self.settings.max_depth)
	}

	fn memoization_enabled(&self) -> bool {
		self.settings.memoization
	}

	fn memoized(&self, key: &MemoKey) -> Option<Value> {
		self.memo.read().get(key).cloned()
	}

	fn memoize(&self, key: MemoKey, value: Value) {
		self.memo.write().insert(key, value);
	}

	fn clear_memoization(&self) {
		self.memo.write().clear();
	}

	fn concrete_class(&self, class: ClassId) -> ClassId {
		self.settings.specifics.get(&class).copied().unwrap_or(class)
	}

	fn excluded_directives(&self) -> HashSet<DirectiveTag> {
		let mut tags: HashSet<DirectiveTag> = self
			.settings
			.excluded_markers
			.iter()
			.cloned()
			.map(DirectiveTag::Marker)
			.collect();
		tags.insert(DirectiveTag::Exclude);
		tags
	}
}

/// Builder for [`RandomValueProvider`].
#[derive(Debug, Clone, Default)]
pub struct RandomValueProviderBuilder {
	settings: Settings,
	seed: Option<u64>,
}

impl RandomValueProviderBuilder {
	/// Makes the produced values reproducible.
	pub fn seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn element_count(mut self, count: usize) -> Self {
		self.settings.element_count = count;
		self
	}

	pub fn max_depth(mut self, depth: usize) -> Self {
		self.settings.max_depth = depth;
		self
	}

	pub fn string_length(mut self, length: usize) -> Self {
		self.settings.string_length = length;
		self
	}

	pub fn memoization(mut self, enabled: bool) -> Self {
		self.settings.memoization = enabled;
		self
	}

	/// Element count for containers whose element class is `element`.
	pub fn element_count_for(mut self, element: ClassId, count: usize) -> Self {
		self.settings.element_counts.insert(element, count);
		self
	}

	pub fn max_depth_for(mut self, class: ClassId, depth: usize) -> Self {
		self.settings.max_depths.insert(class, depth);
		self
	}

	/// Builds `concrete` whenever the interface or abstract `class` is requested.
	///
	/// Only object classes are substituted; abstract container types such as
	/// `List` always get their default implementation.
	pub fn concrete_class(mut self, class: ClassId, concrete: ClassId) -> Self {
		self.settings.specifics.insert(class, concrete);
		self
	}

	/// Skips attributes carrying `Directive::Marker(name)`.
	pub fn exclude_marker(mut self, name: impl Into<String>) -> Self {
		self.settings.excluded_markers.insert(name.into());
		self
	}

	pub fn build(self) -> RandomValueProvider {
		let rng = match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		RandomValueProvider {
			settings: self.settings,
			rng: Mutex::new(rng),
			memo: RwLock::new(HashMap::new()),
		}
	}
}
