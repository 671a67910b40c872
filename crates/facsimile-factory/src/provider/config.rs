//! TOML-loadable configuration for [`RandomValueProvider`].
//!
//! ```toml
//! element_count = 3
//! max_depth = 2
//! memoization = true
//! seed = 42
//! excluded_markers = ["Transient"]
//!
//! [classes.Node]
//! max_depth = 4
//!
//! [specifics]
//! Shape = "Circle"
//! ```

use std::collections::HashMap;
use std::path::Path;

use facsimile_types::{ClassId, TypeRegistry};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{
	DEFAULT_ELEMENT_COUNT, DEFAULT_MAX_DEPTH, DEFAULT_STRING_LENGTH, RandomValueProvider,
};
use crate::error::{FactoryError, FactoryResult};

/// Provider settings, with classes referred to by registry name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
	/// Default number of container elements
	pub element_count: usize,

	/// Default maximum re-entry depth per class
	pub max_depth: usize,

	/// Length of unconstrained strings
	pub string_length: usize,

	/// Reuse one instance per class within a call tree
	pub memoization: bool,

	/// RNG seed; entropy-seeded when absent
	pub seed: Option<u64>,

	/// Marker names whose attributes are skipped
	pub excluded_markers: Vec<String>,

	/// Per-class overrides keyed by class name
	pub classes: HashMap<String, ClassOverride>,

	/// Abstract or interface class name to concrete class name.
	/// Container classes always use their own default implementation.
	pub specifics: HashMap<String, String>,
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			element_count: DEFAULT_ELEMENT_COUNT,
			max_depth: DEFAULT_MAX_DEPTH,
			string_length: DEFAULT_STRING_LENGTH,
			memoization: false,
			seed: None,
			excluded_markers: Vec::new(),
			classes: HashMap::new(),
			specifics: HashMap::new(),
		}
	}
}

/// Overrides applying to a single class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassOverride {
	/// Element count for containers of this class
	pub element_count: Option<usize>,

	/// Maximum re-entry depth of this class
	pub max_depth: Option<usize>,
}

impl ProviderConfig {
	/// Load configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> FactoryResult<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| {
			FactoryError::Config(format!("failed to read {}: {}", path.display(), e))
		})?;
		Self::from_toml(&content)
	}

	/// Parse configuration from a TOML string.
	pub fn from_toml(content: &str) -> FactoryResult<Self> {
		toml::from_str(content).map_err(|e| FactoryError::Config(e.to_string()))
	}

	/// Resolves class names against `registry` and builds the provider.
	pub fn into_provider(&self, registry: &TypeRegistry) -> FactoryResult<RandomValueProvider> {
		let mut builder = RandomValueProvider::builder()
			.element_count(self.element_count)
			.max_depth(self.max_depth)
			.string_length(self.string_length)
			.memoization(self.memoization);

		if let Some(seed) = self.seed {
			builder = builder.seed(seed);
		}
		for marker in &self.excluded_markers {
			builder = builder.exclude_marker(marker.clone());
		}
		for (name, overrides) in &self.classes {
			let class = lookup(registry, name)?;
			if let Some(count) = overrides.element_count {
				builder = builder.element_count_for(class, count);
			}
			if let Some(depth) = overrides.max_depth {
				builder = builder.max_depth_for(class, depth);
			}
		}
		for (abstract_name, concrete_name) in &self.specifics {
			let class = lookup(registry, abstract_name)?;
			let concrete = lookup(registry, concrete_name)?;
			builder = builder.concrete_class(class, concrete);
		}

		Ok(builder.build())
	}
}

fn lookup(registry: &TypeRegistry, name: &str) -> FactoryResult<ClassId> {
	registry.lookup(name).ok_or_else(|| {
		error!("Class {} named in the provider configuration is not registered", name);
		FactoryError::Config(format!("unknown class: {name}"))
	})
}
