//! Manufacture driven by a TOML provider configuration.

#![cfg(feature = "config")]

mod helpers;

use std::io::Write;
use std::sync::Arc;

use facsimile_factory::{Factory, FactoryError, ProviderConfig};
use helpers::models::{Models, chain_length, models};
use rstest::{fixture, rstest};

#[fixture]
fn fixture_models() -> Models {
	models()
}

#[rstest]
fn test_config_file_drives_manufacture(fixture_models: Models) {
	// Arrange
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(
		file,
		r#"
element_count = 2
seed = 11

[classes.Node]
max_depth = 3

[specifics]
Shape = "Circle"
"#
	)
	.unwrap();
	let config = ProviderConfig::from_file(file.path()).unwrap();
	let provider = config.into_provider(&fixture_models.registry).unwrap();
	let factory = Factory::builder(Arc::clone(&fixture_models.registry))
		.provider(provider)
		.build();

	// Act
	let node = factory.manufacture(fixture_models.node, &[]).unwrap();
	let holder = factory.manufacture(fixture_models.holder, &[]).unwrap();
	let drawing = factory.manufacture(fixture_models.drawing, &[]).unwrap();

	// Assert
	assert_eq!(chain_length(&node), 4);
	let names = holder.as_object().unwrap().get("names");
	assert_eq!(names.as_collection().map(|c| c.len()), Some(2));
	let shape = drawing.as_object().unwrap().get("shape");
	assert_eq!(shape.as_object().map(|o| o.class()), Some(fixture_models.circle));
}

#[rstest]
fn test_unknown_class_in_config_is_error(fixture_models: Models) {
	// Arrange
	let config = ProviderConfig::from_toml("[specifics]\nShape = \"Square\"\n").unwrap();

	// Act
	let result = config.into_provider(&fixture_models.registry);

	// Assert
	assert!(matches!(result, Err(FactoryError::Config(_))));
}
