//! Recursion bounds, memoization and read-only descent.

mod helpers;

use std::sync::Arc;

use facsimile_factory::{Factory, RandomValueProvider, ValueProvider};
use facsimile_types::{ObjectRef, TypeRef, TypeRegistry, Value};
use helpers::models::{CountingExternal, Models, chain_length, models};
use rstest::{fixture, rstest};

#[fixture]
fn fixture_models() -> Models {
	models()
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(4)]
fn test_self_reference_chain_is_max_depth_plus_one(
	fixture_models: Models,
	#[case] max_depth: usize,
) {
	// Arrange
	let provider = RandomValueProvider::builder().max_depth(max_depth).build();
	let factory = fixture_models.factory(provider);

	// Act
	let root = factory.manufacture(fixture_models.node, &[]).unwrap();

	// Assert
	assert_eq!(chain_length(&root), max_depth + 1);
}

#[rstest]
fn test_depth_limit_diverts_to_external(fixture_models: Models) {
	// Arrange
	let external = Arc::new(CountingExternal::answering(Value::Null));
	let factory = Factory::builder(Arc::clone(&fixture_models.registry))
		.provider(RandomValueProvider::builder().max_depth(1).build())
		.shared_external(external.clone())
		.build();

	// Act
	let root = factory.manufacture(fixture_models.node, &[]).unwrap();

	// Assert
	assert_eq!(chain_length(&root), 2);
	assert_eq!(external.calls(), 1);
}

#[rstest]
fn test_per_class_depth_override(fixture_models: Models) {
	let provider = RandomValueProvider::builder()
		.max_depth(0)
		.max_depth_for(fixture_models.node, 3)
		.build();
	let factory = fixture_models.factory(provider);

	let root = factory.manufacture(fixture_models.node, &[]).unwrap();

	assert_eq!(chain_length(&root), 4);
}

#[rstest]
fn test_memoization_shares_instances(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::builder().memoization(true).build());

	// Act
	let value = factory.manufacture(fixture_models.twins, &[]).unwrap();

	// Assert
	let twins = value.as_object().unwrap();
	assert!(twins.get("left").ptr_eq(&twins.get("right")));
}

#[rstest]
fn test_without_memoization_instances_are_distinct(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::new());

	// Act
	let value = factory.manufacture(fixture_models.twins, &[]).unwrap();

	// Assert
	let twins = value.as_object().unwrap();
	assert!(twins.get("left").as_object().is_some());
	assert!(!twins.get("left").ptr_eq(&twins.get("right")));
}

#[rstest]
fn test_memoized_self_reference_points_at_live_instance(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::builder().memoization(true).build());

	// Act
	let root = factory.manufacture(fixture_models.node, &[]).unwrap();

	// Assert
	let next = root.as_object().unwrap().get("next");
	assert!(next.ptr_eq(&root));
}

#[rstest]
fn test_memoization_cache_survives_calls_until_cleared(fixture_models: Models) {
	// Arrange
	let provider: Arc<dyn ValueProvider> =
		Arc::new(RandomValueProvider::builder().memoization(true).build());
	let factory = Factory::builder(Arc::clone(&fixture_models.registry))
		.shared_provider(Arc::clone(&provider))
		.build();

	// Act
	let first = factory.manufacture(fixture_models.circle, &[]).unwrap();
	let second = factory.manufacture(fixture_models.circle, &[]).unwrap();
	provider.clear_memoization();
	let third = factory.manufacture(fixture_models.circle, &[]).unwrap();

	// Assert
	assert!(first.ptr_eq(&second));
	assert!(!first.ptr_eq(&third));
}

#[rstest]
fn test_read_only_nested_object_is_populated(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::new());

	// Act
	let value = factory.manufacture(fixture_models.person, &[]).unwrap();

	// Assert
	let person = value.as_object().unwrap();
	let address = person.get("address");
	let address = address.as_object().unwrap();
	assert_eq!(address.class(), fixture_models.address);
	assert!(address.get("street").as_str().is_some());
	assert!(address.get("number").as_int().is_some_and(|n| n > 0));
}

#[rstest]
fn test_read_only_self_loop_halts() {
	// Arrange
	let mut registry = TypeRegistry::new();
	let builder = registry.class("Loop").unwrap();
	let id = builder.id();
	let class = builder
		.field("name", TypeRef::string())
		.field_with(
			facsimile_types::FieldDef::new("me", TypeRef::class(id))
				.with_access(facsimile_types::FieldAccess::ReadOnly),
		)
		.constructor(facsimile_types::Constructor::new(Vec::new(), move |_| {
			let object = ObjectRef::new(id);
			object.set("me", Value::Object(object.clone()));
			Ok(Value::Object(object))
		}))
		.build()
		.unwrap();
	let factory = Factory::new(Arc::new(registry));

	// Act
	let value = factory.manufacture(class, &[]).unwrap();

	// Assert
	let object = value.as_object().unwrap();
	assert!(object.get("name").as_str().is_some());
	assert!(object.get("me").ptr_eq(&value));
}
