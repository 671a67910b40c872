//! End-to-end manufacture of model classes.

mod helpers;

use std::sync::Arc;
use std::thread;

use facsimile_factory::{Factory, FactoryError, RandomValueProvider};
use facsimile_types::{
	Constructor, ConventionIntrospector, Directive, FactoryMethod, FieldDef, FixedValue,
	InvokeError, ObjectRef, Parameter, ScalarKind, TypeRef, TypeRegistry, Value, builtin,
};
use helpers::models::{CountingExternal, Models, models};
use rstest::{fixture, rstest};

#[fixture]
fn fixture_models() -> Models {
	models()
}

#[rstest]
fn test_scalars_are_non_default(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::new());

	// Act
	let value = factory.manufacture(fixture_models.pojo, &[]).unwrap();

	// Assert
	let pojo = value.as_object().unwrap();
	assert_eq!(pojo.get("flag").as_bool(), Some(true));
	assert!(pojo.get("small").as_byte().is_some_and(|v| v != 0));
	assert!(pojo.get("initial").as_char().is_some_and(|c| c.is_ascii_alphanumeric()));
	assert!(pojo.get("count").as_int().is_some_and(|v| v != 0));
	assert!(pojo.get("total").as_long().is_some_and(|v| v != 0));
	assert!(pojo.get("ratio").as_double().is_some_and(|v| v != 0.0));
	assert!(pojo.get("boxed").as_int().is_some_and(|v| v != 0));
	assert_eq!(pojo.get("name").as_str().map(str::len), Some(10));
	let color = pojo.get("color");
	let constant = color.as_enum().unwrap();
	assert_eq!(constant.class, fixture_models.color);
	assert!(["RED", "GREEN", "BLUE"].contains(&constant.name.as_str()));
}

#[rstest]
fn test_precise_string_is_exact(fixture_models: Models) {
	let factory = fixture_models.factory(RandomValueProvider::new());

	for _ in 0..20 {
		let value = factory.manufacture(fixture_models.ranged, &[]).unwrap();
		assert_eq!(value.as_object().unwrap().get("code"), Value::from("X"));
	}
}

#[rstest]
fn test_interface_without_substitute_uses_external_once(fixture_models: Models) {
	// Arrange
	let sentinel = Value::Object(ObjectRef::new(builtin::OBJECT));
	let external = Arc::new(CountingExternal::answering(sentinel.clone()));
	let factory = Factory::builder(Arc::clone(&fixture_models.registry))
		.shared_external(external.clone())
		.build();

	// Act
	let value = factory.manufacture(fixture_models.drawing, &[]).unwrap();

	// Assert
	assert_eq!(external.calls(), 1);
	assert!(value.as_object().unwrap().get("shape").ptr_eq(&sentinel));
}

#[rstest]
fn test_interface_external_null_leaves_attribute_unset(fixture_models: Models) {
	// Arrange
	let external = Arc::new(CountingExternal::answering(Value::Null));
	let factory = Factory::builder(Arc::clone(&fixture_models.registry))
		.shared_external(external.clone())
		.build();

	// Act
	let value = factory.manufacture(fixture_models.drawing, &[]).unwrap();

	// Assert
	assert_eq!(external.calls(), 1);
	assert!(!value.as_object().unwrap().contains("shape"));
}

#[rstest]
fn test_concrete_class_without_working_constructor_uses_external() {
	// Arrange
	let mut registry = TypeRegistry::new();
	let builder = registry.class("Brittle").unwrap();
	let id = builder.id();
	let brittle = builder
		.field("name", TypeRef::string())
		.constructor(Constructor::new(Vec::new(), |_| {
			Err(InvokeError::Failed("constructor refused".to_string()))
		}))
		.factory(FactoryMethod::new(
			"create",
			id,
			vec![Parameter::new(TypeRef::string())],
			|_| Err(InvokeError::Failed("factory refused".to_string())),
		))
		.build()
		.unwrap();
	let sentinel = Value::Object(ObjectRef::new(builtin::OBJECT));
	let external = Arc::new(CountingExternal::answering(sentinel.clone()));
	let factory = Factory::builder(Arc::new(registry))
		.shared_external(external.clone())
		.build();

	// Act
	let value = factory.manufacture(brittle, &[]).unwrap();

	// Assert
	assert_eq!(external.calls(), 1);
	assert!(value.ptr_eq(&sentinel));
}

#[rstest]
fn test_interface_with_substitute_builds_implementation(fixture_models: Models) {
	// Arrange
	let provider = RandomValueProvider::builder()
		.concrete_class(fixture_models.shape, fixture_models.circle)
		.build();
	let factory = fixture_models.factory(provider);

	// Act
	let value = factory.manufacture(fixture_models.drawing, &[]).unwrap();

	// Assert
	let shape = value.as_object().unwrap().get("shape");
	let circle = shape.as_object().unwrap();
	assert_eq!(circle.class(), fixture_models.circle);
	assert!(circle.get("radius").as_double().is_some());
}

#[rstest]
fn test_generic_arguments_bound_through_inheritance(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::new());

	// Act
	let value = factory.manufacture(fixture_models.named_pair, &[]).unwrap();

	// Assert
	let pair = value.as_object().unwrap();
	assert!(pair.get("first").as_str().is_some());
	assert!(pair.get("second").as_int().is_some());
}

#[rstest]
fn test_generic_arguments_supplied_by_caller(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::new());
	let args = [TypeRef::boxed(ScalarKind::Long), TypeRef::list_of(TypeRef::string())];

	// Act
	let value = factory.manufacture(fixture_models.pair, &args).unwrap();

	// Assert
	let pair = value.as_object().unwrap();
	assert!(pair.get("first").as_long().is_some());
	assert_eq!(pair.get("second").as_collection().map(|c| c.len()), Some(5));
}

#[rstest]
fn test_missing_type_arguments_is_wrapped_error(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::new());

	// Act
	let error = factory
		.manufacture(fixture_models.pair, &[TypeRef::string()])
		.unwrap_err();

	// Assert
	assert!(matches!(
		error,
		FactoryError::Manufacture { ref target, .. } if target == "Pair<String>"
	));
	assert!(matches!(
		error.root_cause(),
		FactoryError::MissingTypeArguments { found: 1, .. }
	));
}

#[rstest]
fn test_incompatible_attribute_strategy_is_error() {
	// Arrange
	let mut registry = TypeRegistry::new();
	let class = registry
		.class("Counter")
		.unwrap()
		.field_with(
			FieldDef::new("hits", TypeRef::boxed(ScalarKind::Int))
				.with_directive(Directive::strategy(FixedValue(Value::from("many")))),
		)
		.default_constructor()
		.build()
		.unwrap();
	let factory = Factory::new(Arc::new(registry));

	// Act
	let error = factory.manufacture(class, &[]).unwrap_err();

	// Assert
	assert!(matches!(
		error.root_cause(),
		FactoryError::IncompatibleStrategyValue { .. }
	));
}

#[rstest]
fn test_attribute_strategy_used_verbatim() {
	// Arrange
	let mut registry = TypeRegistry::new();
	let class = registry
		.class("Counter")
		.unwrap()
		.field_with(
			FieldDef::new("hits", TypeRef::boxed(ScalarKind::Int))
				.with_directive(Directive::strategy(FixedValue(Value::Int(-3)))),
		)
		.default_constructor()
		.build()
		.unwrap();
	let factory = Factory::new(Arc::new(registry));

	// Act
	let value = factory.manufacture(class, &[]).unwrap();

	// Assert
	assert_eq!(value.as_object().unwrap().get("hits"), Value::Int(-3));
}

#[rstest]
fn test_excluded_marker_and_field_are_skipped() {
	// Arrange
	let mut registry = TypeRegistry::new();
	let class = registry
		.class("Audit")
		.unwrap()
		.field("kept", TypeRef::string())
		.field_with(
			FieldDef::new("internal", TypeRef::string())
				.with_directive(Directive::Marker("internal".to_string())),
		)
		.field("hidden", TypeRef::string())
		.default_constructor()
		.build()
		.unwrap();
	let factory = Factory::builder(Arc::new(registry))
		.provider(RandomValueProvider::builder().exclude_marker("internal").build())
		.introspector(ConventionIntrospector::new().exclude_field(class, "hidden"))
		.build();

	// Act
	let value = factory.manufacture(class, &[]).unwrap();

	// Assert
	let audit = value.as_object().unwrap();
	assert_eq!(audit.field_names(), vec!["kept".to_string()]);
}

#[rstest]
fn test_populate_existing_instance(fixture_models: Models) {
	// Arrange
	let factory = fixture_models.factory(RandomValueProvider::new());
	let instance = Value::Object(ObjectRef::new(fixture_models.pojo));

	// Act
	let populated = factory.populate(&instance, &[]).unwrap();

	// Assert
	assert!(populated.ptr_eq(&instance));
	assert!(instance.as_object().unwrap().get("name").as_str().is_some());
}

#[rstest]
fn test_concurrent_callers_share_one_factory(fixture_models: Models) {
	// Arrange
	let factory = Arc::new(fixture_models.factory(RandomValueProvider::new()));
	let node = fixture_models.node;

	// Act
	let handles: Vec<_> = (0..4)
		.map(|_| {
			let factory = Arc::clone(&factory);
			thread::spawn(move || {
				(0..10)
					.map(|_| {
						helpers::models::chain_length(&factory.manufacture(node, &[]).unwrap())
					})
					.collect::<Vec<_>>()
			})
		})
		.collect();

	// Assert
	for handle in handles {
		let lengths = handle.join().unwrap();
		assert!(lengths.iter().all(|&links| links == 2));
	}
}
