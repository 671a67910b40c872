//! Invocable members: constructors, factory methods, accessors and methods.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::class::ClassId;
use crate::directive::Directive;
use crate::type_ref::TypeRef;
use crate::value::Value;

/// Failure raised by an invoked member.
#[derive(Debug, Clone, Error)]
pub enum InvokeError {
	#[error("invocation failed: {0}")]
	Failed(String),

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("expected {expected} arguments, got {found}")]
	ArityMismatch { expected: usize, found: usize },

	#[error("container is immutable")]
	Immutable,

	#[error("null values are not permitted")]
	NullNotPermitted,

	#[error("receiver does not hold fields: {0}")]
	InvalidReceiver(String),
}

pub type InvokeResult<T> = Result<T, InvokeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	Public,
	NonPublic,
}

/// A formal parameter of a constructor, factory or method.
#[derive(Debug, Clone)]
pub struct Parameter {
	pub ty: TypeRef,
	pub directives: Vec<Directive>,
}

impl Parameter {
	pub fn new(ty: TypeRef) -> Self {
		Self {
			ty,
			directives: Vec::new(),
		}
	}

	pub fn with_directive(mut self, directive: Directive) -> Self {
		self.directives.push(directive);
		self
	}
}

impl From<TypeRef> for Parameter {
	fn from(ty: TypeRef) -> Self {
		Parameter::new(ty)
	}
}

type BuildFn = Arc<dyn Fn(Vec<Value>) -> InvokeResult<Value> + Send + Sync>;
type ReadFn = Arc<dyn Fn(&Value) -> InvokeResult<Value> + Send + Sync>;
type WriteFn = Arc<dyn Fn(&Value, Value) -> InvokeResult<()> + Send + Sync>;
type CallFn = Arc<dyn Fn(&Value, Vec<Value>) -> InvokeResult<Value> + Send + Sync>;

fn check_arity(expected: usize, found: usize) -> InvokeResult<()> {
	if expected == found {
		Ok(())
	} else {
		Err(InvokeError::ArityMismatch { expected, found })
	}
}

/// A constructor of a class.
#[derive(Clone)]
pub struct Constructor {
	pub params: Vec<Parameter>,
	pub visibility: Visibility,
	/// Preferred constructors are tried before all others.
	pub preferred: bool,
	build: BuildFn,
}

impl Constructor {
	/// Creates a public constructor.
	pub fn new<F>(params: Vec<Parameter>, build: F) -> Self
	where
		F: Fn(Vec<Value>) -> InvokeResult<Value> + Send + Sync + 'static,
	{
		Self {
			params,
			visibility: Visibility::Public,
			preferred: false,
			build: Arc::new(build),
		}
	}

	pub fn non_public(mut self) -> Self {
		self.visibility = Visibility::NonPublic;
		self
	}

	pub fn preferred(mut self) -> Self {
		self.preferred = true;
		self
	}

	pub fn is_public(&self) -> bool {
		self.visibility == Visibility::Public
	}

	pub fn arity(&self) -> usize {
		self.params.len()
	}

	pub fn invoke(&self, args: Vec<Value>) -> InvokeResult<Value> {
		check_arity(self.params.len(), args.len())?;
		(self.build)(args)
	}
}

impl fmt::Debug for Constructor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Constructor")
			.field("params", &self.params)
			.field("visibility", &self.visibility)
			.field("preferred", &self.preferred)
			.finish_non_exhaustive()
	}
}

/// A named factory method.
#[derive(Clone)]
pub struct FactoryMethod {
	pub name: String,
	pub params: Vec<Parameter>,
	/// Declared return class.
	pub returns: ClassId,
	pub is_static: bool,
	pub preferred: bool,
	build: BuildFn,
}

impl FactoryMethod {
	/// Creates a static factory method.
	pub fn new<F>(
		name: impl Into<String>,
		returns: ClassId,
		params: Vec<Parameter>,
		build: F,
	) -> Self
	where
		F: Fn(Vec<Value>) -> InvokeResult<Value> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			params,
			returns,
			is_static: true,
			preferred: false,
			build: Arc::new(build),
		}
	}

	pub fn instance_method(mut self) -> Self {
		self.is_static = false;
		self
	}

	pub fn preferred(mut self) -> Self {
		self.preferred = true;
		self
	}

	pub fn arity(&self) -> usize {
		self.params.len()
	}

	pub fn invoke(&self, args: Vec<Value>) -> InvokeResult<Value> {
		check_arity(self.params.len(), args.len())?;
		(self.build)(args)
	}
}

impl fmt::Debug for FactoryMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FactoryMethod")
			.field("name", &self.name)
			.field("params", &self.params)
			.field("returns", &self.returns)
			.field("is_static", &self.is_static)
			.field("preferred", &self.preferred)
			.finish_non_exhaustive()
	}
}

/// Reads an attribute from a receiver.
#[derive(Clone)]
pub struct Getter {
	arity: usize,
	read: ReadFn,
}

impl Getter {
	pub fn new<F>(read: F) -> Self
	where
		F: Fn(&Value) -> InvokeResult<Value> + Send + Sync + 'static,
	{
		Self::with_arity(0, read)
	}

	/// A getter declaring `arity` parameters. Only zero-arity getters are
	/// usable for population.
	pub fn with_arity<F>(arity: usize, read: F) -> Self
	where
		F: Fn(&Value) -> InvokeResult<Value> + Send + Sync + 'static,
	{
		Self {
			arity,
			read: Arc::new(read),
		}
	}

	/// Reads the named field of an object receiver.
	pub fn field(name: impl Into<String>) -> Self {
		let name = name.into();
		Self::new(move |receiver| match receiver {
			Value::Object(object) => Ok(object.get(&name)),
			other => Err(InvokeError::InvalidReceiver(format!("{other:?}"))),
		})
	}

	pub fn arity(&self) -> usize {
		self.arity
	}

	pub fn invoke(&self, receiver: &Value) -> InvokeResult<Value> {
		(self.read)(receiver)
	}
}

impl fmt::Debug for Getter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Getter")
			.field("arity", &self.arity)
			.finish_non_exhaustive()
	}
}

/// Writes an attribute of a receiver.
#[derive(Clone)]
pub struct Setter {
	arity: usize,
	write: WriteFn,
}

impl Setter {
	pub fn new<F>(write: F) -> Self
	where
		F: Fn(&Value, Value) -> InvokeResult<()> + Send + Sync + 'static,
	{
		Self::with_arity(1, write)
	}

	/// A setter declaring `arity` parameters. Only single-argument setters
	/// are usable for population.
	pub fn with_arity<F>(arity: usize, write: F) -> Self
	where
		F: Fn(&Value, Value) -> InvokeResult<()> + Send + Sync + 'static,
	{
		Self {
			arity,
			write: Arc::new(write),
		}
	}

	/// Writes the named field of an object receiver.
	pub fn field(name: impl Into<String>) -> Self {
		let name = name.into();
		Self::new(move |receiver, value| match receiver {
			Value::Object(object) => {
				object.set(name.clone(), value);
				Ok(())
			}
			other => Err(InvokeError::InvalidReceiver(format!("{other:?}"))),
		})
	}

	pub fn arity(&self) -> usize {
		self.arity
	}

	pub fn invoke(&self, receiver: &Value, value: Value) -> InvokeResult<()> {
		(self.write)(receiver, value)
	}
}

impl fmt::Debug for Setter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Setter")
			.field("arity", &self.arity)
			.finish_non_exhaustive()
	}
}

/// A named instance method.
#[derive(Clone)]
pub struct MethodDef {
	pub name: String,
	pub params: Vec<Parameter>,
	call: CallFn,
}

impl MethodDef {
	pub fn new<F>(name: impl Into<String>, params: Vec<Parameter>, call: F) -> Self
	where
		F: Fn(&Value, Vec<Value>) -> InvokeResult<Value> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			params,
			call: Arc::new(call),
		}
	}

	pub fn invoke(&self, receiver: &Value, args: Vec<Value>) -> InvokeResult<Value> {
		check_arity(self.params.len(), args.len())?;
		(self.call)(receiver, args)
	}
}

impl fmt::Debug for MethodDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MethodDef")
			.field("name", &self.name)
			.field("params", &self.params)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builtin;
	use crate::value::ObjectRef;
	use rstest::rstest;

	#[rstest]
	fn test_constructor_checks_arity() {
		// Arrange
		let ctor = Constructor::new(vec![Parameter::new(TypeRef::string())], |args| {
			Ok(args.into_iter().next().unwrap_or(Value::Null))
		});

		// Act
		let ok = ctor.invoke(vec![Value::from("a")]);
		let err = ctor.invoke(Vec::new());

		// Assert
		assert_eq!(ok.unwrap(), Value::from("a"));
		assert!(matches!(
			err,
			Err(InvokeError::ArityMismatch {
				expected: 1,
				found: 0
			})
		));
	}

	#[rstest]
	fn test_field_accessors_round_trip_through_object() {
		// Arrange
		let object = Value::Object(ObjectRef::new(builtin::OBJECT));
		let getter = Getter::field("name");
		let setter = Setter::field("name");

		// Act
		setter.invoke(&object, Value::from("bob")).unwrap();

		// Assert
		assert_eq!(getter.invoke(&object).unwrap(), Value::from("bob"));
		assert_eq!(getter.arity(), 0);
		assert_eq!(setter.arity(), 1);
	}

	#[rstest]
	fn test_field_accessor_rejects_non_object_receiver() {
		let getter = Getter::field("name");

		let result = getter.invoke(&Value::Int(1));

		assert!(matches!(result, Err(InvokeError::InvalidReceiver(_))));
	}
}
