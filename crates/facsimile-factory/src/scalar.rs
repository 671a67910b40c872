//! Scalar, string and enum values.

use facsimile_types::{DirectiveSet, EnumValue, ScalarKind, ScalarRange, Value};
use tracing::{debug, error};

use crate::error::{FactoryError, FactoryResult};
use crate::factory::Manufacturer;
use crate::provider::AttributeMetadata;

impl Manufacturer<'_> {
	/// A scalar honouring precise-value and range directives.
	pub(crate) fn scalar_value(
		&self,
		kind: ScalarKind,
		target: &str,
		meta: &AttributeMetadata<'_>,
	) -> FactoryResult<Value> {
		let provider = self.provider();

		if let Some(raw) = meta.directives.precise() {
			return parse_precise(kind, raw);
		}

		if let Some(range) = meta.directives.range() {
			if range.kind() != kind {
				return Err(unsupported(range, target));
			}
			if range.has_nan_bound() {
				error!(
					"The {:?} range for {} has a NaN bound. An error will be raised",
					range, target
				);
				return Err(FactoryError::InvalidRange {
					range: format!("{range:?}"),
					target: target.to_string(),
				});
			}
			return Ok(match range.normalized() {
				ScalarRange::Byte { min, max } => {
					Value::Byte(provider.byte_in_range(min, max, meta))
				}
				ScalarRange::Char { min, max } => {
					Value::Char(provider.char_in_range(min, max, meta))
				}
				ScalarRange::Short { min, max } => {
					Value::Short(provider.short_in_range(min, max, meta))
				}
				ScalarRange::Int { min, max } => Value::Int(provider.int_in_range(min, max, meta)),
				ScalarRange::Long { min, max } => {
					Value::Long(provider.long_in_range(min, max, meta))
				}
				ScalarRange::Float { min, max } => {
					Value::Float(provider.float_in_range(min, max, meta))
				}
				ScalarRange::Double { min, max } => {
					Value::Double(provider.double_in_range(min, max, meta))
				}
			});
		}

		Ok(match kind {
			ScalarKind::Boolean => Value::Bool(provider.boolean(meta)),
			ScalarKind::Byte => Value::Byte(provider.byte(meta)),
			ScalarKind::Char => Value::Char(provider.char(meta)),
			ScalarKind::Short => Value::Short(provider.short(meta)),
			ScalarKind::Int => Value::Int(provider.int(meta)),
			ScalarKind::Long => Value::Long(provider.long(meta)),
			ScalarKind::Float => Value::Float(provider.float(meta)),
			ScalarKind::Double => Value::Double(provider.double(meta)),
		})
	}

	/// A string: the precise value verbatim, else one of the requested length.
	pub(crate) fn string_value(&self, meta: &AttributeMetadata<'_>) -> FactoryResult<Value> {
		let directives = meta.directives;
		if let Some(raw) = directives.precise() {
			return Ok(Value::Str(raw.to_string()));
		}
		if let Some(range) = directives.range() {
			return Err(unsupported(range, "String"));
		}
		let provider = self.provider();
		let value = match directives.string_length() {
			Some(length) => provider.string_of_length(length, meta),
			None => provider.string(meta),
		};
		Ok(Value::Str(value))
	}

	/// A uniformly chosen constant; null for an enum without constants.
	pub(crate) fn enum_value(
		&self,
		constants: &[String],
		meta: &AttributeMetadata<'_>,
	) -> FactoryResult<Value> {
		let Some(last) = constants.len().checked_sub(1) else {
			debug!(
				"Enum {} declares no constants, leaving it unset",
				self.registry().name(meta.class)
			);
			return Ok(Value::Null);
		};

		let ordinal = match meta.directives.precise() {
			Some(raw) => constants.iter().position(|c| c == raw).ok_or_else(|| {
				error!("{} is not a constant of {}", raw, self.registry().name(meta.class));
				FactoryError::InvalidPreciseValue {
					value: raw.to_string(),
					target: self.registry().name(meta.class).to_string(),
				}
			})?,
			None => {
				let max = i32::try_from(last).unwrap_or(i32::MAX);
				let index = self.provider().int_in_range(0, max, meta);
				usize::try_from(index).unwrap_or(0).min(last)
			}
		};

		Ok(Value::Enum(EnumValue {
			class: meta.class,
			ordinal,
			name: constants[ordinal].clone(),
		}))
	}
}

fn unsupported(range: ScalarRange, target: &str) -> FactoryError {
	error!(
		"A {} range was requested for {}. An error will be raised",
		range.kind(),
		target
	);
	FactoryError::UnsupportedScalar {
		requested: range.kind().to_string(),
		target: target.to_string(),
	}
}

fn parse_precise(kind: ScalarKind, raw: &str) -> FactoryResult<Value> {
	let parsed = match kind {
		ScalarKind::Boolean => raw.parse().ok().map(Value::Bool),
		ScalarKind::Byte => raw.parse().ok().map(Value::Byte),
		ScalarKind::Char => raw.chars().next().map(Value::Char),
		ScalarKind::Short => raw.parse().ok().map(Value::Short),
		ScalarKind::Int => raw.parse().ok().map(Value::Int),
		ScalarKind::Long => raw.parse().ok().map(Value::Long),
		ScalarKind::Float => raw.parse().ok().map(Value::Float),
		ScalarKind::Double => raw.parse().ok().map(Value::Double),
	};
	parsed.ok_or_else(|| {
		error!(
			"The precise value {} could not be converted to a {}. An error will be raised",
			raw, kind
		);
		FactoryError::InvalidPreciseValue {
			value: raw.to_string(),
			target: kind.to_string(),
		}
	})
}
