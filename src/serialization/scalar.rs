use crate::error::SerializationError;
use crate::serialization::generic_type::{GenericType, MainType};
use crate::serialization::registry::Registry;
use crate::serialization::{Serializer, invalid, unexpected};
use crate::value::Value;

// Scalar serializers leave canonical values untouched. Text formats store
// everything as strings, so deserialization also coerces string raw values.

/// Strings. Any non-container raw value deserializes to its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer for StringSerializer {
	fn name(&self) -> &str {
		"string"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		*ty.main_type() == MainType::String
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && !raw.is_container()
	}

	fn serialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		match value {
			Value::String(_) => Ok(value),
			other => Err(unexpected(ty, "a string", &other)),
		}
	}

	fn deserialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		match raw {
			Value::String(_) => Ok(raw),
			Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(Value::String(raw.to_string())),
			other => Err(unexpected(ty, "a scalar", &other)),
		}
	}
}

/// Booleans. Accepts `true`/`false` text in any case.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanSerializer;

impl Serializer for BooleanSerializer {
	fn name(&self) -> &str {
		"bool"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		*ty.main_type() == MainType::Bool
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::Bool(_) | Value::String(_))
	}

	fn serialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		match value {
			Value::Bool(_) => Ok(value),
			other => Err(unexpected(ty, "a bool", &other)),
		}
	}

	fn deserialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		match raw {
			Value::Bool(_) => Ok(raw),
			Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
				"true" => Ok(Value::Bool(true)),
				"false" => Ok(Value::Bool(false)),
				_ => Err(invalid(ty, format!("'{text}' is not a boolean"))),
			},
			other => Err(unexpected(ty, "a bool", &other)),
		}
	}
}

/// All fixed-width integer kinds, range-checked against the declared width.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerSerializer;

impl IntegerSerializer {
	fn check_range(ty: &GenericType, number: i64) -> Result<Value, SerializationError> {
		match ty.main_type().integer_bounds() {
			Some((min, max)) if number < min || number > max => Err(invalid(
				ty,
				format!("{number} is out of range [{min}, {max}]"),
			)),
			_ => Ok(Value::Int(number)),
		}
	}
}

impl Serializer for IntegerSerializer {
	fn name(&self) -> &str {
		"integer"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		ty.main_type().is_integer()
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::Int(_) | Value::Float(_) | Value::String(_))
	}

	fn serialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		match value {
			Value::Int(number) => Self::check_range(ty, number),
			other => Err(unexpected(ty, "an integer", &other)),
		}
	}

	fn deserialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		match raw {
			Value::Int(number) => Self::check_range(ty, number),
			Value::Float(number) if number.fract() == 0.0 && number.abs() < 9.2e18 => {
				Self::check_range(ty, number as i64)
			}
			Value::Float(number) => Err(invalid(ty, format!("{number} is not a whole number"))),
			Value::String(text) => {
				let number = text
					.trim()
					.parse::<i64>()
					.map_err(|e| invalid(ty, format!("'{text}' is not an integer: {e}")))?;
				Self::check_range(ty, number)
			}
			other => Err(unexpected(ty, "an integer", &other)),
		}
	}
}

/// `f32` and `f64`. Integers widen to floats on deserialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatSerializer;

impl FloatSerializer {
	/// Finite numbers must stay finite at the target width.
	fn check_range(ty: &GenericType, number: f64) -> Result<Value, SerializationError> {
		if *ty.main_type() == MainType::F32 && number.is_finite() && (number as f32).is_infinite() {
			return Err(invalid(ty, format!("{number} is out of range")));
		}
		Ok(Value::Float(number))
	}
}

impl Serializer for FloatSerializer {
	fn name(&self) -> &str {
		"float"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		ty.main_type().is_float()
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::Int(_) | Value::Float(_) | Value::String(_))
	}

	fn serialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		match value {
			Value::Float(number) => Self::check_range(ty, number),
			other => Err(unexpected(ty, "a float", &other)),
		}
	}

	fn deserialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		match raw {
			Value::Float(number) => Self::check_range(ty, number),
			Value::Int(number) => Self::check_range(ty, number as f64),
			Value::String(text) => {
				let number = text
					.trim()
					.parse::<f64>()
					.map_err(|e| invalid(ty, format!("'{text}' is not a number: {e}")))?;
				Self::check_range(ty, number)
			}
			other => Err(unexpected(ty, "a float", &other)),
		}
	}
}

/// Single characters, stored as one-character strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharSerializer;

impl CharSerializer {
	fn check(ty: &GenericType, value: Value) -> Result<Value, SerializationError> {
		if matches!(&value, Value::String(text) if text.chars().count() == 1) {
			return Ok(value);
		}
		match value {
			Value::String(text) => Err(invalid(
				ty,
				format!("'{text}' is not a single character"),
			)),
			other => Err(unexpected(ty, "a character", &other)),
		}
	}
}

impl Serializer for CharSerializer {
	fn name(&self) -> &str {
		"char"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		*ty.main_type() == MainType::Char
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::String(_))
	}

	fn serialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		Self::check(ty, value)
	}

	fn deserialize(
		&self,
		_registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		Self::check(ty, raw)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ty(main: MainType) -> GenericType {
		GenericType::of(main)
	}

	#[test]
	fn test_canonical_values_pass_through() {
		let registry = Registry::default();
		let cases = [
			(ty(MainType::String), Value::from("text")),
			(ty(MainType::Bool), Value::Bool(true)),
			(ty(MainType::I32), Value::Int(-7)),
			(ty(MainType::F64), Value::Float(2.5)),
			(ty(MainType::Char), Value::from("x")),
		];
		for (ty, value) in cases {
			assert_eq!(registry.serialize(&ty, value.clone()).unwrap(), value);
			assert_eq!(registry.deserialize(&ty, value.clone()).unwrap(), value);
		}
	}

	#[test]
	fn test_coerce_from_text() {
		let registry = Registry::default();
		assert_eq!(
			registry.deserialize(&ty(MainType::U16), Value::from(" 8080 ")).unwrap(),
			Value::Int(8080)
		);
		assert_eq!(
			registry.deserialize(&ty(MainType::Bool), Value::from("TRUE")).unwrap(),
			Value::Bool(true)
		);
		assert_eq!(
			registry.deserialize(&ty(MainType::F32), Value::from("0.25")).unwrap(),
			Value::Float(0.25)
		);
		assert_eq!(
			registry.deserialize(&ty(MainType::F64), Value::Int(3)).unwrap(),
			Value::Float(3.0)
		);
		assert_eq!(
			registry.deserialize(&ty(MainType::String), Value::Int(42)).unwrap(),
			Value::from("42")
		);
	}

	#[test]
	fn test_integer_range_checked() {
		let registry = Registry::default();
		let result = registry.deserialize(&ty(MainType::U8), Value::Int(256));
		match result.unwrap_err() {
			SerializationError::InvalidValue { reason, .. } => {
				assert!(reason.contains("out of range"));
			}
			other => panic!("Expected InvalidValue, got {other:?}"),
		}

		assert!(registry.serialize(&ty(MainType::I8), Value::Int(-129)).is_err());
		assert!(registry.deserialize(&ty(MainType::U32), Value::from("-1")).is_err());
	}

	#[test]
	fn test_f32_range_checked() {
		let registry = Registry::default();
		match registry.deserialize(&ty(MainType::F32), Value::from("1e100")).unwrap_err() {
			SerializationError::InvalidValue { reason, .. } => {
				assert!(reason.contains("out of range"));
			}
			other => panic!("Expected InvalidValue, got {other:?}"),
		}
		assert!(registry.serialize(&ty(MainType::F32), Value::Float(-1e40)).is_err());

		assert_eq!(
			registry.deserialize(&ty(MainType::F64), Value::from("1e100")).unwrap(),
			Value::Float(1e100)
		);
		assert_eq!(
			registry.deserialize(&ty(MainType::F32), Value::from("inf")).unwrap(),
			Value::Float(f64::INFINITY)
		);
	}

	#[test]
	fn test_integer_from_float() {
		let registry = Registry::default();
		assert_eq!(
			registry.deserialize(&ty(MainType::I64), Value::Float(12.0)).unwrap(),
			Value::Int(12)
		);
		assert!(registry.deserialize(&ty(MainType::I64), Value::Float(1.5)).is_err());
	}

	#[test]
	fn test_bad_text_is_invalid_value() {
		let registry = Registry::default();
		assert!(matches!(
			registry.deserialize(&ty(MainType::Bool), Value::from("maybe")),
			Err(SerializationError::InvalidValue { .. })
		));
		assert!(matches!(
			registry.deserialize(&ty(MainType::I32), Value::from("twelve")),
			Err(SerializationError::InvalidValue { .. })
		));
		assert!(matches!(
			registry.deserialize(&ty(MainType::Char), Value::from("ab")),
			Err(SerializationError::InvalidValue { .. })
		));
	}

	#[test]
	fn test_serialize_requires_canonical_shape() {
		let registry = Registry::default();
		assert!(registry.serialize(&ty(MainType::I32), Value::from("5")).is_err());
		assert!(registry.serialize(&ty(MainType::String), Value::Int(5)).is_err());
	}

	#[test]
	fn test_containers_are_not_scalars() {
		let registry = Registry::default();
		let result = registry.deserialize(&ty(MainType::String), Value::List(vec![]));
		assert!(matches!(
			result,
			Err(SerializationError::NoApplicableSerializer { .. })
		));
	}
}
