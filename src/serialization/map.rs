use crate::error::SerializationError;
use crate::serialization::generic_type::{GenericType, MainType};
use crate::serialization::registry::Registry;
use crate::serialization::{Serializer, generic_at, unexpected};
use crate::value::Value;
use tracing::warn;

/// Key/value mappings: `map<K, V>`.
///
/// Keys and values are converted independently. When two keys convert to
/// the same value the later entry replaces the earlier one in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapSerializer;

impl MapSerializer {
	fn convert(
		ty: &GenericType,
		value: Value,
		convert: impl Fn(&GenericType, Value) -> Result<Value, SerializationError>,
	) -> Result<Value, SerializationError> {
		let key_type = generic_at(ty, 0, 2)?;
		let value_type = generic_at(ty, 1, 2)?;
		let entries = match value {
			Value::Map(entries) => entries,
			other => return Err(unexpected(ty, "a map", &other)),
		};

		let mut converted: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
		for (key, value) in entries {
			let key = convert(key_type, key)?;
			let value = convert(value_type, value)?;
			match converted.iter_mut().find(|(existing, _)| *existing == key) {
				Some(slot) => {
					warn!(ty = %ty, key = %key, "duplicate map key after conversion");
					slot.1 = value;
				}
				None => converted.push((key, value)),
			}
		}
		Ok(Value::Map(converted))
	}
}

impl Serializer for MapSerializer {
	fn name(&self) -> &str {
		"map"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		*ty.main_type() == MainType::Map
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::Map(_))
	}

	fn parameters_required(&self) -> usize {
		2
	}

	fn serialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		Self::convert(ty, value, |t, v| registry.serialize(t, v))
	}

	fn deserialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		Self::convert(ty, raw, |t, v| registry.deserialize(t, v))
	}
}
