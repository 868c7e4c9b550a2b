use crate::error::SerializationError;
use crate::serialization::generic_type::{GenericType, MainType};
use crate::serialization::registry::Registry;
use crate::serialization::{Serializer, generic_at, unexpected};
use crate::value::Value;

/// Convert every element of a list through the registry.
fn convert_elements(
	ty: &GenericType,
	value: Value,
	convert: impl Fn(&GenericType, Value) -> Result<Value, SerializationError>,
) -> Result<Vec<Value>, SerializationError> {
	let element = generic_at(ty, 0, 1)?;
	match value {
		Value::List(items) => items.into_iter().map(|item| convert(element, item)).collect(),
		other => Err(unexpected(ty, "a list", &other)),
	}
}

/// Ordered sequences: `list<T>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSerializer;

impl Serializer for ListSerializer {
	fn name(&self) -> &str {
		"list"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		*ty.main_type() == MainType::List
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::List(_))
	}

	fn parameters_required(&self) -> usize {
		1
	}

	fn serialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		convert_elements(ty, value, |element, item| registry.serialize(element, item)).map(Value::List)
	}

	fn deserialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		convert_elements(ty, raw, |element, item| registry.deserialize(element, item)).map(Value::List)
	}
}

/// Unordered collections: `set<T>`.
///
/// Stored as a list. Elements that become equal after conversion are
/// collapsed, keeping the first occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetSerializer;

impl SetSerializer {
	fn dedup(items: Vec<Value>) -> Value {
		let mut unique: Vec<Value> = Vec::with_capacity(items.len());
		for item in items {
			if !unique.contains(&item) {
				unique.push(item);
			}
		}
		Value::List(unique)
	}
}

impl Serializer for SetSerializer {
	fn name(&self) -> &str {
		"set"
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		*ty.main_type() == MainType::Set
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::List(_))
	}

	fn parameters_required(&self) -> usize {
		1
	}

	fn serialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		convert_elements(ty, value, |element, item| registry.serialize(element, item)).map(Self::dedup)
	}

	fn deserialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		convert_elements(ty, raw, |element, item| registry.deserialize(element, item)).map(Self::dedup)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn strings(items: &[&str]) -> Value {
		Value::List(items.iter().map(|s| Value::from(*s)).collect())
	}

	#[test]
	fn test_list_elements_are_converted() {
		let registry = Registry::default();
		let ty = GenericType::list(GenericType::of(MainType::I32));

		let typed = registry.deserialize(&ty, strings(&["1", "2", "3"])).unwrap();
		assert_eq!(
			typed,
			Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
		);
	}

	#[test]
	fn test_list_order_is_preserved() {
		let registry = Registry::default();
		let ty = GenericType::list(GenericType::of(MainType::String));
		let raw = strings(&["c", "a", "b", "a"]);
		assert_eq!(registry.deserialize(&ty, raw.clone()).unwrap(), raw);
	}

	#[test]
	fn test_nested_lists() {
		let registry = Registry::default();
		let ty = GenericType::list(GenericType::list(GenericType::of(MainType::U8)));
		let raw = Value::List(vec![strings(&["1", "2"]), strings(&[])]);

		let typed = registry.deserialize(&ty, raw).unwrap();
		assert_eq!(
			typed,
			Value::List(vec![
				Value::List(vec![Value::Int(1), Value::Int(2)]),
				Value::List(vec![]),
			])
		);
	}

	#[test]
	fn test_bad_element_fails_whole_list() {
		let registry = Registry::default();
		let ty = GenericType::list(GenericType::of(MainType::U8));
		let result = registry.deserialize(&ty, strings(&["1", "300"]));
		assert!(matches!(
			result,
			Err(SerializationError::InvalidValue { ty, .. }) if ty == GenericType::of(MainType::U8)
		));
	}

	#[test]
	fn test_set_collapses_duplicates_after_conversion() {
		let registry = Registry::default();
		let ty = GenericType::set(GenericType::of(MainType::I64));

		let typed = registry.deserialize(&ty, strings(&["1", "01", "2", "1"])).unwrap();
		assert_eq!(typed, Value::List(vec![Value::Int(1), Value::Int(2)]));
	}

	#[test]
	fn test_set_against_scalar_has_no_serializer() {
		let registry = Registry::default();
		let ty = GenericType::set(GenericType::of(MainType::String));
		assert!(matches!(
			registry.deserialize(&ty, Value::from("a")),
			Err(SerializationError::NoApplicableSerializer { .. })
		));
	}

	#[test]
	fn test_serialize_rejects_non_list() {
		let registry = Registry::default();
		let ty = GenericType::list(GenericType::of(MainType::String));
		assert!(matches!(
			registry.serialize(&ty, Value::from("a")),
			Err(SerializationError::InvalidValue { .. })
		));
	}
}
