use crate::error::SerializationError;
use crate::serialization::collection::{ListSerializer, SetSerializer};
use crate::serialization::generic_type::GenericType;
use crate::serialization::map::MapSerializer;
use crate::serialization::object::{ObjectSchema, ObjectSerializer};
use crate::serialization::scalar::{
	BooleanSerializer, CharSerializer, FloatSerializer, IntegerSerializer, StringSerializer,
};
use crate::serialization::Serializer;
use crate::value::Value;
use tracing::trace;

/// An ordered set of serializers.
///
/// Serializers are tried in registration order and the first applicable one
/// handles the value. Register a more specific serializer with
/// [`Registry::register_first`] to override a default.
#[derive(Debug)]
pub struct Registry {
	serializers: Vec<Box<dyn Serializer>>,
}

impl Registry {
	/// Create a registry with no serializers.
	pub fn new() -> Self {
		Registry {
			serializers: Vec::new(),
		}
	}

	/// Append a serializer (lowest priority so far).
	pub fn register(&mut self, serializer: impl Serializer + 'static) -> &mut Self {
		self.serializers.push(Box::new(serializer));
		self
	}

	/// Insert a serializer ahead of all registered ones.
	pub fn register_first(&mut self, serializer: impl Serializer + 'static) -> &mut Self {
		self.serializers.insert(0, Box::new(serializer));
		self
	}

	/// Register a nested-object serializer for a named type.
	pub fn register_object(&mut self, schema: ObjectSchema) -> &mut Self {
		self.register(ObjectSerializer::new(schema))
	}

	/// Names of the registered serializers, in dispatch order.
	pub fn names(&self) -> Vec<&str> {
		self.serializers.iter().map(|s| s.name()).collect()
	}

	pub fn len(&self) -> usize {
		self.serializers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.serializers.is_empty()
	}

	/// Convert a typed value into its tree-storable form.
	pub fn serialize(&self, ty: &GenericType, value: Value) -> Result<Value, SerializationError> {
		let serializer = self.select(ty, |s| s.is_applicable(ty))?;
		trace!(ty = %ty, serializer = serializer.name(), "serialize");
		serializer.serialize(self, ty, value)
	}

	/// Convert a raw tree value into the canonical shape of `ty`.
	pub fn deserialize(&self, ty: &GenericType, raw: Value) -> Result<Value, SerializationError> {
		let serializer = self.select(ty, |s| s.is_applicable_deserialize(ty, &raw))?;
		trace!(ty = %ty, serializer = serializer.name(), "deserialize");
		serializer.deserialize(self, ty, raw)
	}

	/// Find the first serializer accepted by `predicate` whose arity matches.
	fn select(
		&self,
		ty: &GenericType,
		predicate: impl Fn(&dyn Serializer) -> bool,
	) -> Result<&dyn Serializer, SerializationError> {
		let found = ty.generics().len();
		let mut wrong_arity = None;

		for serializer in &self.serializers {
			if !predicate(serializer.as_ref()) {
				continue;
			}
			if serializer.parameters_required() == found {
				return Ok(serializer.as_ref());
			}
			wrong_arity.get_or_insert(serializer.parameters_required());
		}

		Err(match wrong_arity {
			Some(expected) => SerializationError::ArityMismatch {
				ty: ty.clone(),
				expected,
				found,
			},
			None => SerializationError::NoApplicableSerializer { ty: ty.clone() },
		})
	}
}

impl Default for Registry {
	/// The built-in serializers: string, bool, integer, float, char, list,
	/// set and map.
	fn default() -> Self {
		let mut registry = Registry::new();
		registry
			.register(StringSerializer)
			.register(BooleanSerializer)
			.register(IntegerSerializer)
			.register(FloatSerializer)
			.register(CharSerializer)
			.register(ListSerializer)
			.register(SetSerializer)
			.register(MapSerializer);
		registry
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::serialization::MainType;
	use proptest::prelude::*;

	fn string() -> GenericType {
		GenericType::of(MainType::String)
	}

	/// Upper-cases strings on the way into the tree.
	#[derive(Debug)]
	struct ShoutingSerializer;

	impl Serializer for ShoutingSerializer {
		fn name(&self) -> &str {
			"shouting"
		}

		fn is_applicable(&self, ty: &GenericType) -> bool {
			*ty.main_type() == MainType::String
		}

		fn serialize(
			&self,
			_registry: &Registry,
			_ty: &GenericType,
			value: Value,
		) -> Result<Value, SerializationError> {
			Ok(Value::String(value.to_string().to_uppercase()))
		}

		fn deserialize(
			&self,
			_registry: &Registry,
			_ty: &GenericType,
			raw: Value,
		) -> Result<Value, SerializationError> {
			Ok(Value::String(raw.to_string().to_lowercase()))
		}
	}

	#[test]
	fn test_default_registration_order() {
		let registry = Registry::default();
		assert_eq!(
			registry.names(),
			vec!["string", "bool", "integer", "float", "char", "list", "set", "map"]
		);
	}

	#[test]
	fn test_empty_registry_has_no_serializer() {
		let registry = Registry::new();
		assert!(registry.is_empty());
		match registry.serialize(&string(), Value::from("x")).unwrap_err() {
			SerializationError::NoApplicableSerializer { ty } => assert_eq!(ty, string()),
			other => panic!("Expected NoApplicableSerializer, got {other:?}"),
		}
	}

	#[test]
	fn test_first_registered_wins() {
		let mut registry = Registry::default();
		registry.register(ShoutingSerializer);
		// Appended after the default string serializer, so never selected.
		assert_eq!(
			registry.serialize(&string(), Value::from("quiet")).unwrap(),
			Value::from("quiet")
		);

		registry.register_first(ShoutingSerializer);
		assert_eq!(registry.names()[0], "shouting");
		assert_eq!(
			registry.serialize(&string(), Value::from("quiet")).unwrap(),
			Value::from("QUIET")
		);
		assert_eq!(
			registry.deserialize(&string(), Value::from("LOUD")).unwrap(),
			Value::from("loud")
		);
	}

	#[test]
	fn test_override_applies_inside_containers() {
		let mut registry = Registry::default();
		registry.register_first(ShoutingSerializer);

		let ty = GenericType::list(string());
		let raw = registry
			.serialize(&ty, Value::List(vec![Value::from("a"), Value::from("b")]))
			.unwrap();
		assert_eq!(raw, Value::List(vec![Value::from("A"), Value::from("B")]));
	}

	#[test]
	fn test_arity_mismatch() {
		let registry = Registry::default();
		let bare_list = GenericType::of(MainType::List);
		match registry
			.deserialize(&bare_list, Value::List(vec![]))
			.unwrap_err()
		{
			SerializationError::ArityMismatch {
				expected, found, ..
			} => {
				assert_eq!(expected, 1);
				assert_eq!(found, 0);
			}
			other => panic!("Expected ArityMismatch, got {other:?}"),
		}

		let string_with_args = GenericType::new(MainType::String, vec![string()]);
		assert!(matches!(
			registry.serialize(&string_with_args, Value::from("x")),
			Err(SerializationError::ArityMismatch { expected: 0, found: 1, .. })
		));
	}

	#[test]
	fn test_list_against_scalar_has_no_serializer() {
		let registry = Registry::default();
		let ty = GenericType::list(string());
		match registry.deserialize(&ty, Value::from("a")).unwrap_err() {
			SerializationError::NoApplicableSerializer { ty: reported } => assert_eq!(reported, ty),
			other => panic!("Expected NoApplicableSerializer, got {other:?}"),
		}
	}

	#[test]
	fn test_list_of_strings_round_trip() {
		let registry = Registry::default();
		let ty = GenericType::list(string());
		let raw = Value::List(vec![Value::from("a"), Value::from("b"), Value::from("c")]);

		let typed = registry.deserialize(&ty, raw.clone()).unwrap();
		assert_eq!(typed, raw);
		assert_eq!(registry.serialize(&ty, typed).unwrap(), raw);
	}

	#[test]
	fn test_unregistered_named_type() {
		let registry = Registry::default();
		let result = registry.serialize(&GenericType::named("Point"), Value::Map(vec![]));
		assert!(matches!(
			result,
			Err(SerializationError::NoApplicableSerializer { .. })
		));
	}

	proptest! {
		#[test]
		fn prop_int_map_round_trips(entries in proptest::collection::vec((any::<String>(), any::<i32>()), 0..12)) {
			let registry = Registry::default();
			let ty = GenericType::map(string(), GenericType::of(MainType::I32));
			let mut value = Vec::new();
			for (key, number) in entries {
				let key = Value::String(key);
				if !value.iter().any(|(k, _)| *k == key) {
					value.push((key, Value::Int(number.into())));
				}
			}
			let value = Value::Map(value);

			let raw = registry.serialize(&ty, value.clone()).unwrap();
			prop_assert_eq!(registry.deserialize(&ty, raw).unwrap(), value);
		}

		#[test]
		fn prop_float_list_round_trips(items in proptest::collection::vec(-1.0e9f64..1.0e9, 0..12)) {
			let registry = Registry::default();
			let ty = GenericType::list(GenericType::of(MainType::F64));
			let value = Value::List(items.into_iter().map(Value::Float).collect());

			let raw = registry.serialize(&ty, value.clone()).unwrap();
			prop_assert_eq!(registry.deserialize(&ty, raw).unwrap(), value);
		}
	}
}
