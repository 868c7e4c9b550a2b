use crate::error::SerializationError;
use crate::serialization::generic_type::{GenericType, MainType};
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// A Rust type that can be stored in a configuration node.
///
/// `generic_type` is the dispatch key handed to the serializer registry.
/// `to_value` produces the canonical typed shape (what the registry's
/// `serialize` expects) and `from_value` reads the canonical shape produced
/// by the registry's `deserialize`.
///
/// Implement this for your own types with [`GenericType::named`] and
/// register a matching object schema or serializer.
pub trait ConfigType: Sized {
	fn generic_type() -> GenericType;

	fn to_value(&self) -> Value;

	fn from_value(value: Value) -> Result<Self, SerializationError>;
}

fn mismatch<T: ConfigType>(expected: &str, found: &Value) -> SerializationError {
	SerializationError::InvalidValue {
		ty: T::generic_type(),
		reason: format!("expected {expected}, found {}", found.kind_name()),
	}
}

impl ConfigType for bool {
	fn generic_type() -> GenericType {
		GenericType::of(MainType::Bool)
	}

	fn to_value(&self) -> Value {
		Value::Bool(*self)
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		match value {
			Value::Bool(b) => Ok(b),
			other => Err(mismatch::<Self>("a bool", &other)),
		}
	}
}

impl ConfigType for String {
	fn generic_type() -> GenericType {
		GenericType::of(MainType::String)
	}

	fn to_value(&self) -> Value {
		Value::String(self.clone())
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		match value {
			Value::String(s) => Ok(s),
			other => Err(mismatch::<Self>("a string", &other)),
		}
	}
}

impl ConfigType for char {
	fn generic_type() -> GenericType {
		GenericType::of(MainType::Char)
	}

	fn to_value(&self) -> Value {
		Value::String(self.to_string())
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		let text = match value {
			Value::String(text) => text,
			other => return Err(mismatch::<Self>("a character", &other)),
		};
		let mut chars = text.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => Ok(c),
			_ => Err(SerializationError::InvalidValue {
				ty: Self::generic_type(),
				reason: format!("'{text}' is not a single character"),
			}),
		}
	}
}

macro_rules! integer_config_type {
	($($ty:ty => $main:ident),* $(,)?) => {$(
		impl ConfigType for $ty {
			fn generic_type() -> GenericType {
				GenericType::of(MainType::$main)
			}

			fn to_value(&self) -> Value {
				Value::Int(i64::from(*self))
			}

			fn from_value(value: Value) -> Result<Self, SerializationError> {
				match value {
					Value::Int(number) => <$ty>::try_from(number).map_err(|_| {
						SerializationError::InvalidValue {
							ty: Self::generic_type(),
							reason: format!("{number} is out of range"),
						}
					}),
					other => Err(mismatch::<Self>("an integer", &other)),
				}
			}
		}
	)*};
}

integer_config_type!(
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	u8 => U8,
	u16 => U16,
	u32 => U32,
);

impl ConfigType for f64 {
	fn generic_type() -> GenericType {
		GenericType::of(MainType::F64)
	}

	fn to_value(&self) -> Value {
		Value::Float(*self)
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		match value {
			Value::Float(number) => Ok(number),
			other => Err(mismatch::<Self>("a float", &other)),
		}
	}
}

impl ConfigType for f32 {
	fn generic_type() -> GenericType {
		GenericType::of(MainType::F32)
	}

	fn to_value(&self) -> Value {
		Value::Float(f64::from(*self))
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		match value {
			Value::Float(number) if number.is_finite() && (number as f32).is_infinite() => {
				Err(SerializationError::InvalidValue {
					ty: Self::generic_type(),
					reason: format!("{number} is out of range"),
				})
			}
			Value::Float(number) => Ok(number as f32),
			other => Err(mismatch::<Self>("a float", &other)),
		}
	}
}

/// Read the items of a list-shaped value.
fn list_items<T: ConfigType>(value: Value) -> Result<Vec<Value>, SerializationError> {
	match value {
		Value::List(items) => Ok(items),
		other => Err(mismatch::<T>("a list", &other)),
	}
}

/// Read the entries of a map-shaped value.
fn map_entries<T: ConfigType>(value: Value) -> Result<Vec<(Value, Value)>, SerializationError> {
	match value {
		Value::Map(entries) => Ok(entries),
		other => Err(mismatch::<T>("a map", &other)),
	}
}

impl<T: ConfigType> ConfigType for Vec<T> {
	fn generic_type() -> GenericType {
		GenericType::list(T::generic_type())
	}

	fn to_value(&self) -> Value {
		Value::List(self.iter().map(T::to_value).collect())
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		list_items::<Self>(value)?
			.into_iter()
			.map(T::from_value)
			.collect()
	}
}

impl<T: ConfigType + Ord> ConfigType for BTreeSet<T> {
	fn generic_type() -> GenericType {
		GenericType::set(T::generic_type())
	}

	fn to_value(&self) -> Value {
		Value::List(self.iter().map(T::to_value).collect())
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		list_items::<Self>(value)?
			.into_iter()
			.map(T::from_value)
			.collect()
	}
}

/// Hash containers are written in value order so saved files are stable.
impl<T: ConfigType + Eq + Hash> ConfigType for HashSet<T> {
	fn generic_type() -> GenericType {
		GenericType::set(T::generic_type())
	}

	fn to_value(&self) -> Value {
		let mut items: Vec<_> = self.iter().map(T::to_value).collect();
		items.sort_by(Value::total_cmp);
		Value::List(items)
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		list_items::<Self>(value)?
			.into_iter()
			.map(T::from_value)
			.collect()
	}
}

impl<K: ConfigType + Ord, V: ConfigType> ConfigType for BTreeMap<K, V> {
	fn generic_type() -> GenericType {
		GenericType::map(K::generic_type(), V::generic_type())
	}

	fn to_value(&self) -> Value {
		Value::Map(
			self.iter()
				.map(|(k, v)| (k.to_value(), v.to_value()))
				.collect(),
		)
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		map_entries::<Self>(value)?
			.into_iter()
			.map(|(k, v)| -> Result<(K, V), SerializationError> {
				Ok((K::from_value(k)?, V::from_value(v)?))
			})
			.collect()
	}
}

impl<K: ConfigType + Eq + Hash, V: ConfigType> ConfigType for HashMap<K, V> {
	fn generic_type() -> GenericType {
		GenericType::map(K::generic_type(), V::generic_type())
	}

	fn to_value(&self) -> Value {
		let mut entries: Vec<_> = self
			.iter()
			.map(|(k, v)| (k.to_value(), v.to_value()))
			.collect();
		entries.sort_by(|(a, _), (b, _)| a.total_cmp(b));
		Value::Map(entries)
	}

	fn from_value(value: Value) -> Result<Self, SerializationError> {
		map_entries::<Self>(value)?
			.into_iter()
			.map(|(k, v)| -> Result<(K, V), SerializationError> {
				Ok((K::from_value(k)?, V::from_value(v)?))
			})
			.collect()
	}
}
