//! Type-directed conversion between typed values and tree-storable values.
//!
//! This module handles:
//! - Generic type descriptors used as dispatch keys
//! - The ordered serializer registry (first applicable serializer wins)
//! - Built-in scalar, collection, map and nested-object serializers
//! - The `ConfigType` bridge between Rust types and values

pub mod collection;
pub mod generic_type;
pub mod map;
pub mod object;
pub mod registry;
pub mod scalar;
pub mod typed;

pub use collection::{ListSerializer, SetSerializer};
pub use generic_type::{GenericType, MainType};
pub use map::MapSerializer;
pub use object::{ObjectSchema, ObjectSerializer};
pub use registry::Registry;
pub use scalar::{BooleanSerializer, CharSerializer, FloatSerializer, IntegerSerializer, StringSerializer};
pub use typed::ConfigType;

use crate::error::SerializationError;
use crate::value::Value;
use std::fmt;

/// A strategy converting values of one family of types.
///
/// `serialize` turns a value in its canonical typed shape into the shape
/// stored in the tree; `deserialize` goes the other way and may coerce raw
/// values read from text formats. Container serializers recurse through the
/// registry for their element types.
pub trait Serializer: fmt::Debug {
	/// Name used in logs.
	fn name(&self) -> &str;

	/// Whether this serializer handles the declared type.
	fn is_applicable(&self, ty: &GenericType) -> bool;

	/// Whether this serializer can deserialize `raw` as the declared type.
	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		let _ = raw;
		self.is_applicable(ty)
	}

	/// Number of generic parameters the declared type must carry.
	fn parameters_required(&self) -> usize {
		0
	}

	fn serialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError>;

	fn deserialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError>;
}

/// Build an `InvalidValue` error for `ty`.
pub(crate) fn invalid(ty: &GenericType, reason: impl Into<String>) -> SerializationError {
	SerializationError::InvalidValue {
		ty: ty.clone(),
		reason: reason.into(),
	}
}

/// Build an `InvalidValue` error describing a shape mismatch.
pub(crate) fn unexpected(ty: &GenericType, expected: &str, found: &Value) -> SerializationError {
	invalid(
		ty,
		format!("expected {expected}, found {}", found.kind_name()),
	)
}

/// Get the generic parameter at `index`, or an arity error.
pub(crate) fn generic_at(
	ty: &GenericType,
	index: usize,
	required: usize,
) -> Result<&GenericType, SerializationError> {
	ty.generics()
		.get(index)
		.ok_or_else(|| SerializationError::ArityMismatch {
			ty: ty.clone(),
			expected: required,
			found: ty.generics().len(),
		})
}
