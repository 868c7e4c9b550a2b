use crate::error::SerializationError;
use crate::serialization::generic_type::{GenericType, MainType};
use crate::serialization::registry::Registry;
use crate::serialization::{Serializer, invalid, unexpected};
use crate::value::Value;
use tracing::warn;

/// The declared fields of a named object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSchema {
	name: String,
	fields: Vec<(String, GenericType)>,
}

impl ObjectSchema {
	pub fn new(name: impl Into<String>) -> Self {
		ObjectSchema {
			name: name.into(),
			fields: Vec::new(),
		}
	}

	/// Declare a field. Fields are serialized in declaration order.
	pub fn field(mut self, name: impl Into<String>, ty: GenericType) -> Self {
		self.fields.push((name.into(), ty));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn fields(&self) -> &[(String, GenericType)] {
		&self.fields
	}

	/// The `GenericType` naming this object.
	pub fn generic_type(&self) -> GenericType {
		GenericType::named(self.name.clone())
	}
}

/// Nested objects, stored as maps keyed by field name.
///
/// Absent fields stay absent so the binding layer can fill them with
/// defaults. Fields not declared in the schema are dropped.
#[derive(Debug, Clone)]
pub struct ObjectSerializer {
	schema: ObjectSchema,
}

impl ObjectSerializer {
	pub fn new(schema: ObjectSchema) -> Self {
		ObjectSerializer { schema }
	}

	pub fn schema(&self) -> &ObjectSchema {
		&self.schema
	}

	fn convert(
		&self,
		ty: &GenericType,
		value: Value,
		convert: impl Fn(&GenericType, Value) -> Result<Value, SerializationError>,
	) -> Result<Value, SerializationError> {
		let mut entries = match value {
			Value::Map(entries) => entries,
			other => return Err(unexpected(ty, "a map of fields", &other)),
		};

		let mut fields = Vec::with_capacity(self.schema.fields.len());
		for (name, field_type) in &self.schema.fields {
			let Some(index) = entries.iter().position(|(k, _)| k.as_str() == Some(name.as_str())) else {
				continue;
			};
			let (key, field_value) = entries.remove(index);
			let converted = convert(field_type, field_value).map_err(|e| {
				invalid(ty, format!("field '{name}': {e}"))
			})?;
			fields.push((key, converted));
		}

		for (key, _) in entries {
			warn!(object = %self.schema.name, field = %key, "dropping undeclared field");
		}

		Ok(Value::Map(fields))
	}
}

impl Serializer for ObjectSerializer {
	fn name(&self) -> &str {
		&self.schema.name
	}

	fn is_applicable(&self, ty: &GenericType) -> bool {
		matches!(ty.main_type(), MainType::Named(name) if *name == self.schema.name)
	}

	fn is_applicable_deserialize(&self, ty: &GenericType, raw: &Value) -> bool {
		self.is_applicable(ty) && matches!(raw, Value::Map(_))
	}

	fn serialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<Value, SerializationError> {
		self.convert(ty, value, |t, v| registry.serialize(t, v))
	}

	fn deserialize(
		&self,
		registry: &Registry,
		ty: &GenericType,
		raw: Value,
	) -> Result<Value, SerializationError> {
		self.convert(ty, raw, |t, v| registry.deserialize(t, v))
	}
}
