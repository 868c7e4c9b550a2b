use crate::error::{Result, TypeParseError};
use crate::format::toml_file::value_from_toml;
use crate::serialization::{GenericType, ObjectSchema, Registry};
use serde::Deserialize;

/// Top-level contents of a schema file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Schema {
	/// Named object types usable in setting types.
	#[serde(default)]
	pub objects: Vec<ObjectSpec>,

	/// The settings a configuration is expected to hold.
	#[serde(default)]
	pub settings: Vec<SettingSpec>,
}

/// A named object type and its fields, in storage order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectSpec {
	pub name: String,

	#[serde(default)]
	pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldSpec {
	pub name: String,

	/// Type descriptor, e.g. `list<string>`.
	#[serde(rename = "type")]
	pub type_name: String,
}

/// One expected setting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SettingSpec {
	/// Path of the setting, split on `.`.
	pub path: String,

	/// Type descriptor, e.g. `map<string, u16>`.
	#[serde(rename = "type")]
	pub type_name: String,

	/// Written to the configuration when the setting is absent.
	/// Settings without a default are required.
	#[serde(default)]
	pub default: Option<toml::Value>,

	/// Comment attached to the node when the default is written.
	#[serde(default)]
	pub comment: Option<String>,
}

impl FieldSpec {
	pub fn generic_type(&self) -> std::result::Result<GenericType, TypeParseError> {
		self.type_name.parse()
	}
}

impl SettingSpec {
	pub fn generic_type(&self) -> std::result::Result<GenericType, TypeParseError> {
		self.type_name.parse()
	}
}

impl ObjectSpec {
	pub fn to_object_schema(&self) -> std::result::Result<ObjectSchema, TypeParseError> {
		self.fields
			.iter()
			.try_fold(
				ObjectSchema::new(self.name.clone()),
				|schema, field| -> std::result::Result<_, TypeParseError> {
					Ok(schema.field(field.name.clone(), field.generic_type()?))
				},
			)
	}
}

impl Schema {
	/// Add a serializer for every declared object type.
	pub fn register_objects(&self, registry: &mut Registry) -> Result<()> {
		for object in &self.objects {
			registry.register_object(object.to_object_schema()?);
		}
		Ok(())
	}

	/// The default serializers plus this schema's object types.
	pub fn registry(&self) -> Result<Registry> {
		let mut registry = Registry::default();
		self.register_objects(&mut registry)?;
		Ok(registry)
	}

	/// Check that every type parses and every default converts to its type.
	pub fn validate(&self) -> Result<()> {
		let registry = self.registry()?;
		for setting in &self.settings {
			let ty = setting.generic_type()?;
			if let Some(default) = &setting.default {
				registry.deserialize(&ty, value_from_toml(default.clone()))?;
			}
		}
		Ok(())
	}
}
