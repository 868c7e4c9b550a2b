use crate::config::{NodeSource, Storage};
use crate::error::{ConfigError, Result};
use crate::node::{ConfigurationNode, NodeKind};
use crate::value::Value;
use std::path::PathBuf;

/// Reads and writes TOML files, keeping the full node hierarchy.
///
/// Tables become mapping nodes (an empty table loads as an empty node),
/// arrays become lists and inline tables inside arrays become maps.
/// Datetimes load as strings. Comments are not preserved.
#[derive(Debug, Clone)]
pub struct TomlSource {
	storage: Storage,
}

impl TomlSource {
	pub fn new(storage: Storage) -> Self {
		TomlSource { storage }
	}

	pub fn file(path: impl Into<PathBuf>) -> Self {
		Self::new(Storage::file(path))
	}

	pub fn memory(content: impl Into<String>) -> Self {
		Self::new(Storage::memory(content))
	}

	pub fn storage(&self) -> &Storage {
		&self.storage
	}
}

impl NodeSource for TomlSource {
	fn load_to_nodes(&self) -> Result<Vec<ConfigurationNode>> {
		let text = self.storage.read()?;
		let table: toml::Table =
			toml::from_str(&text).map_err(|source| ConfigError::TomlParse { source })?;

		table
			.into_iter()
			.map(|(key, value)| node_from_toml(vec![key], value))
			.collect()
	}

	fn save_from_nodes(&mut self, nodes: &[ConfigurationNode]) -> Result<()> {
		let table = table_from_nodes(nodes)?;
		let text =
			toml::to_string(&table).map_err(|source| ConfigError::TomlSerialize { source })?;
		self.storage.write(&text)
	}
}

fn node_from_toml(path: Vec<String>, value: toml::Value) -> Result<ConfigurationNode> {
	match value {
		toml::Value::Table(table) => {
			let mut node = ConfigurationNode::new(path.clone());
			for (key, child) in table {
				let mut child_path = path.clone();
				child_path.push(key);
				node.add_child(node_from_toml(child_path, child)?)?;
			}
			Ok(node)
		}
		other => Ok(ConfigurationNode::with_value(path, value_from_toml(other))),
	}
}

fn table_from_nodes(nodes: &[ConfigurationNode]) -> Result<toml::Table> {
	let mut table = toml::Table::new();
	for node in nodes {
		let key = node.name().unwrap_or_default().to_string();
		let value = match node.kind() {
			NodeKind::Scalar => match node.value() {
				Some(value) => value_to_toml(value)?,
				None => continue,
			},
			NodeKind::Empty | NodeKind::Mapping => {
				toml::Value::Table(table_from_nodes(node.children())?)
			}
		};
		table.insert(key, value);
	}
	Ok(table)
}

/// Convert a parsed TOML value into a node value.
pub fn value_from_toml(value: toml::Value) -> Value {
	match value {
		toml::Value::String(s) => Value::String(s),
		toml::Value::Integer(i) => Value::Int(i),
		toml::Value::Float(f) => Value::Float(f),
		toml::Value::Boolean(b) => Value::Bool(b),
		toml::Value::Datetime(dt) => Value::String(dt.to_string()),
		toml::Value::Array(items) => Value::List(items.into_iter().map(value_from_toml).collect()),
		toml::Value::Table(table) => Value::Map(
			table
				.into_iter()
				.map(|(k, v)| (Value::String(k), value_from_toml(v)))
				.collect(),
		),
	}
}

/// Convert a node value into TOML.
///
/// Map keys that are plain scalars are written as their text; list or map
/// keys cannot be represented.
pub fn value_to_toml(value: &Value) -> Result<toml::Value> {
	Ok(match value {
		Value::Bool(b) => toml::Value::Boolean(*b),
		Value::Int(i) => toml::Value::Integer(*i),
		Value::Float(f) => toml::Value::Float(*f),
		Value::String(s) => toml::Value::String(s.clone()),
		Value::List(items) => {
			toml::Value::Array(items.iter().map(value_to_toml).collect::<Result<_>>()?)
		}
		Value::Map(entries) => {
			let mut table = toml::Table::new();
			for (key, entry) in entries {
				if key.is_container() {
					return Err(ConfigError::Unsupported {
						format: "TOML",
						what: format!("{} map keys", key.kind_name()),
					});
				}
				table.insert(key.to_string(), value_to_toml(entry)?);
			}
			toml::Value::Table(table)
		}
	})
}
