//! The untyped values stored in configuration nodes.

use std::cmp::Ordering;
use std::fmt;

/// A raw, tree-storable configuration value.
///
/// Maps keep their entries in insertion order. There is no null variant:
/// a missing value is represented by `Option::None` at the node level.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	List(Vec<Value>),
	Map(Vec<(Value, Value)>),
}

impl Value {
	/// Short name of the variant, used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::String(_) => "string",
			Value::List(_) => "list",
			Value::Map(_) => "map",
		}
	}

	/// Whether this is a list or a map.
	pub fn is_container(&self) -> bool {
		matches!(self, Value::List(_) | Value::Map(_))
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(items) => Some(items),
			_ => None,
		}
	}

	/// A total order over values: by kind, then by content. Floats use
	/// [`f64::total_cmp`].
	pub fn total_cmp(&self, other: &Value) -> Ordering {
		match (self, other) {
			(Value::Bool(a), Value::Bool(b)) => a.cmp(b),
			(Value::Int(a), Value::Int(b)) => a.cmp(b),
			(Value::Float(a), Value::Float(b)) => a.total_cmp(b),
			(Value::String(a), Value::String(b)) => a.cmp(b),
			(Value::List(a), Value::List(b)) => a
				.iter()
				.zip(b)
				.map(|(x, y)| x.total_cmp(y))
				.find(|ord| ord.is_ne())
				.unwrap_or_else(|| a.len().cmp(&b.len())),
			(Value::Map(a), Value::Map(b)) => a
				.iter()
				.zip(b)
				.map(|((ka, va), (kb, vb))| ka.total_cmp(kb).then_with(|| va.total_cmp(vb)))
				.find(|ord| ord.is_ne())
				.unwrap_or_else(|| a.len().cmp(&b.len())),
			_ => self.rank().cmp(&other.rank()),
		}
	}

	fn rank(&self) -> u8 {
		match self {
			Value::Bool(_) => 0,
			Value::Int(_) => 1,
			Value::Float(_) => 2,
			Value::String(_) => 3,
			Value::List(_) => 4,
			Value::Map(_) => 5,
		}
	}

	/// Look up a map entry by string key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		match self {
			Value::Map(entries) => entries
				.iter()
				.find(|(k, _)| k.as_str() == Some(key))
				.map(|(_, v)| v),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Bool(b) => write!(f, "{b}"),
			Value::Int(i) => write!(f, "{i}"),
			Value::Float(x) => write!(f, "{x}"),
			Value::String(s) => f.write_str(s),
			Value::List(items) => {
				f.write_str("[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Value::Map(entries) => {
				f.write_str("{")?;
				for (i, (key, value)) in entries.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{key} = {value}")?;
				}
				f.write_str("}")
			}
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::List(value)
	}
}
