use crate::node::split_path;
use crate::value::Value;
use std::fmt;

/// Converts an old key, and the value stored there, to their new form.
pub trait MigrationAction: fmt::Debug {
	/// The new key for a node found at `key`. An empty key drops the node.
	fn convert_key(&self, key: &[String]) -> Vec<String>;

	/// The new value for a scalar node. Defaults to the value unchanged.
	fn convert_value(&self, value: Value) -> Value {
		value
	}
}

/// Move a node to a fixed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKey {
	key: Vec<String>,
}

impl NewKey {
	pub fn new<I, S>(key: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		NewKey {
			key: key.into_iter().map(Into::into).collect(),
		}
	}
}

impl MigrationAction for NewKey {
	fn convert_key(&self, _key: &[String]) -> Vec<String> {
		self.key.clone()
	}
}

/// Move a node to a key built from a template.
///
/// Every `%` in the template is replaced with the old key joined by the
/// separator, and the result is split on the separator again:
/// `legacy.%` moves `a.b` to `legacy.a.b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJoinedKey {
	template: String,
	separator: String,
}

impl NewJoinedKey {
	pub fn new(template: impl Into<String>) -> Self {
		NewJoinedKey {
			template: template.into(),
			separator: ".".to_string(),
		}
	}

	pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = separator.into();
		self
	}
}

impl MigrationAction for NewJoinedKey {
	fn convert_key(&self, key: &[String]) -> Vec<String> {
		let joined = key.join(&self.separator);
		split_path(&self.template.replace('%', &joined), &self.separator)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(parts: &[&str]) -> Vec<String> {
		parts.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_new_key_ignores_old_key() {
		let action = NewKey::new(["server", "port"]);
		assert_eq!(action.convert_key(&key(&["port"])), ["server", "port"]);
		assert_eq!(action.convert_value(Value::Int(1)), Value::Int(1));
	}

	#[test]
	fn test_new_joined_key() {
		let action = NewJoinedKey::new("legacy.%");
		assert_eq!(action.convert_key(&key(&["a", "b"])), ["legacy", "a", "b"]);

		let action = NewJoinedKey::new("%_old").with_separator("/");
		assert_eq!(action.convert_key(&key(&["x", "y"])), ["x", "y_old"]);
	}
}
