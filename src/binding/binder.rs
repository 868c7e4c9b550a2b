use crate::error::Result;
use crate::node::{ConfigurationNode, display_path, split_path};
use crate::serialization::{ConfigType, Registry};
use tracing::trace;

/// Whether a binding pass reads from or writes to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
	Load,
	Save,
}

/// A struct whose fields are stored in a configuration tree.
///
/// `bind` lists every field once; the same code handles both directions.
///
/// ```
/// use cfgtree::binding::{Binder, Settings};
///
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// impl Settings for Server {
///     fn bind(&mut self, binder: &mut Binder<'_>) -> cfgtree::Result<()> {
///         binder.field("host", &mut self.host)?;
///         binder.field("port", &mut self.port)
///     }
/// }
/// ```
pub trait Settings {
	fn bind(&mut self, binder: &mut Binder<'_>) -> Result<()>;
}

/// Maps fields to nodes below a path prefix.
pub struct Binder<'a> {
	mode: BindMode,
	root: &'a mut ConfigurationNode,
	registry: &'a Registry,
	separator: &'a str,
	prefix: Vec<String>,
	fix_path: &'a dyn Fn(Vec<String>) -> Vec<String>,
}

impl<'a> Binder<'a> {
	pub(crate) fn new(
		mode: BindMode,
		root: &'a mut ConfigurationNode,
		registry: &'a Registry,
		separator: &'a str,
		prefix: Vec<String>,
		fix_path: &'a dyn Fn(Vec<String>) -> Vec<String>,
	) -> Self {
		Binder {
			mode,
			root,
			registry,
			separator,
			prefix,
			fix_path,
		}
	}

	pub fn mode(&self) -> BindMode {
		self.mode
	}

	/// The path this binder's fields are relative to.
	pub fn prefix(&self) -> &[String] {
		&self.prefix
	}

	pub fn registry(&self) -> &Registry {
		self.registry
	}

	/// Bind one field stored at `path` below the prefix.
	///
	/// On load a stored value replaces the field; if nothing is stored the
	/// field's current value is written to the tree instead. On save the
	/// field is always written.
	pub fn field<T: ConfigType>(&mut self, path: &str, value: &mut T) -> Result<()> {
		let segments = self.resolve(path);
		let node = self.root.node_mut(&segments)?;
		match self.mode {
			BindMode::Load => match node.get::<T>(self.registry)? {
				Some(loaded) => *value = loaded,
				None => {
					trace!(path = %display_path(&segments), "writing default");
					node.clear();
					node.set(self.registry, value)?;
				}
			},
			BindMode::Save => node.set(self.registry, value)?,
		}
		Ok(())
	}

	/// Bind a nested settings struct under `path` below the prefix.
	pub fn nested<S: Settings + ?Sized>(&mut self, path: &str, settings: &mut S) -> Result<()> {
		let mut prefix = self.prefix.clone();
		prefix.extend(split_path(path, self.separator));
		let mut child = Binder {
			mode: self.mode,
			root: &mut *self.root,
			registry: self.registry,
			separator: self.separator,
			prefix,
			fix_path: self.fix_path,
		};
		settings.bind(&mut child)
	}

	/// The node at the prefix, for reading or writing comments and
	/// anything the field bindings do not cover.
	pub fn node(&mut self) -> Result<&mut ConfigurationNode> {
		let segments = (self.fix_path)(self.prefix.clone());
		Ok(self.root.node_mut(&segments)?)
	}

	fn resolve(&self, path: &str) -> Vec<String> {
		let mut full = self.prefix.clone();
		full.extend(split_path(path, self.separator));
		(self.fix_path)(full)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Configuration;
	use crate::error::{ConfigError, SerializationError};
	use crate::format::{IniSource, MemorySource};
	use crate::value::Value;

	#[derive(Debug, Clone, PartialEq)]
	struct Tls {
		enabled: bool,
		ciphers: Vec<String>,
	}

	impl Settings for Tls {
		fn bind(&mut self, binder: &mut Binder<'_>) -> Result<()> {
			binder.field("enabled", &mut self.enabled)?;
			binder.field("ciphers", &mut self.ciphers)
		}
	}

	#[derive(Debug, Clone, PartialEq)]
	struct Server {
		host: String,
		port: u16,
		tls: Tls,
		loads: u32,
	}

	impl Default for Server {
		fn default() -> Self {
			Server {
				host: "localhost".to_string(),
				port: 8080,
				tls: Tls {
					enabled: false,
					ciphers: vec!["aes".to_string()],
				},
				loads: 0,
			}
		}
	}

	impl Settings for Server {
		fn bind(&mut self, binder: &mut Binder<'_>) -> Result<()> {
			binder.field("host", &mut self.host)?;
			binder.field("port", &mut self.port)?;
			binder.nested("tls", &mut self.tls)?;
			if binder.mode() == BindMode::Load {
				self.loads += 1;
			} else {
				binder.node()?.set_comment(["Server settings"]);
			}
			Ok(())
		}
	}

	#[test]
	fn test_load_writes_defaults_for_absent_fields() {
		let mut config = Configuration::new(MemorySource::new());
		config.set("server.port", &9000u16).unwrap();

		let mut server = Server::default();
		config.load_settings("server", &mut server).unwrap();

		assert_eq!(server.port, 9000);
		assert_eq!(server.host, "localhost");
		assert_eq!(server.loads, 1);
		assert_eq!(
			config.find("server.host").unwrap().value(),
			Some(&Value::from("localhost"))
		);
		assert_eq!(
			config.get::<Vec<String>>("server.tls.ciphers").unwrap(),
			Some(vec!["aes".to_string()])
		);
	}

	#[test]
	fn test_default_replaces_placeholder_nodes() {
		let mut config = Configuration::new(MemorySource::new());
		config.node_mut("server.port.unused").unwrap();

		let mut server = Server::default();
		config.load_settings("server", &mut server).unwrap();
		assert_eq!(server.port, 8080);
		assert_eq!(config.get::<u16>("server.port").unwrap(), Some(8080));
	}

	#[test]
	fn test_save_writes_every_field() {
		let mut config = Configuration::new(MemorySource::new());
		let mut server = Server::default();
		server.tls.enabled = true;

		config.save_settings("server", &mut server).unwrap();
		assert_eq!(config.get::<bool>("server.tls.enabled").unwrap(), Some(true));
		assert_eq!(config.find("server").unwrap().comment(), ["Server settings"]);

		let mut loaded = Server {
			host: String::new(),
			port: 0,
			tls: Tls {
				enabled: false,
				ciphers: Vec::new(),
			},
			loads: 0,
		};
		config.load_settings("server", &mut loaded).unwrap();
		assert_eq!(loaded.port, 8080);
		assert!(loaded.tls.enabled);
	}

	#[test]
	fn test_nested_fields_fold_for_ini() {
		let mut config = Configuration::new(IniSource::memory("[server]\ntls.enabled=true\n"));
		config.load().unwrap();

		let mut server = Server::default();
		config.load_settings("server", &mut server).unwrap();
		assert!(server.tls.enabled);
		assert!(config.find("server.tls.ciphers").is_some());
		assert_eq!(
			config.root().find(&["server", "tls.ciphers"]).unwrap().value(),
			Some(&Value::List(vec![Value::from("aes")]))
		);
	}

	#[test]
	fn test_bad_stored_value_fails_load() {
		let mut config = Configuration::new(MemorySource::new());
		config.set("server.port", &"eighty".to_string()).unwrap();

		let mut server = Server::default();
		match config.load_settings("server", &mut server).unwrap_err() {
			ConfigError::Serialization(SerializationError::InvalidValue { ty, .. }) => {
				assert_eq!(ty.to_string(), "u16");
			}
			other => panic!("Expected InvalidValue, got {other:?}"),
		}
		assert_eq!(server.port, 8080);
	}
}
