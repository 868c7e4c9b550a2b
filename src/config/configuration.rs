use crate::binding::{BindMode, Binder, Settings};
use crate::config::source::NodeSource;
use crate::error::Result;
use crate::migration::ConfigMigrator;
use crate::node::{ConfigurationNode, split_path};
use crate::serialization::{ConfigType, GenericType, Registry};
use crate::value::Value;
use tracing::debug;

/// A configuration tree bound to a node source.
///
/// String paths are split on the path separator (default `.`) and then
/// passed through the source's `ensure_correct_path`, so every lookup lands
/// where the format will store it.
///
/// No internal locking: share an instance across threads behind a `Mutex`.
#[derive(Debug)]
pub struct Configuration<S> {
	source: S,
	root: ConfigurationNode,
	registry: Registry,
	path_separator: String,
}

impl<S: NodeSource> Configuration<S> {
	/// An empty configuration using the default serializers.
	pub fn new(source: S) -> Self {
		Self::with_registry(source, Registry::default())
	}

	pub fn with_registry(source: S, registry: Registry) -> Self {
		Configuration {
			source,
			root: ConfigurationNode::root(),
			registry,
			path_separator: ".".to_string(),
		}
	}

	pub fn path_separator(&self) -> &str {
		&self.path_separator
	}

	pub fn set_path_separator(&mut self, separator: impl Into<String>) {
		self.path_separator = separator.into();
	}

	/// Replace the tree with the source's contents.
	///
	/// The current tree is kept if the source fails.
	pub fn load(&mut self) -> Result<()> {
		let nodes = self.source.load_to_nodes()?;
		let mut root = ConfigurationNode::root();
		for node in nodes {
			root.add_child(node)?;
		}
		debug!(nodes = root.children().len(), "loaded configuration");
		self.root = root;
		Ok(())
	}

	/// Write the whole tree to the source.
	pub fn save(&mut self) -> Result<()> {
		self.source.save_from_nodes(self.root.children())?;
		debug!(nodes = self.root.children().len(), "saved configuration");
		Ok(())
	}

	/// Split a string path and fold it for the source's format.
	pub fn split_path(&self, path: &str) -> Vec<String> {
		self.source
			.ensure_correct_path(split_path(path, &self.path_separator))
	}

	/// Get the node at `path`, creating it and any missing parents.
	pub fn node_mut(&mut self, path: &str) -> Result<&mut ConfigurationNode> {
		let segments = self.split_path(path);
		Ok(self.root.node_mut(&segments)?)
	}

	/// Get the node at pre-split `path`, creating it and any missing parents.
	pub fn node_mut_at<P: AsRef<str>>(&mut self, path: &[P]) -> Result<&mut ConfigurationNode> {
		let segments = self
			.source
			.ensure_correct_path(path.iter().map(|s| s.as_ref().to_string()).collect());
		Ok(self.root.node_mut(&segments)?)
	}

	pub fn find(&self, path: &str) -> Option<&ConfigurationNode> {
		self.root.find(&self.split_path(path))
	}

	/// Detach the node at `path`.
	pub fn remove(&mut self, path: &str) -> Option<ConfigurationNode> {
		let segments = self.split_path(path);
		self.root.remove(&segments)
	}

	/// Read the value at `path` as `ty`; `None` if nothing is stored there.
	pub fn typed(&self, path: &str, ty: &GenericType) -> Result<Option<Value>> {
		match self.find(path) {
			Some(node) => node.typed_value(&self.registry, ty),
			None => Ok(None),
		}
	}

	pub fn set_typed(&mut self, path: &str, ty: &GenericType, value: Value) -> Result<()> {
		let segments = self.split_path(path);
		self.root
			.node_mut(&segments)?
			.set_typed_value(&self.registry, ty, value)
	}

	pub fn get<T: ConfigType>(&self, path: &str) -> Result<Option<T>> {
		match self.find(path) {
			Some(node) => node.get(&self.registry),
			None => Ok(None),
		}
	}

	pub fn set<T: ConfigType>(&mut self, path: &str, value: &T) -> Result<()> {
		let segments = self.split_path(path);
		self.root.node_mut(&segments)?.set(&self.registry, value)
	}

	/// Read the value at `path`, storing `default` there if it is absent.
	pub fn get_or_insert<T: ConfigType>(&mut self, path: &str, default: T) -> Result<T> {
		let segments = self.split_path(path);
		let node = self.root.node_mut(&segments)?;
		match node.get::<T>(&self.registry)? {
			Some(value) => Ok(value),
			None => {
				debug!(path, "writing default value");
				// Drop placeholder children that hold nothing
				node.clear();
				node.set(&self.registry, &default)?;
				Ok(default)
			}
		}
	}

	/// Fill `settings` from the tree under `path`, writing back defaults for
	/// absent fields.
	pub fn load_settings<T: Settings + ?Sized>(&mut self, path: &str, settings: &mut T) -> Result<()> {
		self.bind(BindMode::Load, path, settings)
	}

	/// Store every field of `settings` in the tree under `path`.
	pub fn save_settings<T: Settings + ?Sized>(&mut self, path: &str, settings: &mut T) -> Result<()> {
		self.bind(BindMode::Save, path, settings)
	}

	/// Move old keys to their new locations. Returns whether anything moved.
	pub fn migrate(&mut self, migrator: &ConfigMigrator) -> Result<bool> {
		let source = &self.source;
		let fix_path = |path: Vec<String>| source.ensure_correct_path(path);
		migrator.migrate_with(&mut self.root, &fix_path)
	}

	fn bind<T: Settings + ?Sized>(&mut self, mode: BindMode, path: &str, settings: &mut T) -> Result<()> {
		let prefix = split_path(path, &self.path_separator);
		let source = &self.source;
		let fix_path = |path: Vec<String>| source.ensure_correct_path(path);
		let mut binder = Binder::new(
			mode,
			&mut self.root,
			&self.registry,
			&self.path_separator,
			prefix,
			&fix_path,
		);
		settings.bind(&mut binder)
	}

	pub fn root(&self) -> &ConfigurationNode {
		&self.root
	}

	pub fn root_mut(&mut self) -> &mut ConfigurationNode {
		&mut self.root
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn registry_mut(&mut self) -> &mut Registry {
		&mut self.registry
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	pub fn source_mut(&mut self) -> &mut S {
		&mut self.source
	}
}
