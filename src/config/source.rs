use crate::error::Result;
use crate::node::ConfigurationNode;

/// A format adapter that loads and saves a whole configuration tree.
///
/// `load_to_nodes` returns the ordered top-level nodes; each node's name is
/// its root path segment. `save_from_nodes` receives the same shape back.
/// Errors from the underlying format or I/O are returned unchanged.
pub trait NodeSource {
	fn load_to_nodes(&self) -> Result<Vec<ConfigurationNode>>;

	fn save_from_nodes(&mut self, nodes: &[ConfigurationNode]) -> Result<()>;

	/// Fold a path into the depth this format can store.
	fn ensure_correct_path(&self, path: Vec<String>) -> Vec<String> {
		path
	}
}

impl<S: NodeSource + ?Sized> NodeSource for Box<S> {
	fn load_to_nodes(&self) -> Result<Vec<ConfigurationNode>> {
		(**self).load_to_nodes()
	}

	fn save_from_nodes(&mut self, nodes: &[ConfigurationNode]) -> Result<()> {
		(**self).save_from_nodes(nodes)
	}

	fn ensure_correct_path(&self, path: Vec<String>) -> Vec<String> {
		(**self).ensure_correct_path(path)
	}
}
