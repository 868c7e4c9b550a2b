use crate::config::NodeSource;
use crate::error::Result;
use crate::node::ConfigurationNode;

/// Keeps the saved tree in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	nodes: Vec<ConfigurationNode>,
	saves: usize,
}

impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	/// A source whose first load yields `nodes`.
	pub fn with_nodes(nodes: Vec<ConfigurationNode>) -> Self {
		MemorySource { nodes, saves: 0 }
	}

	/// The most recently saved (or initial) top-level nodes.
	pub fn nodes(&self) -> &[ConfigurationNode] {
		&self.nodes
	}

	/// How many times the tree has been saved.
	pub fn save_count(&self) -> usize {
		self.saves
	}
}

impl NodeSource for MemorySource {
	fn load_to_nodes(&self) -> Result<Vec<ConfigurationNode>> {
		Ok(self.nodes.clone())
	}

	fn save_from_nodes(&mut self, nodes: &[ConfigurationNode]) -> Result<()> {
		self.nodes = nodes.to_vec();
		self.saves += 1;
		Ok(())
	}
}
