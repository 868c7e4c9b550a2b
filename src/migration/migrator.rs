use crate::error::Result;
use crate::migration::action::MigrationAction;
use crate::node::{ConfigurationNode, display_path};
use tracing::debug;

/// An ordered list of keys to migrate and the action for each.
#[derive(Debug, Default)]
pub struct ConfigMigrator {
	migrations: Vec<(Vec<String>, Box<dyn MigrationAction>)>,
}

impl ConfigMigrator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Migrate the node at `old_key` with `action`. Migrations run in the
	/// order they were added.
	pub fn add<I, S>(&mut self, old_key: I, action: impl MigrationAction + 'static) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.migrations
			.push((old_key.into_iter().map(Into::into).collect(), Box::new(action)));
		self
	}

	pub fn len(&self) -> usize {
		self.migrations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.migrations.is_empty()
	}

	/// Apply every migration whose old key exists in the tree.
	///
	/// Returns whether any node moved. The tree is left unchanged if a
	/// migration fails.
	pub fn migrate(&self, root: &mut ConfigurationNode) -> Result<bool> {
		self.migrate_with(root, &|path| path)
	}

	pub(crate) fn migrate_with(
		&self,
		root: &mut ConfigurationNode,
		fix_path: &dyn Fn(Vec<String>) -> Vec<String>,
	) -> Result<bool> {
		let mut tree = root.clone();
		let mut changed = false;

		for (old_key, action) in &self.migrations {
			let old_path = fix_path(old_key.clone());
			let Some(mut node) = tree.remove(&old_path) else {
				continue;
			};
			changed = true;

			let new_path = fix_path(action.convert_key(old_key));
			let Some((_, parents)) = new_path.split_last() else {
				debug!(from = %display_path(&old_path), "migration dropped node");
				continue;
			};

			if let Some(value) = node.value().cloned() {
				node.set_value(action.convert_value(value))?;
			}
			node.rebase(new_path.clone());
			tree.node_mut(parents)?.add_child(node)?;
			debug!(
				from = %display_path(&old_path),
				to = %display_path(&new_path),
				"migrated node"
			);
		}

		*root = tree;
		Ok(changed)
	}
}
