use crate::error::{ConfigError, NodeError};
use crate::node::path::display_path;
use crate::serialization::{ConfigType, GenericType, Registry};
use crate::value::Value;
use std::fmt;

/// The state a node is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Empty,
	Scalar,
	Mapping,
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			NodeKind::Empty => "empty",
			NodeKind::Scalar => "a scalar",
			NodeKind::Mapping => "a mapping",
		})
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
enum NodeState {
	#[default]
	Empty,
	Scalar(Value),
	Mapping(Vec<ConfigurationNode>),
}

/// A node in the configuration tree.
///
/// A node is identified by its path from the root and holds either nothing,
/// a scalar [`Value`], or an ordered list of named children. Transitions are
/// explicit: `set_value` turns an empty node into a scalar, `add_child` turns
/// it into a mapping and `clear` empties it again. Setting a value on a
/// mapping or adding a child to a scalar fails with [`NodeError::WrongKind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationNode {
	path: Vec<String>,
	comment: Vec<String>,
	state: NodeState,
}

impl ConfigurationNode {
	/// An empty, unnamed root node.
	pub fn root() -> Self {
		Self::default()
	}

	/// An empty node at `path`.
	pub fn new<I, S>(path: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		ConfigurationNode {
			path: path.into_iter().map(Into::into).collect(),
			..Self::default()
		}
	}

	/// A scalar node at `path`.
	pub fn with_value<I, S>(path: I, value: Value) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		ConfigurationNode {
			state: NodeState::Scalar(value),
			..Self::new(path)
		}
	}

	pub fn path(&self) -> &[String] {
		&self.path
	}

	/// The last path segment; `None` for the root.
	pub fn name(&self) -> Option<&str> {
		self.path.last().map(String::as_str)
	}

	pub fn kind(&self) -> NodeKind {
		match self.state {
			NodeState::Empty => NodeKind::Empty,
			NodeState::Scalar(_) => NodeKind::Scalar,
			NodeState::Mapping(_) => NodeKind::Mapping,
		}
	}

	pub fn comment(&self) -> &[String] {
		&self.comment
	}

	pub fn set_comment<I, S>(&mut self, lines: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.comment = lines.into_iter().map(Into::into).collect();
	}

	pub fn value(&self) -> Option<&Value> {
		match &self.state {
			NodeState::Scalar(value) => Some(value),
			_ => None,
		}
	}

	pub fn set_value(&mut self, value: Value) -> Result<(), NodeError> {
		if let NodeState::Mapping(_) = self.state {
			return Err(self.wrong_kind(NodeKind::Scalar));
		}
		self.state = NodeState::Scalar(value);
		Ok(())
	}

	/// Drop the value or children, returning the node to the empty state.
	pub fn clear(&mut self) {
		self.state = NodeState::Empty;
	}

	pub fn has_children(&self) -> bool {
		matches!(&self.state, NodeState::Mapping(children) if !children.is_empty())
	}

	pub fn children(&self) -> &[ConfigurationNode] {
		match &self.state {
			NodeState::Mapping(children) => children,
			_ => &[],
		}
	}

	pub fn into_children(self) -> Vec<ConfigurationNode> {
		match self.state {
			NodeState::Mapping(children) => children,
			_ => Vec::new(),
		}
	}

	pub fn child(&self, name: &str) -> Option<&ConfigurationNode> {
		self.children().iter().find(|c| c.name() == Some(name))
	}

	pub fn child_mut(&mut self, name: &str) -> Option<&mut ConfigurationNode> {
		match &mut self.state {
			NodeState::Mapping(children) => children.iter_mut().find(|c| c.name() == Some(name)),
			_ => None,
		}
	}

	/// Add a named child, re-rooting its path under this node.
	///
	/// A child with the same name is replaced in place and returned.
	pub fn add_child(
		&mut self,
		mut child: ConfigurationNode,
	) -> Result<Option<ConfigurationNode>, NodeError> {
		let name = child.name().ok_or(NodeError::Unnamed)?.to_string();
		let mut child_path = self.path.clone();
		child_path.push(name.clone());
		child.rebase(child_path);

		let children = self.mapping_mut()?;
		match children.iter_mut().find(|c| c.name() == Some(name.as_str())) {
			Some(existing) => Ok(Some(std::mem::replace(existing, child))),
			None => {
				children.push(child);
				Ok(None)
			}
		}
	}

	pub fn remove_child(&mut self, name: &str) -> Option<ConfigurationNode> {
		match &mut self.state {
			NodeState::Mapping(children) => {
				let index = children.iter().position(|c| c.name() == Some(name))?;
				Some(children.remove(index))
			}
			_ => None,
		}
	}

	/// Get the node at `path` below this one, creating missing nodes.
	///
	/// Intermediate nodes become mappings; the terminal node is created
	/// empty if absent. An empty path returns this node.
	pub fn node_mut<S: AsRef<str>>(
		&mut self,
		path: &[S],
	) -> Result<&mut ConfigurationNode, NodeError> {
		let mut current = self;
		for segment in path {
			current = current.child_or_insert(segment.as_ref())?;
		}
		Ok(current)
	}

	/// Look up the node at `path` without creating anything.
	pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&ConfigurationNode> {
		path.iter()
			.try_fold(self, |node, segment| node.child(segment.as_ref()))
	}

	/// Detach and return the node at `path`.
	pub fn remove<S: AsRef<str>>(&mut self, path: &[S]) -> Option<ConfigurationNode> {
		let (last, parents) = path.split_last()?;
		let mut current = self;
		for segment in parents {
			current = current.child_mut(segment.as_ref())?;
		}
		current.remove_child(last.as_ref())
	}

	/// The stored value, with a mapping read as a map of its children.
	///
	/// Empty children are skipped. Returns `None` for an empty node and for
	/// a mapping with no value anywhere below it.
	pub fn to_value(&self) -> Option<Value> {
		match &self.state {
			NodeState::Empty => None,
			NodeState::Scalar(value) => Some(value.clone()),
			NodeState::Mapping(children) => {
				let entries: Vec<_> = children
					.iter()
					.filter_map(|child| {
						let value = child.to_value()?;
						Some((Value::from(child.name()?), value))
					})
					.collect();
				(!entries.is_empty()).then_some(Value::Map(entries))
			}
		}
	}

	/// Deserialize the stored value as `ty`.
	///
	/// Returns `Ok(None)` when the node holds no value, which callers use to
	/// write a default back into the tree. A mapping node is read through
	/// [`ConfigurationNode::to_value`], so a TOML table can be read as a map
	/// or a named object.
	pub fn typed_value(
		&self,
		registry: &Registry,
		ty: &GenericType,
	) -> Result<Option<Value>, ConfigError> {
		match self.to_value() {
			Some(raw) => Ok(Some(registry.deserialize(ty, raw)?)),
			None => Ok(None),
		}
	}

	/// Serialize `value` as `ty` and store it.
	pub fn set_typed_value(
		&mut self,
		registry: &Registry,
		ty: &GenericType,
		value: Value,
	) -> Result<(), ConfigError> {
		let raw = registry.serialize(ty, value)?;
		self.set_value(raw)?;
		Ok(())
	}

	/// Read the stored value as a Rust type.
	pub fn get<T: ConfigType>(&self, registry: &Registry) -> Result<Option<T>, ConfigError> {
		let value = self.typed_value(registry, &T::generic_type())?;
		Ok(value.map(T::from_value).transpose()?)
	}

	/// Store a Rust value.
	pub fn set<T: ConfigType>(&mut self, registry: &Registry, value: &T) -> Result<(), ConfigError> {
		self.set_typed_value(registry, &T::generic_type(), value.to_value())
	}

	/// Every scalar node at or below this one, depth-first in child order.
	pub fn scalars(&self) -> Vec<&ConfigurationNode> {
		let mut out = Vec::new();
		self.collect_scalars(&mut out);
		out
	}

	fn collect_scalars<'a>(&'a self, out: &mut Vec<&'a ConfigurationNode>) {
		match &self.state {
			NodeState::Empty => {}
			NodeState::Scalar(_) => out.push(self),
			NodeState::Mapping(children) => {
				for child in children {
					child.collect_scalars(out);
				}
			}
		}
	}

	fn child_or_insert(&mut self, name: &str) -> Result<&mut ConfigurationNode, NodeError> {
		let mut child_path = self.path.clone();
		child_path.push(name.to_string());

		let children = self.mapping_mut()?;
		let index = match children.iter().position(|c| c.name() == Some(name)) {
			Some(index) => index,
			None => {
				children.push(ConfigurationNode::new(child_path));
				children.len() - 1
			}
		};
		Ok(&mut children[index])
	}

	/// The children list, turning an empty node into a mapping.
	fn mapping_mut(&mut self) -> Result<&mut Vec<ConfigurationNode>, NodeError> {
		if let NodeState::Empty = self.state {
			self.state = NodeState::Mapping(Vec::new());
		}
		match &mut self.state {
			NodeState::Mapping(children) => Ok(children),
			_ => Err(NodeError::WrongKind {
				path: display_path(&self.path),
				expected: NodeKind::Mapping,
				found: NodeKind::Scalar,
			}),
		}
	}

	pub(crate) fn rebase(&mut self, path: Vec<String>) {
		if let NodeState::Mapping(children) = &mut self.state {
			for child in children.iter_mut() {
				if let Some(name) = child.name().map(str::to_string) {
					let mut child_path = path.clone();
					child_path.push(name);
					child.rebase(child_path);
				}
			}
		}
		self.path = path;
	}

	fn wrong_kind(&self, expected: NodeKind) -> NodeError {
		NodeError::WrongKind {
			path: display_path(&self.path),
			expected,
			found: self.kind(),
		}
	}
}
