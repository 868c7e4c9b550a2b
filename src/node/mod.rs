//! The path-addressed configuration node tree.
//!
//! This module handles:
//! - Node state (empty, scalar value, or ordered named children)
//! - Path traversal with lazy creation of intermediate nodes
//! - Typed get/set through the serializer registry

pub mod path;
pub mod tree;

pub use path::{display_path, split_path};
pub use tree::{ConfigurationNode, NodeKind};
