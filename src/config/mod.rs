//! Loading and saving configuration trees.
//!
//! This module handles:
//! - The node-source contract implemented by format adapters
//! - File and in-memory storage with atomic saves
//! - The `Configuration` front end tying a tree, a registry and a source

pub mod configuration;
pub mod source;
pub mod storage;

pub use configuration::Configuration;
pub use source::NodeSource;
pub use storage::Storage;
