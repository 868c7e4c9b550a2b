//! Moving settings from old keys to new ones.
//!
//! This module handles:
//! - The `MigrationAction` trait converting a key and its value
//! - Built-in actions moving a node to a fixed or templated key
//! - Applying an ordered set of migrations to a tree

pub mod action;
pub mod migrator;

pub use action::{MigrationAction, NewJoinedKey, NewKey};
pub use migrator::ConfigMigrator;
