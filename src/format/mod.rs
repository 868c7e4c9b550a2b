//! Node-source adapters for concrete file formats.
//!
//! This module handles:
//! - INI files (two-level: sections and keys, with comments)
//! - TOML files (full hierarchy)
//! - An in-memory source for tests and embedding

pub mod ini;
pub mod memory;
pub mod toml_file;

pub use ini::IniSource;
pub use memory::MemorySource;
pub use toml_file::TomlSource;
