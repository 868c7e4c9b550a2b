//! Schema files describing the expected settings of a configuration.
//!
//! This module handles:
//! - TOML schema file parsing and validation
//! - Registering the object types a schema declares
//! - Checking a configuration against the schema and filling defaults

pub mod check;
pub mod parser;
pub mod types;

pub use check::SettingIssue;
pub use parser::{parse_schema_file, parse_schema_str};
pub use types::{FieldSpec, ObjectSpec, Schema, SettingSpec};
