use crate::error::{ConfigError, Result};
use crate::schema::types::Schema;
use std::path::Path;

/// Parse a schema file from the given path.
pub fn parse_schema_file(path: &Path) -> Result<Schema> {
	let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SchemaRead {
		path: path.to_path_buf(),
		source,
	})?;

	parse_schema_str(&content, path)
}

/// Parse a schema from a string (useful for testing).
pub fn parse_schema_str(content: &str, path: &Path) -> Result<Schema> {
	let schema: Schema = toml::from_str(content).map_err(|source| ConfigError::SchemaParse {
		path: path.to_path_buf(),
		source,
	})?;

	// Types must parse and defaults must fit them
	schema.validate()?;

	Ok(schema)
}
