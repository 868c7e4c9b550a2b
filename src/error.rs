use crate::node::NodeKind;
use crate::serialization::GenericType;
use std::path::PathBuf;

/// Failures raised while converting values through the serializer registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SerializationError {
	#[error("No applicable serializer for type {ty}")]
	NoApplicableSerializer { ty: GenericType },

	#[error("Type {ty} takes {expected} generic parameter(s), found {found}")]
	ArityMismatch {
		ty: GenericType,
		expected: usize,
		found: usize,
	},

	#[error("Invalid value for type {ty}: {reason}")]
	InvalidValue { ty: GenericType, reason: String },
}

/// Failures raised by node tree mutators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
	#[error("Node '{path}' is {found}, expected {expected}")]
	WrongKind {
		path: String,
		expected: NodeKind,
		found: NodeKind,
	},

	#[error("Cannot add a child node without a name")]
	Unnamed,
}

/// A type descriptor string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid type '{text}': {reason}")]
pub struct TypeParseError {
	pub text: String,
	pub reason: String,
}

/// Library-level structured errors for cfgtree.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error(transparent)]
	Serialization(#[from] SerializationError),

	#[error(transparent)]
	Node(#[from] NodeError),

	#[error(transparent)]
	InvalidType(#[from] TypeParseError),

	#[error("Failed to read configuration file: {path}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write configuration file: {path}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("INI syntax error on line {line}: {message}")]
	IniSyntax { line: usize, message: String },

	#[error("Failed to parse TOML configuration")]
	TomlParse {
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to serialize TOML configuration")]
	TomlSerialize {
		#[source]
		source: toml::ser::Error,
	},

	#[error("The {format} format does not support {what}")]
	Unsupported { format: &'static str, what: String },

	#[error("Invalid comment char: {0:?}")]
	InvalidCommentChar(char),

	#[error("Failed to read schema file: {path}")]
	SchemaRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse schema file: {path}")]
	SchemaParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
