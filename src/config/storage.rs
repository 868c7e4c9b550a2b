use crate::error::{ConfigError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Where a file-backed format reads and writes its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
	/// A file on disk. A missing file reads as empty text.
	File(PathBuf),
	/// An in-memory buffer, replaced on every write.
	Memory(String),
}

impl Storage {
	pub fn file(path: impl Into<PathBuf>) -> Self {
		Storage::File(path.into())
	}

	pub fn memory(content: impl Into<String>) -> Self {
		Storage::Memory(content.into())
	}

	/// The backing file, if any.
	pub fn path(&self) -> Option<&Path> {
		match self {
			Storage::File(path) => Some(path),
			Storage::Memory(_) => None,
		}
	}

	pub fn read(&self) -> Result<String> {
		match self {
			Storage::Memory(content) => Ok(content.clone()),
			Storage::File(path) => match std::fs::read_to_string(path) {
				Ok(content) => Ok(content),
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
					debug!(path = %path.display(), "configuration file missing, starting empty");
					Ok(String::new())
				}
				Err(source) => Err(ConfigError::Read {
					path: path.clone(),
					source,
				}),
			},
		}
	}

	/// Replace the stored text.
	///
	/// Files are written to a temporary file in the same directory and then
	/// renamed over the target, so readers never see a partial write.
	pub fn write(&mut self, content: &str) -> Result<()> {
		let path = match self {
			Storage::Memory(buffer) => {
				*buffer = content.to_string();
				return Ok(());
			}
			Storage::File(path) => path.as_path(),
		};

		let write_error = |source| ConfigError::Write {
			path: path.to_path_buf(),
			source,
		};

		let dir = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};
		std::fs::create_dir_all(dir).map_err(write_error)?;

		let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
		file.write_all(content.as_bytes()).map_err(write_error)?;
		file.persist(path).map_err(|e| write_error(e.error))?;

		debug!(path = %path.display(), bytes = content.len(), "wrote configuration file");
		Ok(())
	}
}
