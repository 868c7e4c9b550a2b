use crate::config::{Configuration, NodeSource};
use crate::error::Result;
use crate::format::toml_file::value_from_toml;
use crate::schema::types::Schema;
use std::fmt;
use tracing::debug;

/// A setting that does not satisfy its schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingIssue {
	/// A setting with no default is absent.
	Missing { path: String },
	/// The stored value does not convert to the declared type.
	Invalid { path: String, reason: String },
}

impl SettingIssue {
	pub fn path(&self) -> &str {
		match self {
			SettingIssue::Missing { path } | SettingIssue::Invalid { path, .. } => path,
		}
	}
}

impl fmt::Display for SettingIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SettingIssue::Missing { path } => write!(f, "{path}: missing required setting"),
			SettingIssue::Invalid { path, reason } => write!(f, "{path}: {reason}"),
		}
	}
}

impl Schema {
	/// Read every declared setting with its type and report the failures.
	///
	/// Object types used by settings must already be registered with the
	/// configuration's registry (see [`Schema::register_objects`]).
	pub fn check<S: NodeSource>(&self, config: &Configuration<S>) -> Result<Vec<SettingIssue>> {
		let mut issues = Vec::new();
		for setting in &self.settings {
			let ty = setting.generic_type()?;
			match config.typed(&setting.path, &ty) {
				Ok(Some(_)) => {}
				Ok(None) if setting.default.is_some() => {}
				Ok(None) => issues.push(SettingIssue::Missing {
					path: setting.path.clone(),
				}),
				Err(e) => issues.push(SettingIssue::Invalid {
					path: setting.path.clone(),
					reason: e.to_string(),
				}),
			}
		}
		debug!(settings = self.settings.len(), issues = issues.len(), "checked configuration");
		Ok(issues)
	}

	/// Write the default of every absent setting into the configuration.
	///
	/// Returns the paths that were written.
	pub fn apply_defaults<S: NodeSource>(&self, config: &mut Configuration<S>) -> Result<Vec<String>> {
		let mut written = Vec::new();
		for setting in &self.settings {
			let Some(default) = &setting.default else {
				continue;
			};
			if config.find(&setting.path).and_then(|n| n.to_value()).is_some() {
				continue;
			}

			let ty = setting.generic_type()?;
			let value = config
				.registry()
				.deserialize(&ty, value_from_toml(default.clone()))?;
			config.node_mut(&setting.path)?.clear();
			config.set_typed(&setting.path, &ty, value)?;
			if let Some(comment) = &setting.comment {
				config.node_mut(&setting.path)?.set_comment(comment.lines());
			}
			debug!(path = %setting.path, "wrote default");
			written.push(setting.path.clone());
		}
		Ok(written)
	}
}
