/// Split a string path on `separator`. The empty path addresses the root.
pub fn split_path(path: &str, separator: &str) -> Vec<String> {
	if path.is_empty() {
		return Vec::new();
	}
	if separator.is_empty() {
		return vec![path.to_string()];
	}
	path.split(separator).map(str::to_string).collect()
}

/// Render a path for messages. The root renders as `(root)`.
pub fn display_path<S: AsRef<str>>(path: &[S]) -> String {
	if path.is_empty() {
		return "(root)".to_string();
	}
	path.iter()
		.map(|segment| segment.as_ref())
		.collect::<Vec<_>>()
		.join(".")
}
