use crate::config::{NodeSource, Storage};
use crate::error::{ConfigError, Result};
use crate::node::{ConfigurationNode, NodeKind};
use crate::value::Value;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const COMMENT_CHAR_HASH: char = '#';
pub const COMMENT_CHAR_SEMICOLON: char = ';';

static COMMENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[;#] ?(.*)$").expect("comment pattern is valid"));
static SECTION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\[(.*)\]$").expect("section pattern is valid"));
static LIST_SEPARATOR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r", ?").expect("list separator pattern is valid"));

/// Reads and writes INI files.
///
/// INI has two levels: keys before the first `[section]` become top-level
/// values and every section holds plain `key=value` lines. Deeper paths are
/// folded so the remainder becomes a single key inside the section
/// (`a.b.c` is stored as key `b.c` in section `a`).
///
/// Comment lines (`#` or `;`) directly above a section or key are attached
/// to that node and written back with the preferred comment character.
#[derive(Debug, Clone)]
pub struct IniSource {
	storage: Storage,
	comment_char: char,
	path_separator: String,
}

impl IniSource {
	pub fn new(storage: Storage) -> Self {
		IniSource {
			storage,
			comment_char: COMMENT_CHAR_HASH,
			path_separator: ".".to_string(),
		}
	}

	pub fn file(path: impl Into<PathBuf>) -> Self {
		Self::new(Storage::file(path))
	}

	pub fn memory(content: impl Into<String>) -> Self {
		Self::new(Storage::memory(content))
	}

	pub fn storage(&self) -> &Storage {
		&self.storage
	}

	pub fn comment_char(&self) -> char {
		self.comment_char
	}

	/// Choose the character written before comment lines: `#` or `;`.
	pub fn set_comment_char(&mut self, comment_char: char) -> Result<()> {
		if comment_char != COMMENT_CHAR_HASH && comment_char != COMMENT_CHAR_SEMICOLON {
			return Err(ConfigError::InvalidCommentChar(comment_char));
		}
		self.comment_char = comment_char;
		Ok(())
	}

	/// The separator used to join folded key segments.
	pub fn set_path_separator(&mut self, separator: impl Into<String>) {
		self.path_separator = separator.into();
	}

	/// Parse INI text into top-level nodes.
	pub fn parse(&self, text: &str) -> Result<Vec<ConfigurationNode>> {
		let mut root = ConfigurationNode::root();
		let mut section: Option<String> = None;
		let mut comments = Vec::new();

		for (index, raw) in text.lines().enumerate() {
			let line = raw.trim();
			if line.is_empty() {
				continue;
			}

			if let Some(caps) = COMMENT.captures(line) {
				comments.push(caps[1].to_string());
				continue;
			}

			if let Some(caps) = SECTION.captures(line) {
				let name = caps[1].trim().to_string();
				if root.child(&name).is_some() {
					warn!(section = %name, "merging repeated section");
				}
				let node = root.node_mut(&[name.as_str()])?;
				if node.kind() == NodeKind::Scalar {
					return Err(ConfigError::IniSyntax {
						line: index + 1,
						message: format!("Section '{name}' conflicts with a top-level key"),
					});
				}
				if !comments.is_empty() {
					node.set_comment(std::mem::take(&mut comments));
				}
				section = Some(name);
				continue;
			}

			let Some((key, value)) = line.split_once(['=', ':']) else {
				return Err(ConfigError::IniSyntax {
					line: index + 1,
					message: format!("Key with no value: {line}"),
				});
			};
			let key = key.trim();
			if key.is_empty() {
				return Err(ConfigError::IniSyntax {
					line: index + 1,
					message: format!("Value with no key: {line}"),
				});
			}

			let mut node = ConfigurationNode::with_value([key], parse_value(value.trim()));
			if !comments.is_empty() {
				node.set_comment(std::mem::take(&mut comments));
			}

			let parent = match &section {
				Some(name) => root.node_mut(&[name.as_str()])?,
				None => &mut root,
			};
			if parent.add_child(node)?.is_some() {
				warn!(line = index + 1, key, "duplicate key, keeping the last value");
			}
		}

		if !comments.is_empty() {
			debug!(lines = comments.len(), "dropping trailing comments");
		}

		Ok(root.into_children())
	}

	/// Render top-level nodes as INI text.
	///
	/// Top-level values are written first, then each section separated by a
	/// blank line. Sections may only hold values.
	pub fn render(&self, nodes: &[ConfigurationNode]) -> Result<String> {
		let (values, sections): (Vec<_>, Vec<_>) = nodes
			.iter()
			.partition(|node| node.kind() == NodeKind::Scalar);

		let mut out = String::new();
		for node in &values {
			self.write_key(&mut out, node)?;
		}

		for (index, section) in sections.iter().enumerate() {
			if index > 0 || !values.is_empty() {
				out.push('\n');
			}
			self.write_comment(&mut out, section.comment());
			out.push('[');
			out.push_str(section.name().unwrap_or_default());
			out.push_str("]\n");

			for child in section.children() {
				match child.kind() {
					NodeKind::Scalar => self.write_key(&mut out, child)?,
					NodeKind::Empty => {}
					NodeKind::Mapping => {
						return Err(ConfigError::Unsupported {
							format: "INI",
							what: format!("nested section '{}'", child.path().join(".")),
						});
					}
				}
			}
		}

		Ok(out)
	}

	fn write_key(&self, out: &mut String, node: &ConfigurationNode) -> Result<()> {
		let Some(value) = node.value() else {
			return Ok(());
		};
		let text = to_string_value(value).map_err(|what| ConfigError::Unsupported {
			format: "INI",
			what: format!("{what} at '{}'", node.path().join(".")),
		})?;
		self.write_comment(out, node.comment());
		out.push_str(node.name().unwrap_or_default());
		out.push('=');
		out.push_str(&text);
		out.push('\n');
		Ok(())
	}

	fn write_comment(&self, out: &mut String, lines: &[String]) {
		for line in lines {
			out.push(self.comment_char);
			out.push(' ');
			out.push_str(line);
			out.push('\n');
		}
	}
}

impl NodeSource for IniSource {
	fn load_to_nodes(&self) -> Result<Vec<ConfigurationNode>> {
		let text = self.storage.read()?;
		self.parse(&text)
	}

	fn save_from_nodes(&mut self, nodes: &[ConfigurationNode]) -> Result<()> {
		let text = self.render(nodes)?;
		self.storage.write(&text)
	}

	fn ensure_correct_path(&self, mut path: Vec<String>) -> Vec<String> {
		if path.len() <= 2 {
			return path;
		}
		let rest = path.split_off(1).join(&self.path_separator);
		path.push(rest);
		path
	}
}

/// Interpret the text after `=` on an INI line.
///
/// Quoted text (`"..."` or `'...'`) is a string with the quotes removed.
/// Text containing commas is a list of strings split on `, ` or `,`; a
/// trailing comma marks a one-element list and a lone `,` an empty list.
/// Anything else is a plain string.
pub fn parse_value(text: &str) -> Value {
	if let Some(quote) = text.chars().next()
		&& (quote == '"' || quote == '\'')
		&& text.len() >= 2
		&& text.ends_with(quote)
	{
		return Value::String(text[1..text.len() - 1].to_string());
	}

	if text == "," {
		return Value::List(Vec::new());
	}

	if !text.contains(',') {
		return Value::String(text.to_string());
	}

	let mut items: Vec<Value> = LIST_SEPARATOR.split(text).map(Value::from).collect();
	if text.ends_with(',') {
		items.pop();
	}
	Value::List(items)
}

/// Render a value as INI text, or describe why it cannot be.
pub fn to_string_value(value: &Value) -> std::result::Result<String, String> {
	match value {
		Value::List(items) => {
			if items.is_empty() {
				return Ok(",".to_string());
			}
			let mut parts = Vec::with_capacity(items.len());
			for item in items {
				if item.is_container() {
					return Err(format!("{} inside a list", item.kind_name()));
				}
				let text = item.to_string();
				if let Some(problem) = list_item_problem(&text) {
					return Err(format!("list item '{text}' {problem}"));
				}
				parts.push(text);
			}
			let mut joined = parts.join(", ");
			if items.len() == 1 {
				joined.push(',');
			}
			Ok(joined)
		}
		Value::Map(_) => Err("a map value".to_string()),
		Value::String(text) if needs_quotes(text) => Ok(format!("\"{text}\"")),
		scalar => Ok(scalar.to_string()),
	}
}

/// Why a list item would not read back unchanged, if it would not.
fn list_item_problem(text: &str) -> Option<&'static str> {
	if text.is_empty() {
		Some("is empty")
	} else if text.contains(',') {
		Some("contains a comma")
	} else if text != text.trim() {
		Some("has surrounding whitespace")
	} else if text.starts_with(['"', '\'']) || text.ends_with(['"', '\'']) {
		Some("starts or ends with a quote")
	} else {
		None
	}
}

/// Whether a plain string would read back as something else.
fn needs_quotes(text: &str) -> bool {
	text.contains(',')
		|| text != text.trim()
		|| (text.len() >= 2
			&& ((text.starts_with('"') && text.ends_with('"'))
				|| (text.starts_with('\'') && text.ends_with('\''))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Configuration;
	use std::collections::BTreeSet;
	use tempfile::TempDir;

	fn parse(text: &str) -> Vec<ConfigurationNode> {
		IniSource::memory("").parse(text).unwrap()
	}

	#[test]
	fn test_parse_sections_and_keys() {
		let nodes = parse(
			r#"
name = demo

[server]
host=localhost
port: 8080

[paths]
include = src, tests,docs
"#,
		);

		assert_eq!(nodes.len(), 3);
		assert_eq!(nodes[0].name(), Some("name"));
		assert_eq!(nodes[0].value(), Some(&Value::from("demo")));

		let server = &nodes[1];
		assert_eq!(server.path(), ["server"]);
		assert_eq!(server.child("host").unwrap().value(), Some(&Value::from("localhost")));
		assert_eq!(server.child("port").unwrap().path(), ["server", "port"]);
		assert_eq!(server.child("port").unwrap().value(), Some(&Value::from("8080")));

		let include = nodes[2].child("include").unwrap().value().unwrap();
		assert_eq!(
			include,
			&Value::List(vec![Value::from("src"), Value::from("tests"), Value::from("docs")])
		);
	}

	#[test]
	fn test_parse_comments_attach_to_next_node() {
		let nodes = parse(
			"# The server\n; listens here\n[server]\n# port number\nport=1\n",
		);
		let server = &nodes[0];
		assert_eq!(server.comment(), ["The server", "listens here"]);
		assert_eq!(server.child("port").unwrap().comment(), ["port number"]);
	}

	#[test]
	fn test_key_with_no_value() {
		let result = IniSource::memory("").parse("[a]\nb=1\njust a line\n");
		match result.unwrap_err() {
			ConfigError::IniSyntax { line, message } => {
				assert_eq!(line, 3);
				assert!(message.contains("Key with no value"));
			}
			other => panic!("Expected IniSyntax, got {other:?}"),
		}
	}

	#[test]
	fn test_repeated_sections_merge() {
		let nodes = parse("[a]\nx=1\n[b]\ny=2\n[a]\nz=3\nx=4\n");
		assert_eq!(nodes.len(), 2);
		let a = &nodes[0];
		let keys: Vec<_> = a.children().iter().filter_map(|c| c.name()).collect();
		assert_eq!(keys, ["x", "z"]);
		assert_eq!(a.child("x").unwrap().value(), Some(&Value::from("4")));
	}

	#[test]
	fn test_empty_section_is_kept() {
		let nodes = parse("[empty]\n[full]\nk=v\n");
		assert_eq!(nodes[0].kind(), NodeKind::Empty);

		let text = IniSource::memory("").render(&nodes).unwrap();
		assert_eq!(text, "[empty]\n\n[full]\nk=v\n");
	}

	#[test]
	fn test_parse_value_forms() {
		assert_eq!(parse_value("plain"), Value::from("plain"));
		assert_eq!(parse_value("\"a, b\""), Value::from("a, b"));
		assert_eq!(parse_value("'quoted'"), Value::from("quoted"));
		assert_eq!(parse_value("\""), Value::from("\""));
		assert_eq!(parse_value("one,"), Value::List(vec![Value::from("one")]));
		assert_eq!(parse_value(","), Value::List(vec![]));
		assert_eq!(
			parse_value("a,b, c"),
			Value::List(vec![Value::from("a"), Value::from("b"), Value::from("c")])
		);
	}

	#[test]
	fn test_to_string_value_forms() {
		assert_eq!(to_string_value(&Value::Int(3)).unwrap(), "3");
		assert_eq!(to_string_value(&Value::from("a,b")).unwrap(), "\"a,b\"");
		assert_eq!(to_string_value(&Value::from(" padded")).unwrap(), "\" padded\"");
		assert_eq!(
			to_string_value(&Value::List(vec![Value::Int(1), Value::Int(2)])).unwrap(),
			"1, 2"
		);
		assert_eq!(to_string_value(&Value::List(vec![Value::from("x")])).unwrap(), "x,");
		assert_eq!(to_string_value(&Value::List(vec![])).unwrap(), ",");
		assert!(to_string_value(&Value::Map(vec![])).is_err());
	}

	#[test]
	fn test_list_items_that_would_not_survive_are_rejected() {
		let cases: [&[&str]; 5] = [
			&[""],
			&["a", ""],
			&["\"a", "b\""],
			&[" x", "y"],
			&["a,b"],
		];
		for items in cases {
			let list = Value::List(items.iter().copied().map(Value::from).collect());
			let node = ConfigurationNode::with_value(["k"], list);
			match IniSource::memory("").render(&[node]) {
				Err(ConfigError::Unsupported { format, what }) => {
					assert_eq!(format, "INI");
					assert!(what.contains("list item"), "{what}");
				}
				other => panic!("Expected Unsupported for {items:?}, got {other:?}"),
			}
		}
	}

	#[test]
	fn test_list_items_survive_file_round_trip() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("lists.ini");
		let items = vec!["a b".to_string(), "it's".to_string(), "x=y".to_string()];

		let mut config = Configuration::new(IniSource::file(&path));
		config.set("section.items", &items).unwrap();
		config.save().unwrap();

		let mut reloaded = Configuration::new(IniSource::file(&path));
		reloaded.load().unwrap();
		assert_eq!(reloaded.get::<Vec<String>>("section.items").unwrap(), Some(items));

		let before = std::fs::read_to_string(&path).unwrap();
		reloaded.set("section.items", &vec!["a".to_string(), String::new()]).unwrap();
		assert!(matches!(reloaded.save(), Err(ConfigError::Unsupported { .. })));
		assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
	}

	#[test]
	fn test_render_order_and_comments() {
		let mut section = ConfigurationNode::new(["server"]);
		section.set_comment(["Server settings"]);
		section
			.add_child(ConfigurationNode::with_value(["port"], Value::Int(80)))
			.unwrap();
		let mut top = ConfigurationNode::with_value(["name"], Value::from("demo"));
		top.set_comment(["App name"]);

		let mut source = IniSource::memory("");
		source.set_comment_char(';').unwrap();
		let text = source.render(&[section, top]).unwrap();
		assert_eq!(
			text,
			"; App name\nname=demo\n\n; Server settings\n[server]\nport=80\n"
		);
	}

	#[test]
	fn test_render_rejects_nested_sections_and_maps() {
		let mut section = ConfigurationNode::new(["a"]);
		section
			.node_mut(&["b", "c"])
			.unwrap()
			.set_value(Value::Int(1))
			.unwrap();
		assert!(matches!(
			IniSource::memory("").render(&[section]),
			Err(ConfigError::Unsupported { format: "INI", .. })
		));

		let map = ConfigurationNode::with_value(["m"], Value::Map(vec![]));
		assert!(matches!(
			IniSource::memory("").render(&[map]),
			Err(ConfigError::Unsupported { .. })
		));
	}

	#[test]
	fn test_invalid_comment_char() {
		let mut source = IniSource::memory("");
		assert!(matches!(
			source.set_comment_char('!'),
			Err(ConfigError::InvalidCommentChar('!'))
		));
		assert_eq!(source.comment_char(), '#');
	}

	#[test]
	fn test_deep_paths_fold_into_section_keys() {
		let source = IniSource::memory("");
		let path = vec!["a".to_string(), "b".to_string(), "c".to_string()];
		assert_eq!(source.ensure_correct_path(path), ["a", "b.c"]);
		assert_eq!(source.ensure_correct_path(vec!["a".to_string()]), ["a"]);
	}

	#[test]
	fn test_configuration_round_trip_through_file() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("app.ini");

		let mut config = Configuration::new(IniSource::file(&path));
		config.load().unwrap();
		config.set("server.port", &8080u16).unwrap();
		config.set("server.tls.enabled", &true).unwrap();
		let tags: BTreeSet<String> = ["blue".to_string()].into_iter().collect();
		config.set("labels.tags", &tags).unwrap();
		config.node_mut("server").unwrap().set_comment(["Listener"]);
		config.save().unwrap();

		let text = std::fs::read_to_string(&path).unwrap();
		assert!(text.contains("# Listener\n[server]\nport=8080\ntls.enabled=true\n"));
		assert!(text.contains("tags=blue,\n"));

		let mut reloaded = Configuration::new(IniSource::file(&path));
		reloaded.load().unwrap();
		assert_eq!(reloaded.get::<u16>("server.port").unwrap(), Some(8080));
		assert_eq!(reloaded.get::<bool>("server.tls.enabled").unwrap(), Some(true));
		assert_eq!(reloaded.get::<BTreeSet<String>>("labels.tags").unwrap(), Some(tags));
		assert_eq!(reloaded.find("server").unwrap().comment(), ["Listener"]);
	}
}
