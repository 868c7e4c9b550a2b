use crate::error::TypeParseError;
use std::fmt;
use std::str::FromStr;

/// The outer type of a [`GenericType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MainType {
	Bool,
	Char,
	String,
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	F32,
	F64,
	List,
	Set,
	Map,
	/// A user type, usually a nested object registered with an object schema.
	Named(String),
}

impl MainType {
	/// Get the canonical name used by `Display` and `FromStr`.
	pub fn name(&self) -> &str {
		match self {
			MainType::Bool => "bool",
			MainType::Char => "char",
			MainType::String => "string",
			MainType::I8 => "i8",
			MainType::I16 => "i16",
			MainType::I32 => "i32",
			MainType::I64 => "i64",
			MainType::U8 => "u8",
			MainType::U16 => "u16",
			MainType::U32 => "u32",
			MainType::F32 => "f32",
			MainType::F64 => "f64",
			MainType::List => "list",
			MainType::Set => "set",
			MainType::Map => "map",
			MainType::Named(name) => name,
		}
	}

	/// Resolve a type name. Names that are not built in become `Named`.
	pub fn from_name(name: &str) -> MainType {
		match name {
			"bool" | "boolean" => MainType::Bool,
			"char" => MainType::Char,
			"string" | "str" => MainType::String,
			"i8" => MainType::I8,
			"i16" => MainType::I16,
			"i32" => MainType::I32,
			"i64" | "int" | "integer" => MainType::I64,
			"u8" => MainType::U8,
			"u16" => MainType::U16,
			"u32" => MainType::U32,
			"f32" => MainType::F32,
			"f64" | "float" | "double" => MainType::F64,
			"list" | "vec" | "sequence" => MainType::List,
			"set" => MainType::Set,
			"map" | "mapping" => MainType::Map,
			other => MainType::Named(other.to_string()),
		}
	}

	/// Inclusive bounds for the integer kinds.
	pub fn integer_bounds(&self) -> Option<(i64, i64)> {
		match self {
			MainType::I8 => Some((i8::MIN.into(), i8::MAX.into())),
			MainType::I16 => Some((i16::MIN.into(), i16::MAX.into())),
			MainType::I32 => Some((i32::MIN.into(), i32::MAX.into())),
			MainType::I64 => Some((i64::MIN, i64::MAX)),
			MainType::U8 => Some((0, u8::MAX.into())),
			MainType::U16 => Some((0, u16::MAX.into())),
			MainType::U32 => Some((0, u32::MAX.into())),
			_ => None,
		}
	}

	pub fn is_integer(&self) -> bool {
		self.integer_bounds().is_some()
	}

	pub fn is_float(&self) -> bool {
		matches!(self, MainType::F32 | MainType::F64)
	}
}

/// An immutable, parameterized type descriptor.
///
/// `list<string>` is `main = List, generics = [string]`. Two descriptors are
/// equal when their main types and all nested generics are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericType {
	main: MainType,
	generics: Vec<GenericType>,
}

impl GenericType {
	pub fn new(main: MainType, generics: Vec<GenericType>) -> Self {
		GenericType { main, generics }
	}

	/// A descriptor without type arguments.
	pub fn of(main: MainType) -> Self {
		GenericType::new(main, Vec::new())
	}

	pub fn list(element: GenericType) -> Self {
		GenericType::new(MainType::List, vec![element])
	}

	pub fn set(element: GenericType) -> Self {
		GenericType::new(MainType::Set, vec![element])
	}

	pub fn map(key: GenericType, value: GenericType) -> Self {
		GenericType::new(MainType::Map, vec![key, value])
	}

	pub fn named(name: impl Into<String>) -> Self {
		GenericType::of(MainType::Named(name.into()))
	}

	pub fn main_type(&self) -> &MainType {
		&self.main
	}

	pub fn generics(&self) -> &[GenericType] {
		&self.generics
	}
}

impl fmt::Display for GenericType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.main.name())?;
		if !self.generics.is_empty() {
			f.write_str("<")?;
			for (i, generic) in self.generics.iter().enumerate() {
				if i > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{generic}")?;
			}
			f.write_str(">")?;
		}
		Ok(())
	}
}

impl FromStr for GenericType {
	type Err = TypeParseError;

	/// Parse the `Display` syntax, e.g. `map<string, list<i32>>`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parser = TypeParser { text: s, rest: s };
		let ty = parser.parse_type()?;
		parser.skip_whitespace();
		if !parser.rest.is_empty() {
			return Err(parser.error(format!("unexpected trailing input '{}'", parser.rest)));
		}
		Ok(ty)
	}
}

/// Recursive-descent parser over the remaining input.
struct TypeParser<'a> {
	text: &'a str,
	rest: &'a str,
}

impl TypeParser<'_> {
	fn skip_whitespace(&mut self) {
		self.rest = self.rest.trim_start();
	}

	fn eat(&mut self, expected: char) -> bool {
		self.skip_whitespace();
		match self.rest.strip_prefix(expected) {
			Some(rest) => {
				self.rest = rest;
				true
			}
			None => false,
		}
	}

	fn parse_type(&mut self) -> Result<GenericType, TypeParseError> {
		self.skip_whitespace();
		let end = self
			.rest
			.find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
			.unwrap_or(self.rest.len());
		if end == 0 {
			return Err(self.error("expected a type name"));
		}

		let (name, rest) = self.rest.split_at(end);
		self.rest = rest;

		let mut generics = Vec::new();
		if self.eat('<') {
			loop {
				generics.push(self.parse_type()?);
				if self.eat(',') {
					continue;
				}
				if self.eat('>') {
					break;
				}
				return Err(self.error("expected ',' or '>'"));
			}
		}

		Ok(GenericType::new(MainType::from_name(name), generics))
	}

	fn error(&self, reason: impl Into<String>) -> TypeParseError {
		TypeParseError {
			text: self.text.to_string(),
			reason: reason.into(),
		}
	}
}
