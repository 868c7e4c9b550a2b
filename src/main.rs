use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cfgtree::config::{Configuration, NodeSource};
use cfgtree::format::ini::parse_value;
use cfgtree::format::{IniSource, TomlSource};
use cfgtree::schema::parse_schema_file;
use cfgtree::serialization::{GenericType, MainType};
use cfgtree::value::Value;

#[derive(Parser)]
#[command(name = "cfgtree")]
#[command(
	author,
	version,
	about = "Inspect and edit INI and TOML configuration files"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// File format (inferred from the file extension when omitted)
	#[arg(long, global = true, value_enum)]
	format: Option<Format>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
	Ini,
	Toml,
}

#[derive(Subcommand)]
enum Commands {
	/// Print every value in the file with its path
	Show {
		file: PathBuf,
	},
	/// Print the value stored at a path
	Get {
		file: PathBuf,
		path: String,
		/// Read the value as this type, e.g. `u16` or `list<string>`
		#[arg(long = "type", value_name = "TYPE")]
		type_name: Option<String>,
	},
	/// Store a value at a path and save the file
	Set {
		file: PathBuf,
		path: String,
		value: String,
		/// Convert the value to this type before storing it
		#[arg(long = "type", value_name = "TYPE", default_value = "string")]
		type_name: String,
	},
	/// Check a file against a schema
	Check {
		file: PathBuf,
		/// Schema file describing the expected settings
		#[arg(long, value_name = "SCHEMA")]
		schema: PathBuf,
		/// Write defaults for absent settings and save the file
		#[arg(long)]
		write_defaults: bool,
	},
}

type DynConfiguration = Configuration<Box<dyn NodeSource>>;

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_env("CFGTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.with_writer(std::io::stderr)
		.init();

	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Show { file } => handle_show(&file, cli.format),
		Commands::Get {
			file,
			path,
			type_name,
		} => handle_get(&file, cli.format, &path, type_name.as_deref()),
		Commands::Set {
			file,
			path,
			value,
			type_name,
		} => handle_set(&file, cli.format, &path, &value, &type_name),
		Commands::Check {
			file,
			schema,
			write_defaults,
		} => handle_check(&file, cli.format, &schema, write_defaults),
	}
}

fn detect_format(file: &Path, format: Option<Format>) -> Result<Format> {
	if let Some(format) = format {
		return Ok(format);
	}
	match file.extension().and_then(|ext| ext.to_str()) {
		Some("ini") | Some("cfg") => Ok(Format::Ini),
		Some("toml") => Ok(Format::Toml),
		_ => anyhow::bail!(
			"Cannot tell the format of {}. Use --format ini or --format toml.",
			file.display()
		),
	}
}

fn open(file: &Path, format: Option<Format>) -> Result<DynConfiguration> {
	let source: Box<dyn NodeSource> = match detect_format(file, format)? {
		Format::Ini => Box::new(IniSource::file(file)),
		Format::Toml => Box::new(TomlSource::file(file)),
	};
	let mut config = Configuration::new(source);
	config
		.load()
		.with_context(|| format!("Failed to load {}", file.display()))?;
	Ok(config)
}

fn parse_type(type_name: &str) -> Result<GenericType> {
	type_name
		.parse()
		.with_context(|| format!("Invalid --type: {type_name}"))
}

fn handle_show(file: &Path, format: Option<Format>) -> Result<ExitCode> {
	let config = open(file, format)?;
	let values = config.root().scalars();

	if values.is_empty() {
		println!("No values in {}.", file.display());
		return Ok(ExitCode::SUCCESS);
	}

	for node in values {
		for line in node.comment() {
			println!("# {line}");
		}
		if let Some(value) = node.value() {
			println!("{} = {}", node.path().join(config.path_separator()), value);
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_get(
	file: &Path,
	format: Option<Format>,
	path: &str,
	type_name: Option<&str>,
) -> Result<ExitCode> {
	let config = open(file, format)?;

	let value = match type_name {
		Some(type_name) => {
			let ty = parse_type(type_name)?;
			config
				.typed(path, &ty)
				.with_context(|| format!("Failed to read {path} as {ty}"))?
		}
		None => config.find(path).and_then(|node| node.to_value()),
	};

	match value {
		Some(value) => {
			println!("{value}");
			Ok(ExitCode::SUCCESS)
		}
		None => {
			eprintln!("No value at {path}");
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_set(
	file: &Path,
	format: Option<Format>,
	path: &str,
	value: &str,
	type_name: &str,
) -> Result<ExitCode> {
	let mut config = open(file, format)?;
	let ty = parse_type(type_name)?;

	// Collections are written as comma-separated items on the command line
	let raw = match ty.main_type() {
		MainType::List | MainType::Set => match parse_value(value) {
			Value::List(items) => Value::List(items),
			single => Value::List(vec![single]),
		},
		_ => Value::String(value.to_string()),
	};
	let typed = config
		.registry()
		.deserialize(&ty, raw)
		.with_context(|| format!("Cannot convert '{value}' to {ty}"))?;

	config
		.set_typed(path, &ty, typed.clone())
		.with_context(|| format!("Failed to set {path}"))?;
	config
		.save()
		.with_context(|| format!("Failed to save {}", file.display()))?;

	println!("{path} = {typed}");
	Ok(ExitCode::SUCCESS)
}

fn handle_check(
	file: &Path,
	format: Option<Format>,
	schema_path: &Path,
	write_defaults: bool,
) -> Result<ExitCode> {
	let schema = parse_schema_file(schema_path)
		.with_context(|| format!("Invalid schema {}", schema_path.display()))?;
	let mut config = open(file, format)?;
	schema.register_objects(config.registry_mut())?;

	if write_defaults {
		let written = schema.apply_defaults(&mut config)?;
		if !written.is_empty() {
			config
				.save()
				.with_context(|| format!("Failed to save {}", file.display()))?;
			for path in &written {
				println!("Wrote default: {path}");
			}
		}
	}

	let issues = schema.check(&config)?;
	if issues.is_empty() {
		println!(
			"{}: all {} settings valid",
			file.display(),
			schema.settings.len()
		);
		return Ok(ExitCode::SUCCESS);
	}

	for issue in &issues {
		eprintln!("{issue}");
	}
	Ok(ExitCode::FAILURE)
}
