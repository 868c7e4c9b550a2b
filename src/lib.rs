//! cfgtree - hierarchical configuration trees with typed values.
//!
//! This library provides:
//! - Generic type descriptors and an ordered serializer registry
//! - A path-addressed node tree with typed get/set
//! - INI and TOML node sources with atomic file saves
//! - Settings binding with default write-back, key migration and schemas
//!
//! # Example
//!
//! ```no_run
//! use cfgtree::config::Configuration;
//! use cfgtree::format::IniSource;
//!
//! let mut config = Configuration::new(IniSource::file("app.ini"));
//! config.load().unwrap();
//!
//! // Absent keys are filled from the default and saved with the file
//! let port: u16 = config.get_or_insert("server.port", 8080).unwrap();
//! let hosts: Option<Vec<String>> = config.get("server.hosts").unwrap();
//!
//! println!("listening on {port}, hosts: {hosts:?}");
//! config.save().unwrap();
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod format;
pub mod migration;
pub mod node;
pub mod schema;
pub mod serialization;
pub mod value;

pub use error::{ConfigError, Result};
