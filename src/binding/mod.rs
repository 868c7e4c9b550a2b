//! Binding Rust structs to configuration nodes.
//!
//! This module handles:
//! - The `Settings` trait, implemented by hand instead of reflection
//! - Loading fields with default write-back for absent keys
//! - Saving fields and binding nested settings under a sub-path

pub mod binder;

pub use binder::{BindMode, Binder, Settings};
