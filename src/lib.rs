//! # slang
//!
//! A keyword-substitution transpiler between a custom surface syntax and Python.
//!
//! A mapping document (JSON or YAML) lists custom keywords and regex-based
//! special patterns. [`slang::engine::Transpiler`] compiles it once and then
//! rewrites text in either direction. Running the result is left to the
//! [`slang::drivers`].

pub mod slang;

pub use slang::engine::{Direction, TranspileOptions, Transpiler};
pub use slang::mapping::{ConfigurationError, MappingDocument};
