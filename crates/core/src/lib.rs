//! Protocol schema compiler.
//!
//! Reads a YAML schema of channels, objects, enums and mixins and emits two
//! TypeScript artifacts from it: `channels.ts` with the static types and
//! `validator.ts` with the runtime validator registry. The registry is also
//! available in-process as a [`ValidatorRegistry`].

pub mod config;
pub mod context;
pub mod emit;
pub mod error;
pub mod generator;
pub mod inheritance;
pub mod metadata;
pub mod resolve;
pub mod schema;
pub mod ts;
pub mod validator;
pub mod writer;

pub use config::GeneratorConfig;
pub use error::{GeneratorError, Result};
pub use generator::{GeneratedArtifacts, compile, compile_source, generate};
pub use validator::{ValidationError, ValidatorContext, ValidatorKind, ValidatorRegistry};
pub use writer::{OutputWriter, WriteReport};

/// Name stamped into every generated banner.
pub const GENERATOR_NAME: &str = "protogen";
