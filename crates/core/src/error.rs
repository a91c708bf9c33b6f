//! Error types for schema compilation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a generator run.
///
/// Every variant is fatal: the pipeline produces both artifacts in memory
/// before touching the filesystem, so no partial output is ever written.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A type expression, `extends` clause or mixin splice names an entity
    /// that is not declared (or is declared with the wrong kind).
    #[error("unknown reference `{name}` at {location}")]
    UnknownReference { name: String, location: String },

    /// A schema entry does not match any recognized shape.
    #[error("unsupported shape at {location}: {reason}\n{dump}")]
    UnsupportedShape {
        location: String,
        reason: String,
        /// YAML dump of the offending entry.
        dump: String,
    },

    /// An output file was expected to exist as a placeholder.
    #[error("output target {} does not exist", path.display())]
    MissingOutputTarget { path: PathBuf },

    /// Mixin splices reference each other in a loop.
    #[error("mixin cycle detected: {chain}")]
    MixinCycle { chain: String },

    /// Channel `extends` clauses form a loop.
    #[error("extends cycle detected: {chain}")]
    InheritanceCycle { chain: String },

    /// Two schema members derive the same generated name.
    #[error("generated name `{name}` is produced by both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("failed to read schema {}: {source}", path.display())]
    ReadSchema {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {}: {source}", path.display())]
    ParseSchema {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

/// Convenience result type for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

impl GeneratorError {
    pub(crate) fn unknown(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnknownReference {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Build an `UnsupportedShape` error carrying a YAML dump of `value`.
    pub(crate) fn unsupported(
        location: impl Into<String>,
        reason: impl Into<String>,
        value: &serde_yaml::Value,
    ) -> Self {
        let dump = serde_yaml::to_string(value).unwrap_or_else(|_| format!("{value:?}"));
        Self::UnsupportedShape {
            location: location.into(),
            reason: reason.into(),
            dump,
        }
    }
}
