//! Project paths: schema input and the two generated outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{GeneratorError, Result};

/// Optional per-project override file.
pub const CONFIG_FILENAME: &str = "protogen.toml";

pub const DEFAULT_SCHEMA_PATH: &str = "protocol/protocol.yml";
pub const DEFAULT_DECLARATIONS_PATH: &str = "src/protocol/channels.ts";
pub const DEFAULT_VALIDATORS_PATH: &str = "src/protocol/validator.ts";

/// `[paths]` table of `protogen.toml`, relative to the project root.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathOverrides {
    schema: Option<PathBuf>,
    declarations: Option<PathBuf>,
    validators: Option<PathBuf>,
}

/// Resolved, absolute-from-root paths for one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub root: PathBuf,
    pub schema: PathBuf,
    pub declarations: PathBuf,
    pub validators: PathBuf,
}

impl GeneratorConfig {
    /// Default layout under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            schema: root.join(DEFAULT_SCHEMA_PATH),
            declarations: root.join(DEFAULT_DECLARATIONS_PATH),
            validators: root.join(DEFAULT_VALIDATORS_PATH),
            root,
        }
    }

    /// Defaults, overridden by the `[paths]` table of `protogen.toml` when
    /// the file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Self::with_root(root);
        let config_path = root.join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path).map_err(|source| GeneratorError::Io {
            path: config_path.clone(),
            source,
        })?;
        let value: toml::Value = contents.parse().map_err(|err: toml::de::Error| {
            GeneratorError::Config {
                path: config_path.clone(),
                reason: err.to_string(),
            }
        })?;

        let Some(paths) = value.get("paths") else {
            return Ok(config);
        };
        let overrides: PathOverrides =
            paths.clone().try_into().map_err(|err: toml::de::Error| GeneratorError::Config {
                path: config_path.clone(),
                reason: format!("[paths]: {err}"),
            })?;
        if let Some(schema) = overrides.schema {
            config.schema = root.join(schema);
        }
        if let Some(declarations) = overrides.declarations {
            config.declarations = root.join(declarations);
        }
        if let Some(validators) = overrides.validators {
            config.validators = root.join(validators);
        }
        debug!(config = %config_path.display(), "Loaded generator config.");
        Ok(config)
    }

    /// File name of the schema, used in the generated banners.
    pub fn schema_name(&self) -> String {
        self.schema
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.schema.display().to_string())
    }
}
