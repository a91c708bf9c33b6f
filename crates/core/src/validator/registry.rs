use indexmap::IndexMap;
use serde_json::Value;

use super::Validator;
use super::runtime::{self, ValidationError, ValidatorContext};
use crate::error::{GeneratorError, Result};
use crate::ts::utils::title_case;

/// A named registry entry and the schema member that produced it.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub validator: Validator,
    /// Human-readable origin, e.g. `Page.goto parameters`.
    pub origin: String,
}

/// Suffix families used when looking validators up by call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorKind {
    Params,
    Result,
    Event,
    Initializer,
}

impl ValidatorKind {
    pub fn suffix(self) -> &'static str {
        match self {
            ValidatorKind::Params => "Params",
            ValidatorKind::Result => "Result",
            ValidatorKind::Event => "Event",
            ValidatorKind::Initializer => "Initializer",
        }
    }
}

/// Name -> validator map, in registration order.
///
/// Lookups through [`Validator::Type`] are resolved against this map at
/// check time, so entries may reference names registered later.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `validator` under `name`. Registering a name twice is a
    /// [`GeneratorError::NameCollision`].
    pub fn register(
        &mut self,
        name: impl Into<String>,
        validator: Validator,
        origin: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let origin = origin.into();
        if let Some(existing) = self.entries.get(&name) {
            return Err(GeneratorError::NameCollision {
                name,
                first: existing.origin.clone(),
                second: origin,
            });
        }
        self.entries.insert(name, RegistryEntry { validator, origin });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Validator> {
        self.entries.get(name).map(|entry| &entry.validator)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Look up the validator for a call site, e.g. (`Page`, `goto`, Params)
    /// -> `PageGotoParams`.
    pub fn maybe_find_validator(
        &self,
        channel: &str,
        method: &str,
        kind: ValidatorKind,
    ) -> Option<&Validator> {
        self.get(&call_site_name(channel, method, kind))
    }

    pub fn find_validator(
        &self,
        channel: &str,
        method: &str,
        kind: ValidatorKind,
    ) -> std::result::Result<&Validator, ValidationError> {
        let name = call_site_name(channel, method, kind);
        self.get(&name).ok_or_else(|| {
            ValidationError::new("", format!("unknown validator \"{name}\""))
        })
    }

    /// Check `value` against the entry called `name`, returning the
    /// sanitized value (undeclared keys dropped, absent optionals omitted).
    pub fn validate(
        &self,
        name: &str,
        value: &Value,
        ctx: &dyn ValidatorContext,
    ) -> std::result::Result<Value, ValidationError> {
        let validator = Validator::Type(name.to_string());
        let checked = runtime::check(self, &validator, Some(value), "", ctx)?;
        Ok(checked.unwrap_or(Value::Null))
    }

    /// Check an arbitrary validator expression against the registry.
    pub fn check(
        &self,
        validator: &Validator,
        value: Option<&Value>,
        ctx: &dyn ValidatorContext,
    ) -> std::result::Result<Option<Value>, ValidationError> {
        runtime::check(self, validator, value, "", ctx)
    }
}

fn call_site_name(channel: &str, method: &str, kind: ValidatorKind) -> String {
    format!("{channel}{}{}", title_case(method), kind.suffix())
}
