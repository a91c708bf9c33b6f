//! In-process evaluation of validator expressions against JSON values.
//!
//! JSON has no `undefined`, so a missing key and an explicit `null` are both
//! treated as undefined.

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use super::registry::ValidatorRegistry;
use super::{ChannelKinds, Validator};

/// Structural mismatch at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", path_prefix(.path))]
pub struct ValidationError {
    /// Dotted field path, `[i]` for array elements; empty at the root.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn path_prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}: ")
    }
}

/// Resolves channel references seen while validating.
///
/// A channel reference travels as `{ "guid": "..." }`; the context knows
/// which guids are live and what kind each one is.
pub trait ValidatorContext {
    /// Kind of the live channel with this guid, if any.
    fn channel_kind(&self, guid: &str) -> Option<&str>;
}

/// Context with no live channels. Every channel reference fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChannels;

impl ValidatorContext for NoChannels {
    fn channel_kind(&self, _guid: &str) -> Option<&str> {
        None
    }
}

/// Guid -> channel kind table.
#[derive(Debug, Clone, Default)]
pub struct ChannelTable {
    kinds: HashMap<String, String>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, guid: impl Into<String>, kind: impl Into<String>) {
        self.kinds.insert(guid.into(), kind.into());
    }

    pub fn remove(&mut self, guid: &str) {
        self.kinds.remove(guid);
    }
}

impl ValidatorContext for ChannelTable {
    fn channel_kind(&self, guid: &str) -> Option<&str> {
        self.kinds.get(guid).map(String::as_str)
    }
}

fn kind_of(value: Option<&Value>) -> &'static str {
    match value {
        None | Some(Value::Null) => "undefined",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn mismatch(path: &str, expected: &str, value: Option<&Value>) -> ValidationError {
    ValidationError::new(path, format!("expected {expected}, got {}", kind_of(value)))
}

/// Check `value` against `validator`. `Ok(None)` means the (valid) result is
/// undefined and should be omitted by the enclosing object.
pub(crate) fn check(
    registry: &ValidatorRegistry,
    validator: &Validator,
    value: Option<&Value>,
    path: &str,
    ctx: &dyn ValidatorContext,
) -> Result<Option<Value>, ValidationError> {
    let value = value.filter(|v| !v.is_null());
    match validator {
        Validator::Any => Ok(value.cloned()),
        Validator::Optional(inner) => match value {
            None => Ok(None),
            Some(_) => check(registry, inner, value, path, ctx),
        },
        Validator::Undefined => match value {
            None => Ok(None),
            Some(_) => Err(mismatch(path, "undefined", value)),
        },
        Validator::String | Validator::Binary => match value {
            Some(Value::String(_)) => Ok(value.cloned()),
            _ => Err(mismatch(path, "string", value)),
        },
        Validator::Number => match value {
            Some(Value::Number(_)) => Ok(value.cloned()),
            _ => Err(mismatch(path, "number", value)),
        },
        Validator::Boolean => match value {
            Some(Value::Bool(_)) => Ok(value.cloned()),
            _ => Err(mismatch(path, "boolean", value)),
        },
        Validator::Enum(literals) => match value {
            Some(Value::String(s)) if literals.iter().any(|l| l == s) => Ok(value.cloned()),
            _ => Err(ValidationError::new(
                path,
                format!("expected one of ({})", literals.join("|")),
            )),
        },
        Validator::Array(element) => {
            let Some(Value::Array(items)) = value else {
                return Err(mismatch(path, "array", value));
            };
            let mut checked = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                // Undefined elements survive as null to keep positions stable
                let item = check(registry, element, Some(item), &item_path, ctx)?;
                checked.push(item.unwrap_or(Value::Null));
            }
            Ok(Some(Value::Array(checked)))
        }
        Validator::Object(fields) => {
            let Some(Value::Object(object)) = value else {
                return Err(mismatch(path, "object", value));
            };
            let mut result = Map::new();
            for (key, field) in fields {
                let field_path = join_path(path, key);
                if let Some(checked) = check(registry, field, object.get(key), &field_path, ctx)? {
                    result.insert(key.clone(), checked);
                }
            }
            Ok(Some(Value::Object(result)))
        }
        Validator::Channel(kinds) => {
            let guid = value.and_then(|v| v.get("guid")).and_then(Value::as_str);
            let expected = match kinds {
                ChannelKinds::Any => "expected channel".to_string(),
                ChannelKinds::Named(names) => format!("expected channel {}", names.join(",")),
            };
            let Some(guid) = guid else {
                return Err(ValidationError::new(path, expected));
            };
            let accepted = match (ctx.channel_kind(guid), kinds) {
                (None, _) => false,
                (Some(_), ChannelKinds::Any) => true,
                (Some(kind), ChannelKinds::Named(names)) => names.iter().any(|n| n == kind),
            };
            if accepted {
                Ok(value.cloned())
            } else {
                Err(ValidationError::new(path, expected))
            }
        }
        Validator::Type(name) => match registry.get(name) {
            Some(resolved) => check(registry, resolved, value, path, ctx),
            None => Err(ValidationError::new(path, format!("unknown type \"{name}\""))),
        },
    }
}
