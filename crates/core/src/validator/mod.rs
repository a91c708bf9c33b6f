//! Validator expressions.
//!
//! A [`Validator`] is the runtime twin of a resolved static type. The same
//! value is rendered into `validator.ts` (via [`Emit`]) and evaluated in-process
//! against JSON payloads (via [`ValidatorRegistry::validate`]).

mod registry;
mod runtime;

pub use registry::{RegistryEntry, ValidatorKind, ValidatorRegistry};
pub use runtime::{ChannelTable, NoChannels, ValidationError, ValidatorContext};

use crate::ts::Emit;
use crate::ts::utils::{escape_js_string, quote_if_needed};

/// Structural check composed from validator primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    String,
    Boolean,
    Number,
    Undefined,
    /// Base64 payload on the wire.
    Binary,
    Any,
    /// Accepts `undefined`, otherwise defers to the inner validator.
    Optional(Box<Validator>),
    Array(Box<Validator>),
    Enum(Vec<String>),
    /// Declared fields in order; undeclared keys are dropped.
    Object(Vec<(String, Validator)>),
    Channel(ChannelKinds),
    /// Late-bound lookup by registry name.
    Type(String),
}

/// Which channel kinds a channel validator accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKinds {
    Any,
    Named(Vec<String>),
}

impl Validator {
    pub fn optional(inner: Validator) -> Self {
        Validator::Optional(Box::new(inner))
    }

    pub fn empty_object() -> Self {
        Validator::Object(Vec::new())
    }

    pub fn type_ref(name: impl Into<String>) -> Self {
        Validator::Type(name.into())
    }

    /// Render as a `validatorPrimitives` expression. Object bodies are
    /// multi-line and indented 2 spaces per level.
    pub fn emit_at(&self, indent: usize) -> String {
        match self {
            Validator::String => "tString".to_string(),
            Validator::Boolean => "tBoolean".to_string(),
            Validator::Number => "tNumber".to_string(),
            Validator::Undefined => "tUndefined".to_string(),
            Validator::Binary => "tBinary".to_string(),
            Validator::Any => "tAny".to_string(),
            Validator::Optional(inner) => format!("tOptional({})", inner.emit_at(indent)),
            Validator::Array(inner) => format!("tArray({})", inner.emit_at(indent)),
            Validator::Enum(literals) => format!("tEnum([{}])", quoted_list(literals)),
            Validator::Object(fields) => {
                if fields.is_empty() {
                    return "tObject({})".to_string();
                }
                let pad = "  ".repeat(indent + 1);
                let mut output = String::from("tObject({\n");
                for (name, validator) in fields {
                    output.push_str(&format!(
                        "{}{}: {},\n",
                        pad,
                        quote_if_needed(name),
                        validator.emit_at(indent + 1)
                    ));
                }
                output.push_str(&"  ".repeat(indent));
                output.push_str("})");
                output
            }
            Validator::Channel(ChannelKinds::Any) => "tChannel(\"*\")".to_string(),
            Validator::Channel(ChannelKinds::Named(names)) => {
                format!("tChannel([{}])", quoted_list(names))
            }
            Validator::Type(name) => format!("tType(\"{}\")", escape_js_string(name)),
        }
    }
}

impl Emit for Validator {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{}\"", escape_js_string(item)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_primitives() {
        assert_eq!(Validator::String.emit(), "tString");
        assert_eq!(Validator::Binary.emit(), "tBinary");
        assert_eq!(Validator::optional(Validator::Number).emit(), "tOptional(tNumber)");
    }

    #[test]
    fn test_emit_enum_and_channel() {
        let e = Validator::Enum(vec!["load".into(), "commit".into()]);
        assert_eq!(e.emit(), "tEnum([\"load\", \"commit\"])");
        assert_eq!(
            Validator::Channel(ChannelKinds::Named(vec!["Frame".into()])).emit(),
            "tChannel([\"Frame\"])"
        );
        assert_eq!(Validator::Channel(ChannelKinds::Any).emit(), "tChannel(\"*\")");
    }

    #[test]
    fn test_emit_nested_object() {
        let v = Validator::Object(vec![
            ("url".into(), Validator::String),
            (
                "size".into(),
                Validator::optional(Validator::Object(vec![("width".into(), Validator::Number)])),
            ),
        ]);
        assert_eq!(
            v.emit(),
            "tObject({\n  url: tString,\n  size: tOptional(tObject({\n    width: tNumber,\n  })),\n})"
        );
    }

    #[test]
    fn test_emit_empty_object_and_type_ref() {
        assert_eq!(Validator::optional(Validator::empty_object()).emit(), "tOptional(tObject({}))");
        assert_eq!(Validator::type_ref("Point").emit(), "tType(\"Point\")");
    }
}
