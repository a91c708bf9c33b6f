//! YAML -> schema model.
//!
//! The document is read as a `serde_yaml::Value` rather than deserialized
//! straight into typed structs. That keeps document order and gives every
//! rejected entry a precise location plus a YAML dump of what was found.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::{
    ChannelDef, ChannelTarget, CommandDef, EntityDefinition, EnumDef, EventDef, MixinDef,
    ObjectDef, PrimitiveKind, PropertyEntry, PropertyList, SchemaDocument, Tracing,
    TypeExpression,
};
use crate::error::{GeneratorError, Result};
use crate::ts::utils::needs_bracket_notation;

/// Property keys with this prefix splice a mixin instead of declaring a field.
pub const MIXIN_PREFIX: &str = "$mixin";

/// Token naming "any channel kind".
const ANY_CHANNEL_TOKEN: &str = "Channel";

/// Parse a schema document from YAML source.
pub fn parse_schema(source: &str) -> Result<SchemaDocument> {
    let root: Value = serde_yaml::from_str(source).map_err(|source| GeneratorError::ParseSchema {
        path: "<inline>".into(),
        source,
    })?;
    parse_document(&root)
}

pub(crate) fn parse_document(root: &Value) -> Result<SchemaDocument> {
    let root = match root {
        Value::Mapping(mapping) => mapping,
        // An empty file yields an empty schema
        Value::Null => return Ok(SchemaDocument::default()),
        other => {
            return Err(GeneratorError::unsupported(
                "<root>",
                "document root must be a mapping of entity names",
                other,
            ));
        }
    };

    // First pass: channel names decide whether a bare token is a channel
    // reference or a named type reference.
    let channels = collect_channel_names(root);

    let mut entities = IndexMap::new();
    for (key, value) in root {
        let name = key_str(key, "<root>")?;
        let entity = parse_entity(name, value, &channels)?;
        entities.insert(name.to_string(), entity);
    }

    debug!(entities = entities.len(), channels = channels.len(), "Parsed schema document.");
    Ok(SchemaDocument { entities })
}

fn collect_channel_names(root: &Mapping) -> HashSet<String> {
    root.iter()
        .filter(|(_, value)| {
            matches!(
                value.get("type").and_then(Value::as_str),
                Some("interface" | "channel")
            )
        })
        .filter_map(|(key, _)| key.as_str().map(str::to_string))
        .collect()
}

fn key_str<'a>(key: &'a Value, location: &str) -> Result<&'a str> {
    key.as_str()
        .ok_or_else(|| GeneratorError::unsupported(location, "keys must be strings", key))
}

fn parse_entity(name: &str, value: &Value, channels: &HashSet<String>) -> Result<EntityDefinition> {
    let Value::Mapping(mapping) = value else {
        return Err(GeneratorError::unsupported(name, "entity must be a mapping", value));
    };
    let kind = mapping
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeneratorError::unsupported(name, "entity is missing a `type`", value))?;

    match kind {
        "interface" | "channel" => {
            let extends = match mapping.get("extends") {
                None | Some(Value::Null) => None,
                Some(Value::String(parent)) => Some(parent.clone()),
                Some(other) => {
                    return Err(GeneratorError::unsupported(
                        format!("{name}.extends"),
                        "`extends` must name a channel",
                        other,
                    ));
                }
            };
            let initializer = parse_optional_properties(
                mapping.get("initializer"),
                &format!("{name}.initializer"),
                channels,
            )?
            .unwrap_or_default();
            let commands = parse_commands(name, mapping.get("commands"), channels)?;
            let events = parse_events(name, mapping.get("events"), channels)?;
            Ok(EntityDefinition::Channel(ChannelDef {
                extends,
                initializer,
                commands,
                events,
            }))
        }
        "object" => {
            let properties = parse_optional_properties(
                mapping.get("properties"),
                &format!("{name}.properties"),
                channels,
            )?
            .unwrap_or_default();
            Ok(EntityDefinition::Object(ObjectDef { properties }))
        }
        "enum" => {
            let literals = parse_literals(mapping.get("literals"), name, value)?;
            Ok(EntityDefinition::Enum(EnumDef { literals }))
        }
        "mixin" => {
            let properties = parse_optional_properties(
                mapping.get("properties"),
                &format!("{name}.properties"),
                channels,
            )?
            .unwrap_or_default();
            Ok(EntityDefinition::Mixin(MixinDef { properties }))
        }
        other => Err(GeneratorError::unsupported(
            name,
            format!("unknown entity type `{other}`"),
            value,
        )),
    }
}

/// Iterate a section that is either absent, null or a mapping.
fn section<'a>(value: Option<&'a Value>, location: &str) -> Result<Option<&'a Mapping>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(mapping)) => Ok(Some(mapping)),
        Some(other) => Err(GeneratorError::unsupported(location, "expected a mapping", other)),
    }
}

fn parse_commands(
    channel: &str,
    value: Option<&Value>,
    channels: &HashSet<String>,
) -> Result<IndexMap<String, CommandDef>> {
    let mut commands = IndexMap::new();
    let Some(mapping) = section(value, &format!("{channel}.commands"))? else {
        return Ok(commands);
    };
    for (key, value) in mapping {
        let name = member_name(key, &format!("{channel}.commands"))?;
        let location = format!("{channel}.{name}");
        let Some(body) = section(Some(value), &location)? else {
            commands.insert(name.to_string(), CommandDef::default());
            continue;
        };
        let parameters = parse_optional_properties(
            body.get("parameters"),
            &format!("{location}.parameters"),
            channels,
        )?;
        let returns =
            parse_optional_properties(body.get("returns"), &format!("{location}.returns"), channels)?;
        let tracing = parse_tracing(body.get("tracing"), &format!("{location}.tracing"))?;
        commands.insert(
            name.to_string(),
            CommandDef {
                parameters,
                returns,
                tracing,
            },
        );
    }
    Ok(commands)
}

fn parse_events(
    channel: &str,
    value: Option<&Value>,
    channels: &HashSet<String>,
) -> Result<IndexMap<String, EventDef>> {
    let mut events = IndexMap::new();
    let Some(mapping) = section(value, &format!("{channel}.events"))? else {
        return Ok(events);
    };
    for (key, value) in mapping {
        let name = member_name(key, &format!("{channel}.events"))?;
        let location = format!("{channel}.{name}");
        let parameters = match section(Some(value), &location)? {
            Some(body) => parse_optional_properties(
                body.get("parameters"),
                &format!("{location}.parameters"),
                channels,
            )?,
            None => None,
        };
        events.insert(name.to_string(), EventDef { parameters });
    }
    Ok(events)
}

/// Command and event names are emitted as method names; they must be plain
/// identifiers.
fn member_name<'a>(key: &'a Value, location: &str) -> Result<&'a str> {
    let name = key_str(key, location)?;
    if needs_bracket_notation(name) {
        return Err(GeneratorError::unsupported(
            format!("{location}.{name}"),
            "member names must be identifiers",
            key,
        ));
    }
    Ok(name)
}

fn parse_tracing(value: Option<&Value>, location: &str) -> Result<Tracing> {
    let Some(mapping) = section(value, location)? else {
        return Ok(Tracing::default());
    };
    let flag = |key: &str| -> Result<bool> {
        match mapping.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(other) => Err(GeneratorError::unsupported(
                format!("{location}.{key}"),
                "tracing flags must be booleans",
                other,
            )),
        }
    };
    Ok(Tracing {
        snapshot: flag("snapshot")?,
        pauses_before_input: flag("pausesBeforeInput")?,
    })
}

/// `None` for an absent or null list, so callers can tell "not declared"
/// from "declared empty".
fn parse_optional_properties(
    value: Option<&Value>,
    location: &str,
    channels: &HashSet<String>,
) -> Result<Option<PropertyList>> {
    section(value, location)?
        .map(|mapping| parse_properties(mapping, location, channels))
        .transpose()
}

fn parse_properties(
    mapping: &Mapping,
    location: &str,
    channels: &HashSet<String>,
) -> Result<PropertyList> {
    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key_str(key, location)?;
        let field_location = format!("{location}.{name}");
        if name.starts_with(MIXIN_PREFIX) {
            let mixin = value.as_str().ok_or_else(|| {
                GeneratorError::unsupported(&field_location, "a mixin splice must name a mixin", value)
            })?;
            entries.push(PropertyEntry::Splice {
                mixin: mixin.to_string(),
            });
            continue;
        }
        let ty = parse_type(value, &field_location, channels)?;
        entries.push(PropertyEntry::Field {
            name: name.to_string(),
            ty,
        });
    }
    Ok(PropertyList::new(entries))
}

/// Split a trailing `?` optionality marker.
fn strip_optional(token: &str) -> (&str, bool) {
    match token.strip_suffix('?') {
        Some(base) => (base, true),
        None => (token, false),
    }
}

fn parse_type(value: &Value, location: &str, channels: &HashSet<String>) -> Result<TypeExpression> {
    match value {
        Value::String(token) => Ok(parse_type_token(token, channels)),
        Value::Mapping(mapping) => {
            let kind = mapping.get("type").and_then(Value::as_str).ok_or_else(|| {
                GeneratorError::unsupported(location, "compound type is missing a `type`", value)
            })?;
            let (kind, optional) = strip_optional(kind);
            match kind {
                "array" => {
                    let items = mapping.get("items").ok_or_else(|| {
                        GeneratorError::unsupported(location, "array type is missing `items`", value)
                    })?;
                    let element = parse_type(items, &format!("{location}[]"), channels)?;
                    Ok(TypeExpression::Array {
                        element: Box::new(element),
                        optional,
                    })
                }
                "enum" => {
                    let literals = parse_literals(mapping.get("literals"), location, value)?;
                    Ok(TypeExpression::InlineEnum { literals, optional })
                }
                "object" => {
                    let properties =
                        parse_optional_properties(mapping.get("properties"), location, channels)?
                            .unwrap_or_default();
                    Ok(TypeExpression::InlineObject {
                        properties,
                        optional,
                    })
                }
                other => Err(GeneratorError::unsupported(
                    location,
                    format!("unknown compound type `{other}`"),
                    value,
                )),
            }
        }
        other => Err(GeneratorError::unsupported(location, "unrecognized type expression", other)),
    }
}

fn parse_type_token(token: &str, channels: &HashSet<String>) -> TypeExpression {
    let (base, optional) = strip_optional(token.trim());
    let primitive = |kind| TypeExpression::Primitive { kind, optional };
    match base {
        "string" => primitive(PrimitiveKind::String),
        "boolean" => primitive(PrimitiveKind::Boolean),
        "number" => primitive(PrimitiveKind::Number),
        "undefined" => primitive(PrimitiveKind::Undefined),
        "binary" => TypeExpression::Binary { optional },
        "any" | "json" => TypeExpression::Any { optional },
        ANY_CHANNEL_TOKEN => TypeExpression::ChannelReference {
            target: ChannelTarget::Any,
            optional,
        },
        name if channels.contains(name) => TypeExpression::ChannelReference {
            target: ChannelTarget::Named(name.to_string()),
            optional,
        },
        name => TypeExpression::Reference {
            name: name.to_string(),
            optional,
        },
    }
}

fn parse_literals(value: Option<&Value>, location: &str, entry: &Value) -> Result<Vec<String>> {
    let Some(Value::Sequence(items)) = value else {
        return Err(GeneratorError::unsupported(
            location,
            "enum type requires a `literals` sequence",
            entry,
        ));
    };
    let mut literals = Vec::with_capacity(items.len());
    for item in items {
        let literal = match item {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(GeneratorError::unsupported(
                    location,
                    "enum literals must be scalars",
                    other,
                ));
            }
        };
        if literal.is_empty() {
            return Err(GeneratorError::unsupported(
                location,
                "enums cannot contain an empty string",
                entry,
            ));
        }
        literals.push(literal);
    }
    Ok(literals)
}
