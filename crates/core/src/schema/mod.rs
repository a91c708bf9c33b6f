//! In-memory model of a protocol schema document.
//!
//! The model is pure data. It is built once by [`parse::parse_schema`] and is
//! immutable for the rest of the run. Every mapping keeps document order
//! because emission order is observable in the generated output.

mod parse;

pub use parse::parse_schema;

use indexmap::IndexMap;

/// Root document: entity name -> definition, in document order.
#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    pub entities: IndexMap<String, EntityDefinition>,
}

impl SchemaDocument {
    pub fn get(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.get(name)
    }

    /// Iterate over channel entities in document order.
    pub fn channels(&self) -> impl DoubleEndedIterator<Item = (&str, &ChannelDef)> {
        self.entities.iter().filter_map(|(name, entity)| match entity {
            EntityDefinition::Channel(channel) => Some((name.as_str(), channel)),
            _ => None,
        })
    }

    pub fn is_channel(&self, name: &str) -> bool {
        matches!(self.get(name), Some(EntityDefinition::Channel(_)))
    }
}

/// A top-level schema entity.
#[derive(Debug, Clone)]
pub enum EntityDefinition {
    Channel(ChannelDef),
    Object(ObjectDef),
    Enum(EnumDef),
    Mixin(MixinDef),
}

impl EntityDefinition {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDefinition::Channel(_) => EntityKind::Channel,
            EntityDefinition::Object(_) => EntityKind::Object,
            EntityDefinition::Enum(_) => EntityKind::Enum,
            EntityDefinition::Mixin(_) => EntityKind::Mixin,
        }
    }
}

/// Discriminant of [`EntityDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Channel,
    Object,
    Enum,
    Mixin,
}

/// An RPC endpoint kind.
#[derive(Debug, Clone, Default)]
pub struct ChannelDef {
    pub extends: Option<String>,
    pub initializer: PropertyList,
    pub commands: IndexMap<String, CommandDef>,
    pub events: IndexMap<String, EventDef>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectDef {
    pub properties: PropertyList,
}

#[derive(Debug, Clone, Default)]
pub struct EnumDef {
    pub literals: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MixinDef {
    pub properties: PropertyList,
}

#[derive(Debug, Clone, Default)]
pub struct CommandDef {
    /// `None` when the schema does not declare parameters.
    pub parameters: Option<PropertyList>,
    /// `None` when the schema does not declare a result.
    pub returns: Option<PropertyList>,
    pub tracing: Tracing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tracing {
    pub snapshot: bool,
    pub pauses_before_input: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventDef {
    pub parameters: Option<PropertyList>,
}

/// Ordered property entries, possibly containing mixin splices.
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    pub entries: Vec<PropertyEntry>,
}

impl PropertyList {
    pub fn new(entries: Vec<PropertyEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum PropertyEntry {
    Field { name: String, ty: TypeExpression },
    /// `$mixin: Name` - replaced by the mixin's own properties.
    Splice { mixin: String },
}

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Boolean,
    Number,
    Undefined,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Undefined => "undefined",
        }
    }
}

/// Target of a channel reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    Named(String),
    /// The `Channel` token: any channel kind.
    Any,
}

#[derive(Debug, Clone)]
pub enum TypeExpression {
    Primitive {
        kind: PrimitiveKind,
        optional: bool,
    },
    Binary {
        optional: bool,
    },
    Any {
        optional: bool,
    },
    Reference {
        name: String,
        optional: bool,
    },
    ChannelReference {
        target: ChannelTarget,
        optional: bool,
    },
    Array {
        element: Box<TypeExpression>,
        optional: bool,
    },
    InlineEnum {
        literals: Vec<String>,
        optional: bool,
    },
    InlineObject {
        properties: PropertyList,
        optional: bool,
    },
}

impl TypeExpression {
    pub fn is_optional(&self) -> bool {
        match self {
            TypeExpression::Primitive { optional, .. }
            | TypeExpression::Binary { optional }
            | TypeExpression::Any { optional }
            | TypeExpression::Reference { optional, .. }
            | TypeExpression::ChannelReference { optional, .. }
            | TypeExpression::Array { optional, .. }
            | TypeExpression::InlineEnum { optional, .. }
            | TypeExpression::InlineObject { optional, .. } => *optional,
        }
    }
}
