//! Type expression -> (static type, validator) resolution.
//!
//! Both halves come out of the same match arm, so a schema type can never
//! render one way in `channels.ts` and check another way at runtime.

use crate::context::CompilationContext;
use crate::error::{GeneratorError, Result};
use crate::schema::{ChannelTarget, EntityDefinition, PrimitiveKind, PropertyList, TypeExpression};
use crate::ts::{TsPrimitive, TsProp, TsType};
use crate::validator::{ChannelKinds, Validator};

/// A resolved type expression. `validator` is the bare check; callers wrap it
/// in `tOptional` when `optional` is set and the type sits in an object.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub ts: TsType,
    pub validator: Validator,
    pub optional: bool,
}

/// One resolved object field.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub ty: ResolvedType,
}

/// A property list after mixin expansion and resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedObject {
    pub fields: Vec<ResolvedField>,
}

impl ResolvedObject {
    pub fn ts(&self) -> TsType {
        TsType::Object(
            self.fields
                .iter()
                .map(|field| TsProp {
                    name: field.name.clone(),
                    ty: field.ty.ts.clone(),
                    optional: field.ty.optional,
                })
                .collect(),
        )
    }

    pub fn validator(&self) -> Validator {
        Validator::Object(
            self.fields
                .iter()
                .map(|field| {
                    let validator = if field.ty.optional {
                        Validator::optional(field.ty.validator.clone())
                    } else {
                        field.ty.validator.clone()
                    };
                    (field.name.clone(), validator)
                })
                .collect(),
        )
    }

    /// The optional fields only, types untouched.
    pub fn options(&self) -> ResolvedObject {
        ResolvedObject {
            fields: self
                .fields
                .iter()
                .filter(|field| field.ty.optional)
                .cloned()
                .collect(),
        }
    }
}

pub fn resolve_type(
    ctx: &CompilationContext<'_>,
    expr: &TypeExpression,
    location: &str,
) -> Result<ResolvedType> {
    let optional = expr.is_optional();
    let (ts, validator) = match expr {
        TypeExpression::Primitive { kind, .. } => match kind {
            PrimitiveKind::String => (TsType::Primitive(TsPrimitive::String), Validator::String),
            PrimitiveKind::Boolean => (TsType::Primitive(TsPrimitive::Boolean), Validator::Boolean),
            PrimitiveKind::Number => (TsType::Primitive(TsPrimitive::Number), Validator::Number),
            PrimitiveKind::Undefined => {
                (TsType::Primitive(TsPrimitive::Undefined), Validator::Undefined)
            }
        },
        TypeExpression::Binary { .. } => (TsType::named("Binary"), Validator::Binary),
        TypeExpression::Any { .. } => (TsType::Primitive(TsPrimitive::Any), Validator::Any),
        TypeExpression::Reference { name, .. } => match ctx.doc.get(name) {
            Some(EntityDefinition::Object(_) | EntityDefinition::Enum(_)) => {
                (TsType::named(name.as_str()), Validator::type_ref(name.as_str()))
            }
            _ => return Err(GeneratorError::unknown(name, location)),
        },
        TypeExpression::ChannelReference { target, .. } => match target {
            ChannelTarget::Any => (TsType::named("Channel"), Validator::Channel(ChannelKinds::Any)),
            ChannelTarget::Named(name) => {
                if !ctx.doc.is_channel(name) {
                    return Err(GeneratorError::unknown(name, location));
                }
                (
                    TsType::named(format!("{name}Channel")),
                    Validator::Channel(ChannelKinds::Named(vec![name.clone()])),
                )
            }
        },
        TypeExpression::Array { element, .. } => {
            let element = resolve_type(ctx, element, &format!("{location}[]"))?;
            (
                TsType::Array(Box::new(element.ts)),
                Validator::Array(Box::new(element.validator)),
            )
        }
        TypeExpression::InlineEnum { literals, .. } => {
            (TsType::string_literals(literals), Validator::Enum(literals.clone()))
        }
        TypeExpression::InlineObject { properties, .. } => {
            let object = resolve_properties(ctx, properties, location)?;
            (object.ts(), object.validator())
        }
    };
    Ok(ResolvedType {
        ts,
        validator,
        optional,
    })
}

/// Expand splices, then resolve every field.
pub fn resolve_properties<'a>(
    ctx: &CompilationContext<'a>,
    properties: &'a PropertyList,
    location: &str,
) -> Result<ResolvedObject> {
    let mut fields = Vec::new();
    for (name, expr) in ctx.expand(properties, location)? {
        let ty = resolve_type(ctx, expr, &format!("{location}.{name}"))?;
        fields.push(ResolvedField {
            name: name.to_string(),
            ty,
        });
    }
    Ok(ResolvedObject { fields })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::inheritance::InheritanceIndex;
    use crate::schema::{SchemaDocument, parse_schema};
    use crate::ts::Emit;

    const SCHEMA: &str = r#"
Frame:
  type: interface
Point:
  type: object
  properties:
    x: number
    y: number
LifecycleEvent:
  type: enum
  literals:
  - load
  - commit
Nav:
  type: mixin
  properties:
    timeout: number?
Holder:
  type: object
  properties:
    frame: Frame
    any: Channel?
    origin: Point?
    states:
      type: array
      items:
        type: enum
        literals: [a, b]
    box:
      type: object?
      properties:
        width: number
    payload: binary
    $mixin: Nav
"#;

    fn with_holder<T>(f: impl FnOnce(&CompilationContext<'_>, &PropertyList) -> T) -> T {
        let doc: SchemaDocument = parse_schema(SCHEMA).unwrap();
        let index = InheritanceIndex::build(&doc).unwrap();
        let ctx = CompilationContext::new(&doc, &index);
        let Some(EntityDefinition::Object(holder)) = doc.get("Holder") else {
            panic!("Holder should be an object");
        };
        f(&ctx, &holder.properties)
    }

    #[test]
    fn test_static_side() {
        let ts = with_holder(|ctx, props| resolve_properties(ctx, props, "Holder").unwrap().ts());
        let expected = "{\n  frame: FrameChannel,\n  any?: Channel,\n  origin?: Point,\n  states: (\"a\" | \"b\")[],\n  box?: {\n    width: number,\n  },\n  payload: Binary,\n  timeout?: number,\n}";
        assert_eq!(ts.emit(), expected);
    }

    #[test]
    fn test_validator_side() {
        let validator =
            with_holder(|ctx, props| resolve_properties(ctx, props, "Holder").unwrap().validator());
        let rendered = validator.emit();
        assert!(rendered.contains("frame: tChannel([\"Frame\"]),"));
        assert!(rendered.contains("any: tOptional(tChannel(\"*\")),"));
        assert!(rendered.contains("origin: tOptional(tType(\"Point\")),"));
        assert!(rendered.contains("states: tArray(tEnum([\"a\", \"b\"])),"));
        assert!(rendered.contains("box: tOptional(tObject({\n    width: tNumber,\n  })),"));
        assert!(rendered.contains("timeout: tOptional(tNumber),"));
    }

    #[test]
    fn test_options_projection_keeps_types() {
        let (all, options) = with_holder(|ctx, props| {
            let all = resolve_properties(ctx, props, "Holder").unwrap();
            let options = all.options();
            (all, options)
        });
        let optional: Vec<_> = all.fields.iter().filter(|f| f.ty.optional).cloned().collect();
        assert_eq!(options.fields, optional);
        let names: Vec<_> = options.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["any", "origin", "box", "timeout"]);
    }

    #[test]
    fn test_reference_to_mixin_is_unknown() {
        let doc = parse_schema(
            "Nav:\n  type: mixin\nO:\n  type: object\n  properties:\n    nav: Nav\n    gone: Missing\n",
        )
        .unwrap();
        let index = InheritanceIndex::default();
        let ctx = CompilationContext::new(&doc, &index);
        let Some(EntityDefinition::Object(o)) = doc.get("O") else {
            panic!("O should be an object");
        };
        match resolve_properties(&ctx, &o.properties, "O").unwrap_err() {
            GeneratorError::UnknownReference { name, location } => {
                assert_eq!(name, "Nav");
                assert_eq!(location, "O.nav");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_list_is_explicit_empty_object() {
        let doc = SchemaDocument::default();
        let index = InheritanceIndex::default();
        let ctx = CompilationContext::new(&doc, &index);
        let empty = PropertyList::default();
        let object = resolve_properties(&ctx, &empty, "E").unwrap();
        assert_eq!(object.ts().emit(), "{}");
        assert_eq!(object.validator().emit(), "tObject({})");
    }
}
