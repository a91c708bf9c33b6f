//! `channels.ts` generation.

use indexmap::IndexMap;
use tracing::debug;

use super::banner;
use crate::context::CompilationContext;
use crate::error::{GeneratorError, Result};
use crate::metadata::CommandMetadata;
use crate::resolve::{ResolvedObject, resolve_properties};
use crate::schema::{ChannelDef, EntityDefinition, PropertyList};
use crate::ts::utils::title_case;
use crate::ts::{
    TsExpr, TsImport, TsItem, TsLiteral, TsMember, TsMethod, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind,
};

/// Module body under construction, tracking which schema member produced
/// each declared name.
struct DeclarationBuilder {
    module: TsModule,
    producers: IndexMap<String, String>,
}

impl DeclarationBuilder {
    fn declare(&mut self, def: TsTypeDef, origin: impl Into<String>) -> Result<()> {
        let origin = origin.into();
        if let Some(first) = self.producers.get(&def.name) {
            return Err(GeneratorError::NameCollision {
                name: def.name.clone(),
                first: first.clone(),
                second: origin,
            });
        }
        self.producers.insert(def.name.clone(), origin);
        self.module.push_type(def);
        Ok(())
    }

    fn push(&mut self, item: TsItem) {
        self.module.items.push(item);
    }
}

/// Build the declaration module for the whole document.
pub fn codegen_declarations(
    ctx: &CompilationContext<'_>,
    metadata: &CommandMetadata,
    schema_name: &str,
) -> Result<TsModule> {
    let mut builder = DeclarationBuilder {
        module: TsModule {
            banner: banner(schema_name),
            imports: vec![TsImport {
                items: vec!["CallMetadata".into()],
                from: "./callMetadata".into(),
                type_only: true,
                re_export: false,
            }],
            items: Vec::new(),
        },
        producers: IndexMap::new(),
    };

    // Binary payloads travel base64-encoded
    builder.declare(TsTypeDef::alias("Binary", TsType::string()), "the preamble")?;
    builder.push(TsItem::Blank);
    builder.declare(
        TsTypeDef {
            name: "Channel".into(),
            type_params: Vec::new(),
            kind: TypeDefKind::Interface {
                extends: Vec::new(),
                members: Vec::new(),
            },
        },
        "the preamble",
    )?;

    for (name, entity) in &ctx.doc.entities {
        match entity {
            EntityDefinition::Channel(channel) => {
                builder.push(TsItem::Blank);
                builder.push(TsItem::Comment(format!("----------- {name} -----------")));
                codegen_channel(ctx, &mut builder, name, channel)?;
            }
            EntityDefinition::Object(object) => {
                builder.push(TsItem::Blank);
                let resolved = resolve_properties(ctx, &object.properties, name)?;
                builder.declare(
                    TsTypeDef::alias(name.as_str(), resolved.ts()),
                    format!("{name} object"),
                )?;
            }
            EntityDefinition::Enum(def) => {
                builder.push(TsItem::Blank);
                builder.declare(
                    TsTypeDef::alias(name.as_str(), TsType::string_literals(&def.literals)),
                    format!("{name} enum"),
                )?;
            }
            EntityDefinition::Mixin(_) => {}
        }
    }

    builder.push(TsItem::Blank);
    codegen_traits(ctx, &mut builder)?;

    builder.push(TsItem::Blank);
    builder.push(const_set("commandsWithTracingSnapshots", &metadata.snapshots));
    builder.push(const_set("pausesBeforeInputActions", &metadata.pauses_before_input));

    debug!(types = builder.producers.len(), "Built declaration module.");
    Ok(builder.module)
}

/// Declarations for one channel, in section order: initializer, event
/// target, event union, channel handle, then the collected payload types.
fn codegen_channel(
    ctx: &CompilationContext<'_>,
    builder: &mut DeclarationBuilder,
    name: &str,
    channel: &ChannelDef,
) -> Result<()> {
    let initializer = resolve_properties(ctx, &channel.initializer, &format!("{name}.initializer"))?;
    builder.declare(
        TsTypeDef::alias(format!("{name}Initializer"), initializer.ts()),
        format!("{name} initializer"),
    )?;

    let mut collected: Vec<(TsTypeDef, String)> = Vec::new();

    let mut listeners = Vec::new();
    let mut event_payloads = Vec::new();
    for (event, def) in &channel.events {
        let payload_name = format!("{name}{}Event", title_case(event));
        let payload = resolve_declared(ctx, def.parameters.as_ref(), &format!("{name}.{event}"))?;
        listeners.push(TsMember::Method(TsMethod {
            name: "on".into(),
            params: vec![
                TsParam::new("event", TsType::Literal(TsLiteral::String(event.clone()))),
                TsParam::new(
                    "callback",
                    TsType::Function {
                        params: vec![TsParam::new("params", TsType::named(payload_name.as_str()))],
                        ret: Box::new(TsType::Primitive(TsPrimitive::Void)),
                    },
                ),
            ],
            return_type: TsType::named("this"),
        }));
        event_payloads.push(TsType::named(payload_name.as_str()));
        collected.push((
            TsTypeDef::alias(payload_name, payload.ts()),
            format!("{name}.{event} event"),
        ));
    }

    builder.declare(
        TsTypeDef {
            name: format!("{name}EventTarget"),
            type_params: Vec::new(),
            kind: TypeDefKind::Interface {
                extends: Vec::new(),
                members: listeners,
            },
        },
        format!("{name} event target"),
    )?;

    let events = if event_payloads.is_empty() {
        TsType::Primitive(TsPrimitive::Never)
    } else {
        TsType::Union(event_payloads)
    };
    builder.declare(
        TsTypeDef::alias(format!("{name}Events"), events),
        format!("{name} events"),
    )?;

    let parent = match ctx.inheritance.parent_of(name) {
        Some(parent) => format!("{parent}Channel"),
        None => "Channel".to_string(),
    };
    let mut members = vec![TsMember::Property(TsProp {
        name: format!("_type_{name}"),
        ty: TsType::Primitive(TsPrimitive::Boolean),
        optional: false,
    })];
    for (command, def) in &channel.commands {
        let base = format!("{name}{}", title_case(command));
        let location = format!("{name}.{command}");
        let params = resolve_declared(ctx, def.parameters.as_ref(), &format!("{location}.parameters"))?;
        let result_ty = match &def.returns {
            Some(returns) => resolve_properties(ctx, returns, &format!("{location}.returns"))?.ts(),
            None => TsType::Primitive(TsPrimitive::Void),
        };

        members.push(TsMember::Method(TsMethod {
            name: command.clone(),
            params: vec![
                TsParam::new("params", TsType::named(format!("{base}Params")))
                    .optional(def.parameters.is_none()),
                TsParam::new("metadata", TsType::named("CallMetadata")).optional(true),
            ],
            return_type: TsType::promise(TsType::named(format!("{base}Result"))),
        }));

        collected.push((
            TsTypeDef::alias(format!("{base}Params"), params.ts()),
            format!("{location} parameters"),
        ));
        collected.push((
            TsTypeDef::alias(format!("{base}Options"), params.options().ts()),
            format!("{location} options"),
        ));
        collected.push((
            TsTypeDef::alias(format!("{base}Result"), result_ty),
            format!("{location} result"),
        ));
    }

    builder.declare(
        TsTypeDef {
            name: format!("{name}Channel"),
            type_params: Vec::new(),
            kind: TypeDefKind::Interface {
                extends: vec![format!("{name}EventTarget"), parent],
                members,
            },
        },
        format!("{name} channel"),
    )?;

    for (def, origin) in collected {
        builder.declare(def, origin)?;
    }
    Ok(())
}

/// Resolve a list that may be undeclared; undeclared resolves like an empty one.
fn resolve_declared(
    ctx: &CompilationContext<'_>,
    properties: Option<&PropertyList>,
    location: &str,
) -> Result<ResolvedObject> {
    match properties {
        Some(properties) => resolve_properties(ctx, properties, location),
        None => Ok(ResolvedObject::default()),
    }
}

/// Channel -> initializer / events / event target projections. The chains
/// test the last-declared channel first.
fn codegen_traits(ctx: &CompilationContext<'_>, builder: &mut DeclarationBuilder) -> Result<()> {
    let traits: [(&str, &str, TsPrimitive); 3] = [
        ("InitializerTraits", "Initializer", TsPrimitive::Object),
        ("EventsTraits", "Events", TsPrimitive::Undefined),
        ("EventTargetTraits", "EventTarget", TsPrimitive::Undefined),
    ];
    for (trait_name, suffix, fallback) in traits {
        let mut chain = TsType::Primitive(fallback);
        // Folding in document order leaves the last channel outermost
        for (channel, _) in ctx.doc.channels() {
            chain = TsType::Conditional {
                check: Box::new(TsType::named("T")),
                extends: Box::new(TsType::named(format!("{channel}Channel"))),
                then: Box::new(TsType::named(format!("{channel}{suffix}"))),
                otherwise: Box::new(chain),
            };
        }
        builder.declare(
            TsTypeDef {
                name: trait_name.into(),
                type_params: vec!["T".into()],
                kind: TypeDefKind::TypeAlias { ty: chain },
            },
            format!("{trait_name} mapping"),
        )?;
    }
    Ok(())
}

fn const_set(name: &str, entries: &[String]) -> TsItem {
    TsItem::Stmt(TsStmt::VarDecl {
        is_export: true,
        kind: VarKind::Const,
        name: name.into(),
        init: TsExpr::New {
            callee: Box::new(TsExpr::Ident("Set".into())),
            args: vec![TsExpr::Array(
                entries
                    .iter()
                    .map(|entry| TsExpr::Literal(TsLiteral::String(entry.clone())))
                    .collect(),
            )],
        },
    })
}
