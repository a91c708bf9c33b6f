//! Validator registry construction and `validator.ts` generation.

use tracing::debug;

use super::banner;
use crate::context::CompilationContext;
use crate::error::Result;
use crate::resolve::resolve_properties;
use crate::schema::{EntityDefinition, PropertyList};
use crate::ts::utils::title_case;
use crate::ts::{Emit, TsExpr, TsImport, TsModule, TsStmt};
use crate::validator::{Validator, ValidatorRegistry};

const PRIMITIVES_MODULE: &str = "./validatorPrimitives";

/// Register every entry for the document, in document order.
///
/// A subclass gets a `tType` alias for each command its direct parent
/// declares and it does not, e.g. `FrameGotoParams -> tType("PageGotoParams")`.
pub fn build_registry(ctx: &CompilationContext<'_>) -> Result<ValidatorRegistry> {
    let mut registry = ValidatorRegistry::new();
    for (name, entity) in &ctx.doc.entities {
        match entity {
            EntityDefinition::Channel(channel) => {
                let initializer =
                    resolve_properties(ctx, &channel.initializer, &format!("{name}.initializer"))?;
                registry.register(
                    format!("{name}Initializer"),
                    initializer.validator(),
                    format!("{name} initializer"),
                )?;

                for (event, def) in &channel.events {
                    let location = format!("{name}.{event}");
                    registry.register(
                        format!("{name}{}Event", title_case(event)),
                        declared_validator(ctx, def.parameters.as_ref(), &location)?,
                        format!("{location} event"),
                    )?;
                }

                for (command, def) in &channel.commands {
                    let base = format!("{name}{}", title_case(command));
                    let location = format!("{name}.{command}");
                    registry.register(
                        format!("{base}Params"),
                        declared_validator(
                            ctx,
                            def.parameters.as_ref(),
                            &format!("{location}.parameters"),
                        )?,
                        format!("{location} parameters"),
                    )?;
                    registry.register(
                        format!("{base}Result"),
                        declared_validator(ctx, def.returns.as_ref(), &format!("{location}.returns"))?,
                        format!("{location} result"),
                    )?;
                }

                if let Some(parent) = ctx.inheritance.parent_of(name)
                    && let Some(EntityDefinition::Channel(parent_def)) = ctx.doc.get(parent)
                {
                    for command in parent_def.commands.keys() {
                        if channel.commands.contains_key(command) {
                            continue;
                        }
                        let method = title_case(command);
                        registry.register(
                            format!("{name}{method}Params"),
                            Validator::type_ref(format!("{parent}{method}Params")),
                            format!("{name} alias of {parent}.{command}"),
                        )?;
                    }
                }
            }
            EntityDefinition::Object(object) => {
                let resolved = resolve_properties(ctx, &object.properties, name)?;
                registry.register(name.as_str(), resolved.validator(), format!("{name} object"))?;
            }
            EntityDefinition::Enum(def) => {
                registry.register(
                    name.as_str(),
                    Validator::Enum(def.literals.clone()),
                    format!("{name} enum"),
                )?;
            }
            EntityDefinition::Mixin(_) => {}
        }
    }
    debug!(entries = registry.len(), "Built validator registry.");
    Ok(registry)
}

/// Object validator for a declared list; an undeclared list accepts
/// `undefined` or an empty object.
fn declared_validator(
    ctx: &CompilationContext<'_>,
    properties: Option<&PropertyList>,
    location: &str,
) -> Result<Validator> {
    match properties {
        Some(properties) => Ok(resolve_properties(ctx, properties, location)?.validator()),
        None => Ok(Validator::optional(Validator::empty_object())),
    }
}

/// Render the registry as a `validator.ts` module.
pub fn codegen_validators(registry: &ValidatorRegistry, schema_name: &str) -> TsModule {
    let primitives = [
        "scheme", "tOptional", "tObject", "tBoolean", "tNumber", "tString", "tUndefined", "tAny",
        "tEnum", "tArray", "tBinary", "tChannel", "tType",
    ];
    let imports = vec![
        TsImport {
            items: primitives.into_iter().map(String::from).collect(),
            from: PRIMITIVES_MODULE.into(),
            type_only: false,
            re_export: false,
        },
        TsImport {
            items: vec!["Validator".into(), "ValidatorContext".into()],
            from: PRIMITIVES_MODULE.into(),
            type_only: true,
            re_export: true,
        },
        TsImport {
            items: vec![
                "ValidationError".into(),
                "findValidator".into(),
                "maybeFindValidator".into(),
            ],
            from: PRIMITIVES_MODULE.into(),
            type_only: false,
            re_export: true,
        },
    ];

    let mut module = TsModule {
        banner: banner(schema_name),
        imports,
        items: Vec::new(),
    };
    for (name, entry) in registry.iter() {
        module.push_stmt(TsStmt::Assign {
            target: TsExpr::Member {
                object: Box::new(TsExpr::Ident("scheme".into())),
                prop: name.to_string(),
            },
            value: TsExpr::Raw(entry.validator.emit()),
        });
    }
    module
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use crate::inheritance::InheritanceIndex;
    use crate::schema::parse_schema;
    use crate::validator::NoChannels;
    use serde_json::json;

    fn registry(source: &str) -> Result<ValidatorRegistry> {
        let doc = parse_schema(source)?;
        let index = InheritanceIndex::build(&doc)?;
        build_registry(&CompilationContext::new(&doc, &index))
    }

    const SCHEMA: &str = r#"
A:
  type: interface
  commands:
    foo:
      parameters:
        x: string
    bar:
B:
  type: interface
  extends: A
  commands:
    bar:
      parameters:
        y: number
  events:
    ping:
Mode:
  type: enum
  literals: [a, b]
"#;

    #[test]
    fn test_entry_order() {
        let registry = registry(SCHEMA).unwrap();
        let names: Vec<_> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            [
                "AInitializer",
                "AFooParams",
                "AFooResult",
                "ABarParams",
                "ABarResult",
                "BInitializer",
                "BPingEvent",
                "BBarParams",
                "BBarResult",
                "BFooParams",
                "Mode",
            ]
        );
    }

    #[test]
    fn test_alias_skips_redeclared_commands() {
        let registry = registry(SCHEMA).unwrap();
        assert_eq!(registry.get("BFooParams"), Some(&Validator::type_ref("AFooParams")));
        assert!(matches!(registry.get("BBarParams"), Some(Validator::Object(_))));
    }

    #[test]
    fn test_inherited_params_validate_through_parent() {
        let registry = registry(SCHEMA).unwrap();
        let ok = registry.validate("BFooParams", &json!({ "x": "hi" }), &NoChannels).unwrap();
        assert_eq!(ok, json!({ "x": "hi" }));
        let err = registry.validate("BFooParams", &json!({ "x": 5 }), &NoChannels).unwrap_err();
        assert_eq!(err.path, "x");
    }

    #[test]
    fn test_undeclared_lists_accept_absent_values() {
        let registry = registry(SCHEMA).unwrap();
        assert_eq!(registry.validate("ABarParams", &json!(null), &NoChannels).unwrap(), json!(null));
        assert_eq!(registry.validate("ABarResult", &json!({}), &NoChannels).unwrap(), json!({}));
    }

    #[test]
    fn test_enum_exactness() {
        let registry = registry(SCHEMA).unwrap();
        assert!(registry.validate("Mode", &json!("a"), &NoChannels).is_ok());
        assert!(registry.validate("Mode", &json!("b"), &NoChannels).is_ok());
        assert!(registry.validate("Mode", &json!("c"), &NoChannels).is_err());
        assert!(registry.validate("Mode", &json!(1), &NoChannels).is_err());
    }

    #[test]
    fn test_alias_collision_is_reported() {
        let err = registry(
            "A:\n  type: interface\n  commands:\n    foo:\nB:\n  type: interface\n  extends: A\nBFooParams:\n  type: object\n",
        )
        .unwrap_err();
        assert!(matches!(err, GeneratorError::NameCollision { name, .. } if name == "BFooParams"));
    }

    #[test]
    fn test_render_module() {
        let registry = registry(SCHEMA).unwrap();
        let out = codegen_validators(&registry, "protocol.yml").emit();
        assert!(out.starts_with(
            "// This file is generated by protogen from protocol.yml, do not edit manually.\n\nimport { scheme, tOptional,"
        ));
        assert!(out.contains(
            "export type { Validator, ValidatorContext } from \"./validatorPrimitives\";\n"
        ));
        assert!(out.contains(
            "export { ValidationError, findValidator, maybeFindValidator } from \"./validatorPrimitives\";\n"
        ));
        assert!(out.contains("scheme.AFooParams = tObject({\n  x: tString,\n});\n"));
        assert!(out.contains("scheme.ABarParams = tOptional(tObject({}));\n"));
        assert!(out.contains("scheme.BFooParams = tType(\"AFooParams\");\n"));
        assert!(out.contains("scheme.Mode = tEnum([\"a\", \"b\"]);\n"));
    }
}
