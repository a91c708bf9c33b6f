//! TypeScript code emission via the Emit trait.
//!
//! Each IR node renders itself; nested object types carry an indentation
//! level so multi-line shapes line up inside interfaces and aliases.

use super::types::{
    TsExpr, TsImport, TsItem, TsLiteral, TsMember, TsMethod, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind,
};
use super::utils::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript string representation.
    fn emit(&self) -> String;
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Undefined => "undefined".to_string(),
            TsPrimitive::Void => "void".to_string(),
            TsPrimitive::Any => "any".to_string(),
            TsPrimitive::Never => "never".to_string(),
            TsPrimitive::Object => "object".to_string(),
        }
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl TsType {
    /// Emit at the given nesting level (2 spaces per level). Only multi-line
    /// object types are affected by the level.
    pub fn emit_at(&self, indent: usize) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit_at(indent);
                // Wrap unions so `"a" | "b"[]` cannot be misread
                if matches!(
                    **inner,
                    TsType::Union(_) | TsType::Function { .. } | TsType::Conditional { .. }
                ) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => types
                .iter()
                .map(|t| t.emit_at(indent))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Object(props) => {
                if props.is_empty() {
                    return "{}".to_string();
                }
                let mut output = String::from("{\n");
                for prop in props {
                    output.push_str(&pad(indent + 1));
                    output.push_str(&prop.emit_at(indent + 1));
                    output.push_str(",\n");
                }
                output.push_str(&pad(indent));
                output.push('}');
                output
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
            TsType::Generic { name, args } => {
                let args_str = args
                    .iter()
                    .map(|a| a.emit_at(indent))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{name}<{args_str}>")
            }
            TsType::Function { params, ret } => {
                format!("({}) => {}", join(params, ", "), ret.emit_at(indent))
            }
            TsType::Conditional {
                check,
                extends,
                then,
                otherwise,
            } => format!(
                "{} extends {} ? {} :\n    {}",
                check.emit_at(indent),
                extends.emit_at(indent),
                then.emit_at(indent),
                otherwise.emit_at(indent)
            ),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl TsProp {
    fn emit_at(&self, indent: usize) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}: {}", key, opt, self.ty.emit_at(indent))
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}: {}", self.name, opt, self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsMethod {
    fn emit(&self) -> String {
        format!(
            "{}({}): {}",
            self.name,
            join(&self.params, ", "),
            self.return_type.emit_at(1)
        )
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let type_params = if self.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_params.join(", "))
        };
        match &self.kind {
            TypeDefKind::Interface { extends, members } => {
                let extends_str = if extends.is_empty() {
                    String::new()
                } else {
                    format!(" extends {}", extends.join(", "))
                };
                let mut output =
                    format!("export interface {}{}{} {{\n", self.name, type_params, extends_str);
                for member in members {
                    let line = match member {
                        TsMember::Property(prop) => prop.emit_at(1),
                        TsMember::Method(method) => method.emit(),
                    };
                    output.push_str(&format!("  {line};\n"));
                }
                output.push_str("}\n");
                output
            }
            TypeDefKind::TypeAlias { ty } => {
                // Conditional chains start on their own line, one arm per line
                if matches!(ty, TsType::Conditional { .. }) {
                    format!("export type {}{} =\n    {};\n", self.name, type_params, ty.emit())
                } else {
                    format!("export type {}{} = {};\n", self.name, type_params, ty.emit())
                }
            }
        }
    }
}

// =============================================================================
// Expressions and statements
// =============================================================================

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Member { object, prop } => format!("{}.{}", object.emit(), prop),
            TsExpr::New { callee, args } => format!("new {}({})", callee.emit(), join(args, ", ")),
            TsExpr::Array(items) => format!("[{}]", join(items, ", ")),
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for VarKind {
    fn emit(&self) -> String {
        match self {
            VarKind::Const => "const".to_string(),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        match self {
            TsStmt::VarDecl {
                is_export,
                kind,
                name,
                init,
            } => {
                let export = if *is_export { "export " } else { "" };
                format!("{}{} {} = {};\n", export, kind.emit(), name, init.emit())
            }
            TsStmt::Assign { target, value } => format!("{} = {};\n", target.emit(), value.emit()),
        }
    }
}

// =============================================================================
// Imports
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        let keyword = if self.re_export { "export" } else { "import" };
        let type_keyword = if self.type_only { "type " } else { "" };
        format!(
            "{} {}{{ {} }} from \"{}\";\n",
            keyword,
            type_keyword,
            self.items.join(", "),
            self.from
        )
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsItem {
    fn emit(&self) -> String {
        match self {
            TsItem::Comment(text) => format!("// {text}\n"),
            TsItem::TypeDef(def) => def.emit(),
            TsItem::Stmt(stmt) => stmt.emit(),
            TsItem::Blank => "\n".to_string(),
        }
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for line in &self.banner {
            output.push_str(&format!("// {line}\n"));
        }
        if !self.banner.is_empty() {
            output.push('\n');
        }

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        for item in &self.items {
            output.push_str(&item.emit());
        }

        output
    }
}

// =============================================================================
// Tests
// =============================================================================
