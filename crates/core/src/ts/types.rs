//! TypeScript IR types for declaration output.
//!
//! - TsType: type expressions (primitives, arrays, unions, objects, conditionals)
//! - TsTypeDef: named `type` aliases and `interface`s
//! - TsStmt / TsExpr: the few statement forms the generated files need
//! - TsModule: a whole output file

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Built-in types: string, number, boolean, undefined, void, any, never, object
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Object type, one property per line
    Object(Vec<TsProp>),
    /// Literal type: "foo"
    Literal(TsLiteral),
    /// Named type reference
    Ref(String),
    /// Generic instantiation: Promise<T>
    Generic { name: String, args: Vec<TsType> },
    /// Function type: (params: T) => void
    Function {
        params: Vec<TsParam>,
        ret: Box<TsType>,
    },
    /// Conditional type: T extends U ? X : Y
    Conditional {
        check: Box<TsType>,
        extends: Box<TsType>,
        then: Box<TsType>,
        otherwise: Box<TsType>,
    },
}

impl TsType {
    pub fn string() -> Self {
        TsType::Primitive(TsPrimitive::String)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    /// Union of string literals, in declaration order.
    pub fn string_literals<S: AsRef<str>>(literals: &[S]) -> Self {
        TsType::Union(
            literals
                .iter()
                .map(|l| TsType::Literal(TsLiteral::String(l.as_ref().to_string())))
                .collect(),
        )
    }

    pub fn promise(inner: TsType) -> Self {
        TsType::Generic {
            name: "Promise".into(),
            args: vec![inner],
        }
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Undefined,
    Void,
    Any,
    Never,
    Object,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
}

/// Function or method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

impl TsParam {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

/// TypeScript expression
#[derive(Debug, Clone)]
pub enum TsExpr {
    /// Identifier: foo
    Ident(String),
    /// Literal value: "bar"
    Literal(TsLiteral),
    /// Member access: foo.bar
    Member { object: Box<TsExpr>, prop: String },
    /// new Set(...)
    New {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Array literal: [a, b, c]
    Array(Vec<TsExpr>),
    /// Pre-rendered code
    Raw(String),
}

// =============================================================================
// Module-Level IR
// =============================================================================

/// Import (or re-export) statement
#[derive(Debug, Clone)]
pub struct TsImport {
    pub items: Vec<String>,
    pub from: String,
    /// Whether this is a type-only import
    pub type_only: bool,
    /// `export { .. } from` instead of `import { .. } from`
    pub re_export: bool,
}

/// Member of an interface body
#[derive(Debug, Clone)]
pub enum TsMember {
    Property(TsProp),
    Method(TsMethod),
}

/// Method signature: name(params): ReturnType;
#[derive(Debug, Clone)]
pub struct TsMethod {
    pub name: String,
    pub params: Vec<TsParam>,
    pub return_type: TsType,
}

/// Type definition kind
#[derive(Debug, Clone)]
pub enum TypeDefKind {
    /// interface Foo extends A, B { ... }
    Interface {
        extends: Vec<String>,
        members: Vec<TsMember>,
    },
    /// type Foo<T> = ...
    TypeAlias { ty: TsType },
}

/// Type definition
#[derive(Debug, Clone)]
pub struct TsTypeDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub kind: TypeDefKind,
}

impl TsTypeDef {
    pub fn alias(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            kind: TypeDefKind::TypeAlias { ty },
        }
    }
}

/// Top-level statement
#[derive(Debug, Clone)]
pub enum TsStmt {
    /// [export] const name = init;
    VarDecl {
        is_export: bool,
        kind: VarKind,
        name: String,
        init: TsExpr,
    },
    /// target = value;
    Assign { target: TsExpr, value: TsExpr },
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy)]
pub enum VarKind {
    Const,
}

/// One entry in module body order
#[derive(Debug, Clone)]
pub enum TsItem {
    /// Line comment: `// text`
    Comment(String),
    TypeDef(TsTypeDef),
    Stmt(TsStmt),
    /// Empty separator line
    Blank,
}

/// Complete TypeScript output file
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// Comment lines emitted before anything else
    pub banner: Vec<String>,
    pub imports: Vec<TsImport>,
    pub items: Vec<TsItem>,
}

impl TsModule {
    pub fn push_type(&mut self, def: TsTypeDef) {
        self.items.push(TsItem::TypeDef(def));
    }

    pub fn push_stmt(&mut self, stmt: TsStmt) {
        self.items.push(TsItem::Stmt(stmt));
    }
}
