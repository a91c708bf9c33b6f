//! TypeScript IR and emission.
//!
//! Emitters build `TsModule` values; rendering to text is purely mechanical
//! through the `Emit` trait, so generated shapes can be asserted on
//! structurally before they become strings.

mod emit;
mod types;
pub mod utils;

pub use emit::Emit;
pub use types::{
    TsExpr, TsImport, TsItem, TsLiteral, TsMember, TsMethod, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind,
};
