//! Schema -> TypeScript module generation.
//!
//! Both artifacts are built as [`TsModule`](crate::ts::TsModule) values and
//! only turned into text through the `Emit` trait.

mod declarations;
mod validators;

pub use declarations::codegen_declarations;
pub use validators::{build_registry, codegen_validators};

use crate::GENERATOR_NAME;

/// Banner lines placed at the top of every generated file.
pub(crate) fn banner(schema_name: &str) -> Vec<String> {
    vec![format!(
        "This file is generated by {GENERATOR_NAME} from {schema_name}, do not edit manually."
    )]
}
