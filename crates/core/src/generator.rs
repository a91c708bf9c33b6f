//! Load -> compile -> render -> write.

use std::fs;

use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::context::CompilationContext;
use crate::emit::{build_registry, codegen_declarations, codegen_validators};
use crate::error::{GeneratorError, Result};
use crate::inheritance::InheritanceIndex;
use crate::metadata::CommandMetadata;
use crate::schema::{SchemaDocument, parse_schema};
use crate::ts::Emit;
use crate::validator::ValidatorRegistry;
use crate::writer::{OutputFile, OutputWriter, WriteReport};

/// Everything produced from one schema, before any file is touched.
#[derive(Debug, Clone)]
pub struct GeneratedArtifacts {
    /// `channels.ts` source.
    pub declarations: String,
    /// `validator.ts` source.
    pub validators: String,
    pub registry: ValidatorRegistry,
    pub metadata: CommandMetadata,
}

/// Compile an already parsed document.
pub fn compile(doc: &SchemaDocument, schema_name: &str) -> Result<GeneratedArtifacts> {
    let inheritance = InheritanceIndex::build(doc)?;
    let ctx = CompilationContext::new(doc, &inheritance);

    let metadata = CommandMetadata::collect(&ctx);
    let declarations = codegen_declarations(&ctx, &metadata, schema_name)?.emit();
    let registry = build_registry(&ctx)?;
    let validators = codegen_validators(&registry, schema_name).emit();

    debug!(
        entities = doc.entities.len(),
        validators = registry.len(),
        "Compiled schema."
    );
    Ok(GeneratedArtifacts {
        declarations,
        validators,
        registry,
        metadata,
    })
}

/// Parse and compile YAML source.
pub fn compile_source(source: &str, schema_name: &str) -> Result<GeneratedArtifacts> {
    let doc = parse_schema(source)?;
    compile(&doc, schema_name)
}

/// Run the full pipeline for a project.
pub fn generate(config: &GeneratorConfig, writer: &OutputWriter) -> Result<WriteReport> {
    let source = fs::read_to_string(&config.schema).map_err(|source| GeneratorError::ReadSchema {
        path: config.schema.clone(),
        source,
    })?;
    let doc = parse_schema(&source).map_err(|err| match err {
        GeneratorError::ParseSchema { source, .. } => GeneratorError::ParseSchema {
            path: config.schema.clone(),
            source,
        },
        other => other,
    })?;
    info!(schema = %config.schema.display(), "Generating protocol sources.");

    let artifacts = compile(&doc, &config.schema_name())?;
    let report = writer.write_all(&[
        OutputFile {
            path: config.declarations.clone(),
            content: artifacts.declarations,
        },
        OutputFile {
            path: config.validators.clone(),
            content: artifacts.validators,
        },
    ])?;

    info!(changed = report.any_changed(), "Generation finished.");
    Ok(report)
}
