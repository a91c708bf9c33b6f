//! Read-only state shared by every resolver and emitter call.

use crate::error::{GeneratorError, Result};
use crate::inheritance::InheritanceIndex;
use crate::schema::{EntityDefinition, PropertyEntry, PropertyList, SchemaDocument, TypeExpression};

/// The parsed document plus indexes derived from it.
#[derive(Debug, Clone, Copy)]
pub struct CompilationContext<'a> {
    pub doc: &'a SchemaDocument,
    pub inheritance: &'a InheritanceIndex,
}

impl<'a> CompilationContext<'a> {
    pub fn new(doc: &'a SchemaDocument, inheritance: &'a InheritanceIndex) -> Self {
        Self { doc, inheritance }
    }

    /// Replace every mixin splice with the mixin's own fields, recursively
    /// and in place.
    pub fn expand(
        &self,
        properties: &'a PropertyList,
        location: &str,
    ) -> Result<Vec<(&'a str, &'a TypeExpression)>> {
        let mut fields = Vec::with_capacity(properties.entries.len());
        let mut stack = Vec::new();
        self.expand_into(properties, location, &mut stack, &mut fields)?;
        Ok(fields)
    }

    fn expand_into(
        &self,
        properties: &'a PropertyList,
        location: &str,
        stack: &mut Vec<&'a str>,
        fields: &mut Vec<(&'a str, &'a TypeExpression)>,
    ) -> Result<()> {
        for entry in &properties.entries {
            match entry {
                PropertyEntry::Field { name, ty } => fields.push((name.as_str(), ty)),
                PropertyEntry::Splice { mixin } => {
                    if stack.contains(&mixin.as_str()) {
                        let mut chain: Vec<&str> = stack.clone();
                        chain.push(mixin);
                        return Err(GeneratorError::MixinCycle {
                            chain: chain.join(" -> "),
                        });
                    }
                    let Some(EntityDefinition::Mixin(def)) = self.doc.get(mixin) else {
                        return Err(GeneratorError::unknown(mixin, location));
                    };
                    stack.push(mixin);
                    self.expand_into(&def.properties, &format!("{mixin}.properties"), stack, fields)?;
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}
