//! Channel `extends` graph.

use indexmap::IndexMap;

use crate::error::{GeneratorError, Result};
use crate::schema::SchemaDocument;

/// Direct parent/child relationships between channels.
///
/// Only one level is recorded in each direction; nothing here walks the
/// chain transitively.
#[derive(Debug, Clone, Default)]
pub struct InheritanceIndex {
    extends_of: IndexMap<String, String>,
    direct_children_of: IndexMap<String, Vec<String>>,
}

impl InheritanceIndex {
    /// Build the index. An `extends` that does not name a channel is an
    /// [`GeneratorError::UnknownReference`]; a loop of `extends` clauses is
    /// an [`GeneratorError::InheritanceCycle`].
    pub fn build(doc: &SchemaDocument) -> Result<Self> {
        let mut index = Self::default();
        for (name, channel) in doc.channels() {
            let Some(parent) = &channel.extends else {
                continue;
            };
            if !doc.is_channel(parent) {
                return Err(GeneratorError::unknown(parent, format!("{name}.extends")));
            }
            index.extends_of.insert(name.to_string(), parent.clone());
            index
                .direct_children_of
                .entry(parent.clone())
                .or_default()
                .push(name.to_string());
        }
        index.check_acyclic()?;
        Ok(index)
    }

    fn check_acyclic(&self) -> Result<()> {
        for start in self.extends_of.keys() {
            let mut path = vec![start.as_str()];
            let mut current = start.as_str();
            while let Some(parent) = self.parent_of(current) {
                if let Some(pos) = path.iter().position(|seen| *seen == parent) {
                    let mut chain = path[pos..].to_vec();
                    chain.push(parent);
                    return Err(GeneratorError::InheritanceCycle {
                        chain: chain.join(" -> "),
                    });
                }
                path.push(parent);
                current = parent;
            }
        }
        Ok(())
    }

    pub fn parent_of(&self, channel: &str) -> Option<&str> {
        self.extends_of.get(channel).map(String::as_str)
    }

    /// Channels that name `channel` in their `extends`, in document order.
    pub fn direct_children(&self, channel: &str) -> &[String] {
        self.direct_children_of
            .get(channel)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
