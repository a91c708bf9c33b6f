//! Per-command tracing metadata.

use tracing::debug;

use crate::context::CompilationContext;
use crate::schema::Tracing;

/// `"{Channel}.{command}"` names collected from `tracing` flags.
///
/// A flagged command is also recorded under each direct child of the
/// declaring channel. Grandchildren are not included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMetadata {
    pub snapshots: Vec<String>,
    pub pauses_before_input: Vec<String>,
}

impl CommandMetadata {
    pub fn collect(ctx: &CompilationContext<'_>) -> Self {
        let snapshots = collect_flag(ctx, |tracing| tracing.snapshot);
        let pauses_before_input = collect_flag(ctx, |tracing| tracing.pauses_before_input);
        debug!(
            snapshots = snapshots.len(),
            pauses_before_input = pauses_before_input.len(),
            "Collected command metadata."
        );
        Self {
            snapshots,
            pauses_before_input,
        }
    }
}

fn collect_flag(ctx: &CompilationContext<'_>, flag: impl Fn(&Tracing) -> bool) -> Vec<String> {
    let mut names = Vec::new();
    for (channel, def) in ctx.doc.channels() {
        for (command, _) in def.commands.iter().filter(|(_, cmd)| flag(&cmd.tracing)) {
            names.push(format!("{channel}.{command}"));
            for child in ctx.inheritance.direct_children(channel) {
                names.push(format!("{child}.{command}"));
            }
        }
    }
    names
}
