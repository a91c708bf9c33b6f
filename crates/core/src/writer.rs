//! Compare-then-write for generated files.
//!
//! Targets must already exist. Every target is read before any of them is
//! written, so a missing or unreadable file aborts the run with nothing
//! changed on disk.

use std::fs;
use std::path::{Path, PathBuf};

use similar::{ChangeTag, TextDiff};
use tracing::{debug, info};

use crate::error::{GeneratorError, Result};

/// Generated content bound for `path`.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
}

/// Outcome for one output file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub changed: bool,
    /// Unified diff of the rewrite, when diffs were requested and the file changed.
    pub diff: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub files: Vec<FileReport>,
}

impl WriteReport {
    pub fn any_changed(&self) -> bool {
        self.files.iter().any(|file| file.changed)
    }
}

/// Write `content` to `path` only if it differs from what is there.
/// Returns whether a write happened.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    let existing = read_existing(path)?;
    if existing == content {
        return Ok(false);
    }
    write(path, content)?;
    Ok(true)
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(GeneratorError::MissingOutputTarget {
            path: path.to_path_buf(),
        });
    }
    fs::read_to_string(path).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// All-or-nothing writer for a batch of outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputWriter {
    render_diffs: bool,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a unified diff to every changed file's report.
    pub fn with_diffs(mut self, render_diffs: bool) -> Self {
        self.render_diffs = render_diffs;
        self
    }

    pub fn write_all(&self, outputs: &[OutputFile]) -> Result<WriteReport> {
        // Pre-flight: every target must be readable before anything is written
        let mut existing = Vec::with_capacity(outputs.len());
        for output in outputs {
            existing.push(read_existing(&output.path)?);
        }

        let mut report = WriteReport::default();
        for (output, current) in outputs.iter().zip(existing) {
            let changed = current != output.content;
            let diff = if changed && self.render_diffs {
                Some(unified_diff(&output.path, &current, &output.content))
            } else {
                None
            };
            if changed {
                write(&output.path, &output.content)?;
                info!(path = %output.path.display(), "Wrote generated file.");
            } else {
                debug!(path = %output.path.display(), "Generated file is up to date.");
            }
            report.files.push(FileReport {
                path: output.path.clone(),
                changed,
                diff,
            });
        }
        Ok(report)
    }
}

/// Unified diff between the current and regenerated content.
pub fn unified_diff(path: &Path, current: &str, generated: &str) -> String {
    let diff = TextDiff::from_lines(current, generated);
    let mut output = String::new();
    output.push_str(&format!("--- {} (current)\n", path.display()));
    output.push_str(&format!("+++ {} (generated)\n", path.display()));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }
    output
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_if_changed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.ts");
        fs::write(&path, "old\n").unwrap();

        assert!(write_if_changed(&path, "new\n").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!write_if_changed(&path, "new\n").unwrap());
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.ts");
        let err = write_if_changed(&path, "x").unwrap_err();
        assert!(matches!(err, GeneratorError::MissingOutputTarget { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_all_preflight_leaves_first_untouched() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.ts");
        fs::write(&first, "placeholder").unwrap();
        let outputs = [
            OutputFile {
                path: first.clone(),
                content: "generated".into(),
            },
            OutputFile {
                path: dir.path().join("second.ts"),
                content: "generated".into(),
            },
        ];
        let err = OutputWriter::new().write_all(&outputs).unwrap_err();
        assert!(matches!(err, GeneratorError::MissingOutputTarget { .. }));
        assert_eq!(fs::read_to_string(&first).unwrap(), "placeholder");
    }

    #[test]
    fn test_write_all_reports_per_file_changes_and_diffs() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.ts");
        let b = dir.path().join("b.ts");
        fs::write(&a, "same\n").unwrap();
        fs::write(&b, "one\ntwo\n").unwrap();
        let outputs = [
            OutputFile {
                path: a,
                content: "same\n".into(),
            },
            OutputFile {
                path: b,
                content: "one\nthree\n".into(),
            },
        ];
        let report = OutputWriter::new().with_diffs(true).write_all(&outputs).unwrap();
        assert!(report.any_changed());
        assert!(!report.files[0].changed);
        assert!(report.files[0].diff.is_none());
        let diff = report.files[1].diff.as_deref().unwrap();
        assert!(diff.contains("-two\n"));
        assert!(diff.contains("+three\n"));
        assert!(diff.contains(" one\n"));
    }
}
